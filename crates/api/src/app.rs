use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use domain::services::AdminAuthority;
use persistence::repositories::PrivilegedIdentityRepository;
use shared::jwt::{JwtError, PrincipalVerifier};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    init_metrics, metrics_handler, metrics_middleware, require_platform_admin, require_user_auth,
    trace_id,
};
use crate::routes::{admin, credits, deliveries, groups, health, join_requests, me, streamings};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub verifier: Arc<PrincipalVerifier>,
    pub admin_authority: Arc<dyn AdminAuthority>,
}

impl AppState {
    /// Builds the state with the Postgres-backed admin allow-list.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, JwtError> {
        let authority = Arc::new(PrivilegedIdentityRepository::new(pool.clone()));
        Self::with_authority(config, pool, authority)
    }

    pub fn with_authority(
        config: Config,
        pool: PgPool,
        admin_authority: Arc<dyn AdminAuthority>,
    ) -> Result<Self, JwtError> {
        // PEMs passed through env vars usually carry escaped newlines
        let public_key = config.identity.public_key.replace("\\n", "\n");
        let verifier = PrincipalVerifier::from_rsa_pem(
            &public_key,
            config.identity_issuer(),
            config.identity.leeway_secs,
        )?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            admin_authority,
        })
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let state = AppState::new(config, pool)?;
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    init_metrics();
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Routes for any authenticated principal; per-group checks happen in handlers
    let user_routes = Router::new()
        .route("/api/v1/me", get(me::get_me))
        .route(
            "/api/v1/groups",
            post(groups::create_group).get(groups::list_groups),
        )
        .route("/api/v1/groups/:group_id", get(groups::get_group))
        .route("/api/v1/groups/:group_id/members", get(groups::list_members))
        .route(
            "/api/v1/groups/:group_id/members/me",
            delete(groups::leave_group),
        )
        .route(
            "/api/v1/groups/:group_id/members/:user_id/role",
            put(groups::update_member_role),
        )
        .route(
            "/api/v1/groups/:group_id/streamings",
            post(groups::link_streaming),
        )
        .route(
            "/api/v1/groups/:group_id/streamings/:streaming_id",
            put(groups::update_group_streaming),
        )
        .route(
            "/api/v1/groups/:group_id/join-requests",
            post(join_requests::create_join_request).get(join_requests::list_group_join_requests),
        )
        .route(
            "/api/v1/join-requests",
            get(join_requests::list_my_join_requests),
        )
        .route(
            "/api/v1/join-requests/:request_id/approve",
            post(join_requests::approve_join_request),
        )
        .route(
            "/api/v1/join-requests/:request_id/deny",
            post(join_requests::deny_join_request),
        )
        .route(
            "/api/v1/groups/:group_id/deliveries",
            post(deliveries::create_delivery),
        )
        .route(
            "/api/v1/groups/:group_id/deliveries/stats",
            get(deliveries::group_delivery_stats),
        )
        .route(
            "/api/v1/deliveries/stats",
            get(deliveries::managed_delivery_stats),
        )
        .route(
            "/api/v1/memberships/:membership_id/deliveries",
            get(deliveries::list_membership_deliveries),
        )
        .route(
            "/api/v1/memberships/:membership_id/deliveries/confirm",
            post(deliveries::confirm_delivery),
        )
        .route("/api/v1/streamings", get(streamings::list_streamings))
        .route("/api/v1/credits", get(credits::get_credits))
        .route("/api/v1/payments", get(credits::list_payments))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Admin routes: user auth runs first (outermost), then the admin gate
    let admin_routes = Router::new()
        .route("/api/v1/admin/groups", get(admin::list_groups))
        .route(
            "/api/v1/admin/groups/:group_id/members/:user_id",
            delete(admin::remove_member),
        )
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/stats", get(admin::stats))
        .route(
            "/api/v1/admin/admins",
            get(admin::list_admins).post(admin::add_admin),
        )
        .route(
            "/api/v1/admin/admins/:email",
            delete(admin::remove_admin),
        )
        .route(
            "/api/v1/admin/streamings",
            get(streamings::admin_list_streamings).post(streamings::create_streaming),
        )
        .route(
            "/api/v1/admin/streamings/reset",
            post(streamings::reset_catalog),
        )
        .route(
            "/api/v1/admin/streamings/:streaming_id",
            put(streamings::update_streaming).delete(streamings::deactivate_streaming),
        )
        .route(
            "/api/v1/admin/deliveries/stats",
            get(deliveries::admin_delivery_stats),
        )
        .route(
            "/api/v1/admin/deliveries/:delivery_id",
            patch(deliveries::admin_update_delivery),
        )
        .route(
            "/api/v1/admin/maintenance/purge-groups",
            post(admin::purge_groups),
        )
        .route(
            "/api/v1/admin/maintenance/purge-streamings",
            post(streamings::purge_streamings),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_platform_admin,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
