//! Credit ledger read endpoints.
//!
//! Both endpoints are lookup-only: a principal that has never been resolved
//! to a user row gets 404 rather than a freshly created empty account.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::credit::{
    CreditBalanceResponse, CreditTransaction, PaymentHistoryResponse, PaymentTransaction,
};
use persistence::entities::UserEntity;
use persistence::repositories::{CreditRepository, UserRepository};
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

async fn lookup_user(state: &AppState, auth: &UserAuth) -> Result<UserEntity, ApiError> {
    UserRepository::new(state.pool.clone())
        .find_by_external_id(&auth.0.external_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// GET /api/v1/credits
pub async fn get_credits(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<CreditBalanceResponse>, ApiError> {
    let user = lookup_user(&state, &auth).await?;

    Ok(Json(CreditBalanceResponse {
        credits: user.credits,
        user_id: user.id,
        name: user.display_name,
        email: user.email,
    }))
}

/// Payment history, newest first, each payment with its ledger items.
///
/// GET /api/v1/payments
pub async fn list_payments(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(page): Query<PageRequest>,
) -> Result<Json<PaymentHistoryResponse>, ApiError> {
    let user = lookup_user(&state, &auth).await?;
    let repo = CreditRepository::new(state.pool.clone());

    let payments = repo
        .list_payments(user.id, page.limit(), page.offset())
        .await?;
    let total = repo.count_payments(user.id).await?;

    let payment_ids: Vec<Uuid> = payments.iter().map(|p| p.id).collect();
    let mut by_payment: HashMap<Uuid, Vec<CreditTransaction>> = HashMap::new();
    for tx in repo
        .list_credit_transactions_for_payments(&payment_ids)
        .await?
    {
        if let Some(payment_id) = tx.payment_id {
            by_payment.entry(payment_id).or_default().push(tx.into());
        }
    }

    let payments = payments
        .into_iter()
        .map(|p| PaymentTransaction {
            credit_transactions: by_payment.remove(&p.id).unwrap_or_default(),
            id: p.id,
            user_id: p.user_id,
            amount_cents: p.amount_cents,
            currency: p.currency,
            status: p.status,
            provider_reference: p.provider_reference,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(PaymentHistoryResponse {
        payments,
        pagination: page.info(total),
    }))
}
