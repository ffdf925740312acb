//! Streaming catalog models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A catalog entry for a shareable subscription service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Streaming {
    pub id: Uuid,
    pub name: String,
    pub platform: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub monthly_price_cents: i64,
    pub max_users: i32,
    pub max_screens: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Streaming {
    pub fn price_per_screen_cents(&self) -> i64 {
        price_per_screen_cents(self.monthly_price_cents, self.max_screens)
    }
}

/// Monthly price split across screens, rounded up to the next cent.
/// A non-positive screen count yields the full price.
pub fn price_per_screen_cents(monthly_price_cents: i64, max_screens: i32) -> i64 {
    if max_screens <= 1 {
        return monthly_price_cents;
    }
    let screens = i64::from(max_screens);
    (monthly_price_cents + screens - 1).div_euclid(screens)
}

/// Catalog entry as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamingResponse {
    pub id: Uuid,
    pub name: String,
    pub platform: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub monthly_price_cents: i64,
    pub price_per_screen_cents: i64,
    pub max_users: i32,
    pub max_screens: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Streaming> for StreamingResponse {
    fn from(s: Streaming) -> Self {
        let price_per_screen_cents = s.price_per_screen_cents();
        Self {
            id: s.id,
            name: s.name,
            platform: s.platform,
            description: s.description,
            logo_url: s.logo_url,
            website_url: s.website_url,
            monthly_price_cents: s.monthly_price_cents,
            price_per_screen_cents,
            max_users: s.max_users,
            max_screens: s.max_screens,
            is_active: s.is_active,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Response for catalog listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListStreamingsResponse {
    pub streamings: Vec<StreamingResponse>,
}

/// Request to add a catalog entry.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateStreamingRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Platform must be between 1 and 50 characters"))]
    pub platform: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Logo URL must be a valid URL"))]
    pub logo_url: Option<String>,

    #[validate(url(message = "Website URL must be a valid URL"))]
    pub website_url: Option<String>,

    #[validate(custom(function = "shared::validation::validate_price_cents"))]
    pub monthly_price_cents: i64,

    #[validate(range(min = 1, max = 50, message = "Max users must be between 1 and 50"))]
    pub max_users: i32,

    #[validate(range(min = 1, max = 50, message = "Max screens must be between 1 and 50"))]
    pub max_screens: i32,
}

/// Partial update of a catalog entry. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateStreamingRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Platform must be between 1 and 50 characters"))]
    pub platform: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Logo URL must be a valid URL"))]
    pub logo_url: Option<String>,

    #[validate(url(message = "Website URL must be a valid URL"))]
    pub website_url: Option<String>,

    #[validate(custom(function = "shared::validation::validate_price_cents"))]
    pub monthly_price_cents: Option<i64>,

    #[validate(range(min = 1, max = 50, message = "Max users must be between 1 and 50"))]
    pub max_users: Option<i32>,

    #[validate(range(min = 1, max = 50, message = "Max screens must be between 1 and 50"))]
    pub max_screens: Option<i32>,

    pub is_active: Option<bool>,
}

/// Built-in catalog entry used when resetting the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSeed {
    pub name: &'static str,
    pub platform: &'static str,
    pub description: &'static str,
    pub website_url: &'static str,
    pub monthly_price_cents: i64,
    pub max_users: i32,
    pub max_screens: i32,
}

/// The catalog a fresh installation starts with.
pub fn default_catalog() -> Vec<CatalogSeed> {
    vec![
        CatalogSeed {
            name: "Netflix Premium",
            platform: "video",
            description: "4K streaming on up to four screens",
            website_url: "https://www.netflix.com",
            monthly_price_cents: 1999,
            max_users: 5,
            max_screens: 4,
        },
        CatalogSeed {
            name: "Disney+ Premium",
            platform: "video",
            description: "Disney, Pixar, Marvel and Star Wars",
            website_url: "https://www.disneyplus.com",
            monthly_price_cents: 1399,
            max_users: 7,
            max_screens: 4,
        },
        CatalogSeed {
            name: "Max",
            platform: "video",
            description: "HBO originals and Warner Bros. films",
            website_url: "https://www.max.com",
            monthly_price_cents: 1699,
            max_users: 5,
            max_screens: 4,
        },
        CatalogSeed {
            name: "Spotify Family",
            platform: "music",
            description: "Six Premium accounts under one plan",
            website_url: "https://www.spotify.com",
            monthly_price_cents: 1999,
            max_users: 6,
            max_screens: 6,
        },
        CatalogSeed {
            name: "YouTube Premium Family",
            platform: "video",
            description: "Ad-free YouTube and YouTube Music",
            website_url: "https://www.youtube.com/premium",
            monthly_price_cents: 2299,
            max_users: 6,
            max_screens: 6,
        },
    ]
}
