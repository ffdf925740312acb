//! Credit ledger read models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::PageInfo;
use uuid::Uuid;

/// Response for `GET /api/v1/credits`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreditBalanceResponse {
    pub credits: i64,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

/// Line item in the credit ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreditTransaction {
    pub id: Uuid,
    pub payment_id: Option<Uuid>,
    /// Signed amount applied to the balance.
    pub amount: i64,
    pub kind: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A payment and the ledger items it produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub credit_transactions: Vec<CreditTransaction>,
}

/// Response for `GET /api/v1/payments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentHistoryResponse {
    pub payments: Vec<PaymentTransaction>,
    pub pagination: PageInfo,
}
