//! Credit ledger entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::credit::CreditTransaction;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the payment_transactions table.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentTransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row mapping for the credit_transactions table.
#[derive(Debug, Clone, FromRow)]
pub struct CreditTransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub amount: i64,
    pub kind: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CreditTransactionEntity> for CreditTransaction {
    fn from(entity: CreditTransactionEntity) -> Self {
        Self {
            id: entity.id,
            payment_id: entity.payment_id,
            amount: entity.amount,
            kind: entity.kind,
            description: entity.description,
            created_at: entity.created_at,
        }
    }
}
