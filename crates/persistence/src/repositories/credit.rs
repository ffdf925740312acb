//! Credit ledger repository (read path).

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CreditTransactionEntity, PaymentTransactionEntity};
use crate::metrics::QueryTimer;

/// Repository for payment and credit ledger reads.
#[derive(Clone)]
pub struct CreditRepository {
    pool: PgPool,
}

impl CreditRepository {
    /// Creates a new CreditRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A user's payments, newest first.
    pub async fn list_payments(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PaymentTransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_payment_transactions");
        let result = sqlx::query_as::<_, PaymentTransactionEntity>(
            r#"
            SELECT id, user_id, amount_cents, currency, status, provider_reference, created_at
            FROM payment_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count a user's payments.
    pub async fn count_payments(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_payment_transactions");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM payment_transactions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Ledger items belonging to the given payments.
    pub async fn list_credit_transactions_for_payments(
        &self,
        payment_ids: &[Uuid],
    ) -> Result<Vec<CreditTransactionEntity>, sqlx::Error> {
        if payment_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_credit_transactions_for_payments");
        let result = sqlx::query_as::<_, CreditTransactionEntity>(
            r#"
            SELECT id, user_id, payment_id, amount, kind, description, created_at
            FROM credit_transactions
            WHERE payment_id = ANY($1)
            ORDER BY created_at ASC, id
            "#,
        )
        .bind(payment_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
