use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{Payment, PaymentStats, PaymentStatus, SubmitPaymentRequest};
use crate::collections::models::{Collection, DEFAULT_CURRENCY};
use crate::collections::services::add_to_current_amount;
use crate::common::{generate_payment_reference, safe_email_log, ApiError, Pagination, Validator};

pub struct PaymentsService {
    db: SqlitePool,
}

impl PaymentsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Newest first
    pub async fn list(&self, page: &Pagination) -> Result<Vec<Payment>, ApiError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(payments)
    }

    pub async fn get(&self, id: i64) -> Result<Payment, ApiError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))
    }

    pub async fn get_by_reference(&self, reference: &str) -> Result<Payment, ApiError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE reference = ?")
            .bind(reference)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))
    }

    /// Record a mock payment, which settles immediately
    ///
    /// The payment insert and the collection increment share one transaction.
    pub async fn submit(&self, request: SubmitPaymentRequest) -> Result<Payment, ApiError> {
        request.validate(&request).into_result()?;

        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        let collection = match request.collection_id {
            Some(collection_id) => {
                let collection = sqlx::query_as::<_, Collection>(
                    "SELECT * FROM collections WHERE id = ?",
                )
                .bind(collection_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(ApiError::DatabaseError)?
                .ok_or_else(|| ApiError::NotFound("Collection not found".to_string()))?;

                if !collection.is_active() {
                    warn!(
                        collection_id = collection_id,
                        status = %collection.status,
                        "Payment refused for inactive collection"
                    );
                    return Err(ApiError::BadRequest(format!(
                        "Collection is {} and not accepting payments",
                        collection.status
                    )));
                }
                Some(collection)
            }
            None => None,
        };

        let currency = match (&collection, request.currency.as_deref()) {
            (Some(collection), Some(requested))
                if !requested.trim().eq_ignore_ascii_case(&collection.currency) =>
            {
                return Err(ApiError::BadRequest(format!(
                    "Collection accepts {} only",
                    collection.currency
                )));
            }
            (Some(collection), _) => collection.currency.clone(),
            (None, Some(requested)) => requested.trim().to_uppercase(),
            (None, None) => DEFAULT_CURRENCY.to_string(),
        };

        let reference = generate_payment_reference();
        let now = Utc::now().to_rfc3339();
        let email = request.customer_email.trim().to_lowercase();

        let result = sqlx::query(
            r#"
            INSERT INTO payments
                (reference, amount, currency, status, customer_email, customer_name,
                 customer_phone, payment_method, mobile_money_provider, description,
                 collection_id, collection_title, created_at, processed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reference)
        .bind(request.amount)
        .bind(&currency)
        .bind(PaymentStatus::Success.as_str())
        .bind(&email)
        .bind(request.customer_name.trim())
        .bind(
            request
                .customer_phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty()),
        )
        .bind(request.payment_method.as_str())
        .bind(request.mobile_money_provider.map(|p| p.as_str()))
        .bind(&request.description)
        .bind(collection.as_ref().map(|c| c.id))
        .bind(collection.as_ref().map(|c| c.title.clone()))
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

        if let Some(collection) = &collection {
            add_to_current_amount(&mut *tx, collection.id, request.amount)
                .await
                .map_err(ApiError::DatabaseError)?;
        }

        let payment_id = result.last_insert_rowid();
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
            .bind(payment_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;

        tx.commit().await.map_err(ApiError::DatabaseError)?;

        info!(
            payment_id = payment.id,
            reference = %payment.reference,
            amount = payment.amount,
            collection_id = ?payment.collection_id,
            email = %safe_email_log(&payment.customer_email),
            "Mock payment processed"
        );

        Ok(payment)
    }

    pub async fn stats(&self) -> Result<PaymentStats, ApiError> {
        let (total, successful, failed, pending, revenue): (i64, i64, i64, i64, f64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status IN ('pending', 'processing') THEN 1 ELSE 0 END), 0),
                    TOTAL(CASE WHEN status = 'success' THEN amount ELSE 0.0 END)
                FROM payments
                "#,
            )
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        let success_rate = if total > 0 {
            successful as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(PaymentStats {
            total_payments: total,
            successful_payments: successful,
            failed_payments: failed,
            pending_payments: pending,
            total_revenue: revenue,
            success_rate,
        })
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Payment>, ApiError> {
        self.list(&Pagination {
            skip: None,
            limit: Some(limit),
        })
        .await
    }
}
