//! Tests for payments module
//!
//! These tests verify:
//! - Payment method and provider parsing, including form labels
//! - Submission validation
//! - Settlement into the linked collection
//! - Verification, listing order and statistics

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::collections::services::CollectionsService;
    use crate::common::migrations::seed_demo_data;
    use crate::common::testing::{admin_user, regular_user, shared, test_state};
    use crate::common::{database::test_pool, ApiError, Pagination, Validator};
    use axum::extract::{Json, Path, Query};
    use models::{MobileMoneyProvider, PaymentMethod, SubmitPaymentRequest};
    use services::PaymentsService;
    use sqlx::SqlitePool;

    fn request(amount: f64, collection_id: Option<i64>) -> SubmitPaymentRequest {
        SubmitPaymentRequest {
            amount,
            currency: None,
            customer_email: "Donor@Example.com".to_string(),
            customer_name: "Kwame Asante".to_string(),
            customer_phone: Some("0241234567".to_string()),
            payment_method: PaymentMethod::MobileMoney,
            mobile_money_provider: Some(MobileMoneyProvider::Mtn),
            description: None,
            collection_id,
        }
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = test_pool().await;
        seed_demo_data(&pool, "admin@agapay.test").await.unwrap();
        pool
    }

    #[test]
    fn test_payment_method_accepts_form_labels() {
        let cases = [
            ("\"card\"", PaymentMethod::Card),
            ("\"Card\"", PaymentMethod::Card),
            ("\"Bank Transfer\"", PaymentMethod::BankTransfer),
            ("\"USSD\"", PaymentMethod::Ussd),
            ("\"QR Code\"", PaymentMethod::QrCode),
            ("\"Mobile Money\"", PaymentMethod::MobileMoney),
            ("\"mobile_money\"", PaymentMethod::MobileMoney),
        ];
        for (raw, expected) in cases {
            let parsed: PaymentMethod = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected, "{}", raw);
        }
        assert!(serde_json::from_str::<PaymentMethod>("\"cash\"").is_err());
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
    }

    #[test]
    fn test_submit_request_aliases() {
        let parsed: SubmitPaymentRequest = serde_json::from_str(
            r#"{"amount":25,"email":"a@b.co","name":"Ama","payment_method":"Card"}"#,
        )
        .unwrap();
        assert_eq!(parsed.customer_email, "a@b.co");
        assert_eq!(parsed.customer_name, "Ama");
        assert!(parsed.validate(&parsed).is_valid);
    }

    #[test]
    fn test_submit_validation() {
        let mut bad = request(0.0, None);
        bad.customer_email = "not-an-email".to_string();
        bad.customer_name = " ".to_string();
        bad.customer_phone = Some("12345".to_string());
        let fields: Vec<_> = bad
            .validate(&bad)
            .errors
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec!["amount", "customer_email", "customer_name", "customer_phone"]
        );

        let mut momo = request(10.0, None);
        momo.mobile_money_provider = None;
        momo.customer_phone = None;
        assert_eq!(momo.validate(&momo).errors.len(), 2);

        let mut intl = request(10.0, None);
        intl.customer_phone = Some("+233241234567".to_string());
        assert!(intl.validate(&intl).is_valid);
    }

    #[tokio::test]
    async fn test_submit_settles_and_increments_collection() {
        let pool = seeded_pool().await;
        let payments = PaymentsService::new(pool.clone());
        let collections = CollectionsService::new(pool);

        let payment = payments.submit(request(100.0, Some(3))).await.unwrap();
        assert_eq!(payment.status, "success");
        assert_eq!(payment.processed_at.as_deref(), Some(payment.created_at.as_str()));
        assert!(payment.reference.starts_with("AGA_"));
        assert_eq!(payment.customer_email, "donor@example.com");
        assert_eq!(payment.collection_title.as_deref(), Some("Medical Emergency Fund"));
        assert_eq!(payment.payment_method, "mobile_money");
        assert_eq!(payment.mobile_money_provider.as_deref(), Some("mtn"));

        let collection = collections.get(3).await.unwrap();
        assert_eq!(collection.current_amount, 900.0);
    }

    #[tokio::test]
    async fn test_submit_without_collection() {
        let payments = PaymentsService::new(test_pool().await);
        let mut req = request(15.5, None);
        req.payment_method = PaymentMethod::Card;
        req.mobile_money_provider = None;

        let payment = payments.submit(req).await.unwrap();
        assert_eq!(payment.collection_id, None);
        assert_eq!(payment.currency, "GHS");
    }

    #[tokio::test]
    async fn test_submit_takes_collection_currency() {
        let pool = seeded_pool().await;
        let payments = PaymentsService::new(pool.clone());
        sqlx::query("UPDATE collections SET currency = 'USD' WHERE id = 2")
            .execute(&pool)
            .await
            .unwrap();

        let payment = payments.submit(request(40.0, Some(2))).await.unwrap();
        assert_eq!(payment.currency, "USD");

        let mut explicit = request(10.0, Some(1));
        explicit.currency = Some("GHS".to_string());
        assert_eq!(payments.submit(explicit).await.unwrap().currency, "GHS");
    }

    #[tokio::test]
    async fn test_submit_rejects_foreign_currency_for_collection() {
        let pool = seeded_pool().await;
        let payments = PaymentsService::new(pool.clone());

        let mut usd = request(100.0, Some(1));
        usd.currency = Some("USD".to_string());
        assert!(matches!(
            payments.submit(usd).await,
            Err(ApiError::BadRequest(_))
        ));

        let amount: f64 = sqlx::query_scalar("SELECT current_amount FROM collections WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(amount, 1250.0);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);

        // Unlinked payments keep whatever currency they name
        let mut loose = request(100.0, None);
        loose.currency = Some("USD".to_string());
        assert_eq!(payments.submit(loose).await.unwrap().currency, "USD");
    }

    #[tokio::test]
    async fn test_submit_rejects_unknown_or_inactive_collection() {
        let pool = seeded_pool().await;
        let payments = PaymentsService::new(pool.clone());

        assert!(matches!(
            payments.submit(request(10.0, Some(404))).await,
            Err(ApiError::NotFound(_))
        ));

        sqlx::query("UPDATE collections SET status = 'completed' WHERE id = 1")
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(
            payments.submit(request(10.0, Some(1))).await,
            Err(ApiError::BadRequest(_))
        ));

        // Nothing was recorded for the refused attempts
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
        let amount: f64 = sqlx::query_scalar("SELECT current_amount FROM collections WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(amount, 1250.0);
    }

    #[tokio::test]
    async fn test_verify_and_get() {
        let pool = seeded_pool().await;
        let payments = PaymentsService::new(pool);

        let seeded = payments
            .get_by_reference("AGA_SEED000000000001")
            .await
            .unwrap();
        assert_eq!(seeded.amount, 100.0);
        assert_eq!(payments.get(seeded.id).await.unwrap().reference, seeded.reference);

        assert!(matches!(
            payments.get_by_reference("AGA_UNKNOWN").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(payments.get(999).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = seeded_pool().await;
        let payments = PaymentsService::new(pool);
        let fresh = payments.submit(request(5.0, Some(2))).await.unwrap();

        let listed = payments.list(&Pagination::default()).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].reference, fresh.reference);
        assert_eq!(listed[2].reference, "AGA_SEED000000000001");
    }

    #[tokio::test]
    async fn test_stats() {
        let pool = seeded_pool().await;
        let payments = PaymentsService::new(pool.clone());

        let empty = PaymentsService::new(test_pool().await).stats().await.unwrap();
        assert_eq!(empty.total_payments, 0);
        assert_eq!(empty.success_rate, 0.0);
        assert_eq!(empty.total_revenue, 0.0);

        sqlx::query(
            r#"
            INSERT INTO payments (reference, amount, currency, status, customer_email,
                                  customer_name, payment_method, created_at)
            VALUES ('AGA_FAILED00000001', 75.0, 'GHS', 'failed', 'x@y.z', 'X', 'card',
                    '2024-02-01T00:00:00Z')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let stats = payments.stats().await.unwrap();
        assert_eq!(stats.total_payments, 3);
        assert_eq!(stats.successful_payments, 2);
        assert_eq!(stats.failed_payments, 1);
        assert_eq!(stats.pending_payments, 0);
        assert_eq!(stats.total_revenue, 150.0);
        assert!((stats.success_rate - 66.666).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_admin_only_handlers() {
        let state = shared(test_state().await);

        assert!(matches!(
            handlers::list_payments(
                state.clone(),
                regular_user("U_USER01"),
                Query(Pagination::default())
            )
            .await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            handlers::payment_stats(state.clone(), regular_user("U_USER01")).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            handlers::get_payment(state.clone(), regular_user("U_USER01"), Path(1)).await,
            Err(ApiError::Forbidden(_))
        ));

        let Json(list) = handlers::list_payments(
            state,
            admin_user(),
            Query(Pagination::default()),
        )
        .await
        .unwrap();
        assert!(list.payments.is_empty());
    }

    #[tokio::test]
    async fn test_public_submit_and_verify_handlers() {
        let state = shared(test_state().await);

        let mut req = request(20.0, None);
        req.payment_method = PaymentMethod::Ussd;
        let submitted = handlers::submit_payment(state.clone(), Json(req)).await;
        assert!(submitted.is_ok());

        let reference: String = {
            let guard = state.0.read().await;
            sqlx::query_scalar("SELECT reference FROM payments LIMIT 1")
                .fetch_one(&guard.db)
                .await
                .unwrap()
        };

        let Json(verification) = handlers::verify_payment(state, Path(reference.clone()))
            .await
            .unwrap();
        assert_eq!(verification.reference, reference);
        assert_eq!(verification.status, "success");
    }
}
