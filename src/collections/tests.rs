//! Tests for collections module
//!
//! These tests verify:
//! - Progress calculation and request validation
//! - Visibility of private collections
//! - Ownership rules on update and delete
//! - The amount increment

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::testing::{admin_user, regular_user, shared, test_state};
    use crate::common::{database::test_pool, ApiError, Pagination, Validator};
    use axum::extract::{Json, Path, Query};
    use models::{CollectionStatus, CreateCollectionRequest, UpdateCollectionRequest};
    use services::CollectionsService;

    fn create_request(title: &str) -> CreateCollectionRequest {
        CreateCollectionRequest {
            title: title.to_string(),
            description: Some("For the community".to_string()),
            target_amount: Some(1000.0),
            currency: None,
            is_public: None,
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-09-30".to_string()),
        }
    }

    fn collection(target: Option<f64>, current: f64) -> models::Collection {
        models::Collection {
            id: 1,
            title: "Test".to_string(),
            description: None,
            target_amount: target,
            current_amount: current,
            currency: "GHS".to_string(),
            status: "active".to_string(),
            is_public: true,
            start_date: None,
            end_date: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: None,
            created_by: "U_000001".to_string(),
        }
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(collection(Some(5000.0), 1250.0).progress_percentage(), 25.0);
        assert_eq!(collection(Some(100.0), 250.0).progress_percentage(), 100.0);
        assert_eq!(collection(None, 250.0).progress_percentage(), 0.0);
        assert_eq!(collection(Some(0.0), 250.0).progress_percentage(), 0.0);
    }

    #[test]
    fn test_response_flattens_collection() {
        let value =
            serde_json::to_value(models::CollectionResponse::from(collection(Some(200.0), 50.0)))
                .unwrap();
        assert_eq!(value["title"], "Test");
        assert_eq!(value["is_public"], true);
        assert_eq!(value["progress_percentage"], 25.0);
    }

    #[test]
    fn test_create_validation() {
        let valid = create_request("School Fees");
        assert!(valid.validate(&valid).is_valid);

        let mut bad = create_request("   ");
        bad.target_amount = Some(-5.0);
        bad.currency = Some("ghs".to_string());
        bad.start_date = Some("2024-10-01".to_string());
        bad.end_date = Some("2024-09-01".to_string());
        let result = bad.validate(&bad);
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "target_amount", "currency", "end_date"]);

        let mut long = create_request(&"x".repeat(201));
        long.start_date = Some("01/03/2024".to_string());
        let result = long.validate(&long);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_create_request_accepts_camel_case() {
        let request: CreateCollectionRequest = serde_json::from_str(
            r#"{"title":"Fund","targetAmount":300,"isPublic":false,"endDate":"2025-01-01"}"#,
        )
        .unwrap();
        assert_eq!(request.target_amount, Some(300.0));
        assert_eq!(request.is_public, Some(false));
        assert_eq!(request.end_date.as_deref(), Some("2025-01-01"));
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let service = CollectionsService::new(test_pool().await);
        let created = service
            .create(create_request("Harvest"), "U_OWNER1")
            .await
            .unwrap();

        assert_eq!(created.current_amount, 0.0);
        assert_eq!(created.status, "active");
        assert_eq!(created.currency, "GHS");
        assert!(created.is_public);
        assert_eq!(created.created_by, "U_OWNER1");
        assert!(created.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_list_public_order_and_pagination() {
        let service = CollectionsService::new(test_pool().await);
        for title in ["A", "B", "C"] {
            service.create(create_request(title), "U_OWNER1").await.unwrap();
        }
        let mut hidden = create_request("Hidden");
        hidden.is_public = Some(false);
        service.create(hidden, "U_OWNER1").await.unwrap();

        let all_public = service.list_public(&Pagination::default()).await.unwrap();
        let titles: Vec<_> = all_public.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);

        let page = service
            .list_public(&Pagination {
                skip: Some(1),
                limit: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "B");

        assert_eq!(service.list_all(&Pagination::default()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_private_collection_visibility() {
        let service = CollectionsService::new(test_pool().await);
        let mut request = create_request("Private");
        request.is_public = Some(false);
        let private = service.create(request, "U_OWNER1").await.unwrap();

        let anonymous = service.get_visible(private.id, None).await;
        assert!(matches!(anonymous, Err(ApiError::NotFound(_))));

        let stranger = regular_user("U_OTHER1");
        assert!(service.get_visible(private.id, Some(&stranger)).await.is_err());

        let owner = regular_user("U_OWNER1");
        assert!(service.get_visible(private.id, Some(&owner)).await.is_ok());
        assert!(service
            .get_visible(private.id, Some(&admin_user()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_ownership_and_partial_fields() {
        let service = CollectionsService::new(test_pool().await);
        let created = service
            .create(create_request("Original"), "U_OWNER1")
            .await
            .unwrap();

        let stranger = service
            .update(
                created.id,
                UpdateCollectionRequest {
                    title: Some("Hijacked".to_string()),
                    ..Default::default()
                },
                &regular_user("U_OTHER1"),
            )
            .await;
        assert!(matches!(stranger, Err(ApiError::Forbidden(_))));

        let updated = service
            .update(
                created.id,
                UpdateCollectionRequest {
                    status: Some(CollectionStatus::Paused),
                    ..Default::default()
                },
                &regular_user("U_OWNER1"),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "paused");
        assert_eq!(updated.title, "Original");
        assert_eq!(updated.target_amount, Some(1000.0));
    }

    #[tokio::test]
    async fn test_update_checks_dates_against_stored_values() {
        let service = CollectionsService::new(test_pool().await);
        let created = service
            .create(create_request("Dated"), "U_OWNER1")
            .await
            .unwrap();

        // stored start is 2024-03-01
        let result = service
            .update(
                created.id,
                UpdateCollectionRequest {
                    end_date: Some("2024-02-01".to_string()),
                    ..Default::default()
                },
                &admin_user(),
            )
            .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_by_admin_and_missing() {
        let service = CollectionsService::new(test_pool().await);
        let created = service
            .create(create_request("Temp"), "U_OWNER1")
            .await
            .unwrap();

        assert!(matches!(
            service.delete(created.id, &regular_user("U_OTHER1")).await,
            Err(ApiError::Forbidden(_))
        ));
        service.delete(created.id, &admin_user()).await.unwrap();
        assert!(matches!(
            service.get(created.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(created.id, &admin_user()).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_increment_amount() {
        let service = CollectionsService::new(test_pool().await);
        let mut request = create_request("Small target");
        request.target_amount = Some(100.0);
        let created = service.create(request, "U_OWNER1").await.unwrap();

        let updated = service.increment_amount(created.id, 60.0).await.unwrap();
        assert_eq!(updated.current_amount, 60.0);

        // Overshooting the target is allowed
        let updated = service.increment_amount(created.id, 60.0).await.unwrap();
        assert_eq!(updated.current_amount, 120.0);
        assert_eq!(updated.progress_percentage(), 100.0);

        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                service.increment_amount(created.id, bad).await,
                Err(ApiError::ValidationError(_))
            ));
        }
        assert!(matches!(
            service.increment_amount(9999, 10.0).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_increment_handler_response() {
        let app_state = test_state().await;
        let created = CollectionsService::new(app_state.db.clone())
            .create(create_request("Roof"), "U_ADMIN1")
            .await
            .unwrap();

        let Json(body) = handlers::increment_collection_amount(
            shared(app_state),
            admin_user(),
            Path(created.id),
            Json(models::IncrementAmountRequest { amount: 250.0 }),
        )
        .await
        .unwrap();

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["collection_id"], created.id);
        assert_eq!(value["current_amount"], 250.0);
        assert_eq!(value["progress_percentage"], 25.0);
        assert!(value["message"].as_str().unwrap().contains("updated"));
    }

    #[tokio::test]
    async fn test_handlers_enforce_admin() {
        let state = shared(test_state().await);

        let result = handlers::create_collection(
            state.clone(),
            regular_user("U_USER01"),
            Json(create_request("Nope")),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));

        let result = handlers::increment_collection_amount(
            state.clone(),
            regular_user("U_USER01"),
            Path(1),
            Json(models::IncrementAmountRequest { amount: 10.0 }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));

        let result = handlers::list_all_collections(
            state.clone(),
            regular_user("U_USER01"),
            Query(Pagination::default()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));

        // Any signed-in user may create their own
        let created = handlers::create_my_collection(
            state.clone(),
            regular_user("U_USER01"),
            Json(create_request("Mine")),
        )
        .await;
        assert!(created.is_ok());

        let Json(mine) = handlers::list_my_collections(
            state,
            regular_user("U_USER01"),
            Query(Pagination::default()),
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].collection.title, "Mine");
    }

    #[tokio::test]
    async fn test_admin_list_includes_private() {
        let state = shared(test_state().await);

        let mut private = create_request("Private drive");
        private.is_public = Some(false);
        handlers::create_my_collection(state.clone(), regular_user("U_USER01"), Json(private))
            .await
            .unwrap();
        handlers::create_collection(state.clone(), admin_user(), Json(create_request("Open")))
            .await
            .unwrap();

        let Json(public) =
            handlers::list_public_collections(state.clone(), Query(Pagination::default()))
                .await
                .unwrap();
        assert_eq!(public.len(), 1);

        let Json(all) =
            handlers::list_all_collections(state, admin_user(), Query(Pagination::default()))
                .await
                .unwrap();
        let titles: Vec<_> = all.iter().map(|c| c.collection.title.as_str()).collect();
        assert_eq!(titles, vec!["Private drive", "Open"]);
    }
}
