use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{
    AmountResponse, CollectionResponse, CreateCollectionRequest, IncrementAmountRequest,
    MessageResponse, UpdateCollectionRequest,
};
use super::services::CollectionsService;
use crate::auth::{AuthedUser, MaybeAuthedUser};
use crate::common::{ApiError, AppState, Pagination};

fn into_responses(collections: Vec<super::models::Collection>) -> Vec<CollectionResponse> {
    collections.into_iter().map(CollectionResponse::from).collect()
}

/// GET /api/collections - Public collections
pub async fn list_public_collections(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CollectionResponse>>, ApiError> {
    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collections = service.list_public(&page).await?;
    Ok(Json(into_responses(collections)))
}

/// POST /api/collections - Create a collection (admin)
pub async fn create_collection(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !user.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collection = service.create(request, &user.id).await?;
    Ok((StatusCode::CREATED, Json(CollectionResponse::from(collection))))
}

/// GET /api/admin/collections - Every collection, public or not (admin)
pub async fn list_all_collections(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CollectionResponse>>, ApiError> {
    if !user.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collections = service.list_all(&page).await?;
    Ok(Json(into_responses(collections)))
}

/// GET /api/collections/my-collections - Collections created by the caller
pub async fn list_my_collections(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CollectionResponse>>, ApiError> {
    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collections = service.list_by_creator(&user.id, &page).await?;
    Ok(Json(into_responses(collections)))
}

/// POST /api/collections/my-collections - Create a collection owned by the caller
pub async fn create_my_collection(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collection = service.create(request, &user.id).await?;
    Ok((StatusCode::CREATED, Json(CollectionResponse::from(collection))))
}

/// GET /api/collections/:id
pub async fn get_collection(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    MaybeAuthedUser(viewer): MaybeAuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<CollectionResponse>, ApiError> {
    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collection = service.get_visible(id, viewer.as_ref()).await?;
    Ok(Json(collection.into()))
}

/// PUT /api/collections/:id
pub async fn update_collection(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCollectionRequest>,
) -> Result<Json<CollectionResponse>, ApiError> {
    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collection = service.update(id, request, &user).await?;
    Ok(Json(collection.into()))
}

/// DELETE /api/collections/:id
pub async fn delete_collection(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    service.delete(id, &user).await?;
    Ok(Json(MessageResponse {
        message: "Collection deleted successfully".to_string(),
    }))
}

/// POST /api/collections/:id/amount - Record money raised outside the payment flow (admin)
pub async fn increment_collection_amount(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<i64>,
    Json(request): Json<IncrementAmountRequest>,
) -> Result<Json<AmountResponse>, ApiError> {
    if !user.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let app_state = state.read().await;
    let service = CollectionsService::new(app_state.db.clone());

    let collection = service.increment_amount(id, request.amount).await?;
    Ok(Json(AmountResponse {
        message: "Collection amount updated successfully".to_string(),
        collection_id: collection.id,
        current_amount: collection.current_amount,
        progress_percentage: collection.progress_percentage(),
    }))
}
