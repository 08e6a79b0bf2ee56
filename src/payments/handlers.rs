use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{
    Payment, PaymentListResponse, PaymentStats, PaymentVerification, SubmitPaymentRequest,
    SubmitPaymentResponse,
};
use super::services::PaymentsService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Pagination};

fn require_admin(user: &AuthedUser) -> Result<(), ApiError> {
    if !user.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

/// GET /api/payments - All payments, newest first (admin)
pub async fn list_payments(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<PaymentListResponse>, ApiError> {
    require_admin(&user)?;

    let app_state = state.read().await;
    let service = PaymentsService::new(app_state.db.clone());

    let payments = service.list(&page).await?;
    Ok(Json(PaymentListResponse { payments }))
}

/// POST /api/payments - Submit a mock payment
pub async fn submit_payment(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<SubmitPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let service = PaymentsService::new(app_state.db.clone());

    let payment = service.submit(request).await?;
    Ok((
        StatusCode::OK,
        Json(SubmitPaymentResponse {
            success: true,
            message: "Payment processed successfully".to_string(),
            payment,
        }),
    ))
}

/// GET /api/payments/stats (admin)
pub async fn payment_stats(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
) -> Result<Json<PaymentStats>, ApiError> {
    require_admin(&user)?;

    let app_state = state.read().await;
    let service = PaymentsService::new(app_state.db.clone());

    Ok(Json(service.stats().await?))
}

/// GET /api/payments/verify/:reference - Public status lookup
pub async fn verify_payment(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(reference): Path<String>,
) -> Result<Json<PaymentVerification>, ApiError> {
    let app_state = state.read().await;
    let service = PaymentsService::new(app_state.db.clone());

    let payment = service.get_by_reference(reference.trim()).await?;
    Ok(Json(payment.into()))
}

/// GET /api/payments/:id (admin)
pub async fn get_payment(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ApiError> {
    require_admin(&user)?;

    let app_state = state.read().await;
    let service = PaymentsService::new(app_state.db.clone());

    Ok(Json(service.get(id).await?))
}
