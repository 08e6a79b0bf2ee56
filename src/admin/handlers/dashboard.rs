// src/admin/handlers/dashboard.rs

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::admin::models::DashboardMetrics;
use crate::admin::services::AdminService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /api/admin/dashboard/metrics - Totals across collections, payments and users
pub async fn get_dashboard_metrics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let state = state_lock.read().await.clone();

    if !authed.is_admin {
        warn!(
            user_id = %authed.id,
            "Dashboard metrics access denied: admin privileges required"
        );
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }

    info!(admin_user_id = %authed.id, "Fetching dashboard metrics");

    let metrics = AdminService::new(state.db).dashboard_metrics().await?;

    info!(
        admin_user_id = %authed.id,
        total_collections = metrics.collections.total,
        total_payments = metrics.payments.total_payments,
        total_users = metrics.users.total,
        "Dashboard metrics calculated"
    );

    Ok(Json(metrics))
}
