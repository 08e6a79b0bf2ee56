// src/admin/handlers/users.rs

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::admin::models::{ToggleStatusResponse, UpdateUserRequest, UserListResponse};
use crate::admin::services::AdminService;
use crate::auth::{AuthedUser, User};
use crate::common::{ApiError, AppState, Pagination};

fn require_admin(authed: &AuthedUser, action: &str) -> Result<(), ApiError> {
    if !authed.is_admin {
        warn!(
            user_id = %authed.id,
            action = action,
            "User management access denied: admin privileges required"
        );
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }
    Ok(())
}

/// GET /api/users and /api/admin/users - All registered users
pub async fn list_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<UserListResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    require_admin(&authed, "list_users")?;

    let users = AdminService::new(state.db)
        .list_users(&page)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch user list");
            e
        })?;

    info!(
        admin_user_id = %authed.id,
        user_count = users.len(),
        "User list fetched"
    );

    Ok(Json(UserListResponse { users }))
}

/// PUT /api/admin/users/:id - Change a user's role or name
pub async fn update_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();
    require_admin(&authed, "update_user")?;

    info!(
        admin_user_id = %authed.id,
        target_user_id = %user_id,
        role = ?request.role,
        "Updating user"
    );

    let user = AdminService::new(state.db)
        .update_user(&user_id, request)
        .await?;

    Ok(Json(user))
}

/// PATCH /api/admin/users/:id/toggle-status - Activate or deactivate a user
pub async fn toggle_user_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
) -> Result<Json<ToggleStatusResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    require_admin(&authed, "toggle_user_status")?;

    let user = AdminService::new(state.db)
        .toggle_status(&user_id, &authed.id)
        .await?;

    let message = if user.is_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };

    Ok(Json(ToggleStatusResponse {
        message: message.to_string(),
        user,
    }))
}
