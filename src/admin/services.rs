// src/admin/services.rs

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::models::{CollectionMetrics, DashboardMetrics, UpdateUserRequest, UserMetrics};
use crate::auth::User;
use crate::collections::models::{Collection, CollectionResponse};
use crate::common::{ApiError, Pagination, Validator};
use crate::payments::services::PaymentsService;

const DASHBOARD_LIST_SIZE: i64 = 5;

pub struct AdminService {
    db: SqlitePool,
}

impl AdminService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ApiError> {
        let (total, active, public, total_raised, total_target): (i64, i64, i64, f64, f64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN is_public = 1 THEN 1 ELSE 0 END), 0),
                    TOTAL(current_amount),
                    TOTAL(target_amount)
                FROM collections
                "#,
            )
            .fetch_one(&self.db)
            .await?;

        let (users_total, users_active, admins): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END), 0)
            FROM users
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let top_collections = sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections ORDER BY current_amount DESC, id ASC LIMIT ?",
        )
        .bind(DASHBOARD_LIST_SIZE)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(CollectionResponse::from)
        .collect();

        let payments = PaymentsService::new(self.db.clone());

        Ok(DashboardMetrics {
            collections: CollectionMetrics {
                total,
                active,
                public,
                total_raised,
                total_target,
            },
            payments: payments.stats().await?,
            users: UserMetrics {
                total: users_total,
                active: users_active,
                admins,
            },
            recent_payments: payments.recent(DASHBOARD_LIST_SIZE).await?,
            top_collections,
            last_updated: Utc::now().to_rfc3339(),
        })
    }

    pub async fn list_users(&self, page: &Pagination) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> Result<User, ApiError> {
        request.validate(&request).into_result()?;

        let existing = self.get_user(user_id).await?;

        sqlx::query("UPDATE users SET role = ?, full_name = ? WHERE id = ?")
            .bind(request.role.unwrap_or(existing.role))
            .bind(
                request
                    .full_name
                    .map(|n| n.trim().to_string())
                    .unwrap_or(existing.full_name),
            )
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(target_user_id = %user_id, "User updated by admin");
        self.get_user(user_id).await
    }

    /// Flip `is_active`; an admin may not deactivate their own account
    pub async fn toggle_status(&self, user_id: &str, actor_id: &str) -> Result<User, ApiError> {
        let existing = self.get_user(user_id).await?;

        if existing.is_active && existing.id == actor_id {
            return Err(ApiError::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(!existing.is_active)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(
            target_user_id = %user_id,
            is_active = !existing.is_active,
            "User status toggled by admin"
        );
        self.get_user(user_id).await
    }
}
