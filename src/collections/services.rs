use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use super::models::{
    Collection, CollectionStatus, CreateCollectionRequest, UpdateCollectionRequest,
    DEFAULT_CURRENCY,
};
use super::validators::{check_dates, validate_increment};
use crate::auth::AuthedUser;
use crate::common::{ApiError, Pagination, ValidationResult, Validator};

const SELECT_COLLECTION: &str = r#"
    SELECT id, title, description, target_amount, current_amount, currency, status,
           is_public, start_date, end_date, created_at, updated_at, created_by
    FROM collections
"#;

/// Add `amount` to a collection's raised total on an open connection or transaction
///
/// Returns false when no collection has that id.
pub async fn add_to_current_amount(
    conn: &mut SqliteConnection,
    collection_id: i64,
    amount: f64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE collections SET current_amount = current_amount + ?, updated_at = ? WHERE id = ?",
    )
    .bind(amount)
    .bind(Utc::now().to_rfc3339())
    .bind(collection_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub struct CollectionsService {
    db: SqlitePool,
}

impl CollectionsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Public collections in insertion order
    pub async fn list_public(&self, page: &Pagination) -> Result<Vec<Collection>, ApiError> {
        let sql = format!(
            "{} WHERE is_public = 1 ORDER BY id ASC LIMIT ? OFFSET ?",
            SELECT_COLLECTION
        );
        let collections = sqlx::query_as::<_, Collection>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(collections)
    }

    pub async fn list_all(&self, page: &Pagination) -> Result<Vec<Collection>, ApiError> {
        let sql = format!("{} ORDER BY id ASC LIMIT ? OFFSET ?", SELECT_COLLECTION);
        let collections = sqlx::query_as::<_, Collection>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(collections)
    }

    pub async fn list_by_creator(
        &self,
        user_id: &str,
        page: &Pagination,
    ) -> Result<Vec<Collection>, ApiError> {
        let sql = format!(
            "{} WHERE created_by = ? ORDER BY id ASC LIMIT ? OFFSET ?",
            SELECT_COLLECTION
        );
        let collections = sqlx::query_as::<_, Collection>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(collections)
    }

    pub async fn get(&self, id: i64) -> Result<Collection, ApiError> {
        let sql = format!("{} WHERE id = ?", SELECT_COLLECTION);
        sqlx::query_as::<_, Collection>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Collection not found".to_string()))
    }

    /// Fetch a collection as `viewer` may see it
    ///
    /// Private collections are only visible to their creator and admins;
    /// everyone else gets NotFound.
    pub async fn get_visible(
        &self,
        id: i64,
        viewer: Option<&AuthedUser>,
    ) -> Result<Collection, ApiError> {
        let collection = self.get(id).await?;
        if collection.is_public {
            return Ok(collection);
        }

        match viewer {
            Some(user) if user.is_admin || user.id == collection.created_by => Ok(collection),
            _ => Err(ApiError::NotFound("Collection not found".to_string())),
        }
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    pub async fn create(
        &self,
        request: CreateCollectionRequest,
        created_by: &str,
    ) -> Result<Collection, ApiError> {
        request.validate(&request).into_result()?;

        let now = Utc::now().to_rfc3339();
        let currency = request
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO collections
                (title, description, target_amount, current_amount, currency, status,
                 is_public, start_date, end_date, created_at, updated_at, created_by)
            VALUES (?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.title.trim())
        .bind(&request.description)
        .bind(request.target_amount)
        .bind(&currency)
        .bind(CollectionStatus::Active.as_str())
        .bind(request.is_public.unwrap_or(true))
        .bind(&request.start_date)
        .bind(&request.end_date)
        .bind(&now)
        .bind(&now)
        .bind(created_by)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        let id = result.last_insert_rowid();
        info!(collection_id = id, created_by = %created_by, "Collection created");

        self.get(id).await
    }

    /// Partial update; only the creator or an admin
    pub async fn update(
        &self,
        id: i64,
        request: UpdateCollectionRequest,
        actor: &AuthedUser,
    ) -> Result<Collection, ApiError> {
        request.validate(&request).into_result()?;

        let existing = self.get(id).await?;
        ensure_can_modify(&existing, actor)?;

        let start_date = request.start_date.or(existing.start_date);
        let end_date = request.end_date.or(existing.end_date);

        let mut dates = ValidationResult::new();
        check_dates(&mut dates, start_date.as_deref(), end_date.as_deref());
        dates.into_result()?;

        let status = request
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status);

        sqlx::query(
            r#"
            UPDATE collections
            SET title = ?, description = ?, target_amount = ?, currency = ?, status = ?,
                is_public = ?, start_date = ?, end_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(
            request
                .title
                .map(|t| t.trim().to_string())
                .unwrap_or(existing.title),
        )
        .bind(request.description.or(existing.description))
        .bind(request.target_amount.or(existing.target_amount))
        .bind(request.currency.unwrap_or(existing.currency))
        .bind(status)
        .bind(request.is_public.unwrap_or(existing.is_public))
        .bind(start_date)
        .bind(end_date)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(collection_id = id, user_id = %actor.id, "Collection updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: i64, actor: &AuthedUser) -> Result<(), ApiError> {
        let existing = self.get(id).await?;
        ensure_can_modify(&existing, actor)?;

        sqlx::query("DELETE FROM collections WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(collection_id = id, user_id = %actor.id, "Collection deleted");
        Ok(())
    }

    /// Increase the raised total and return the updated collection
    ///
    /// A total above the target is allowed.
    pub async fn increment_amount(&self, id: i64, amount: f64) -> Result<Collection, ApiError> {
        validate_increment(amount).into_result()?;

        let mut conn = self.db.acquire().await.map_err(ApiError::DatabaseError)?;
        let found = add_to_current_amount(&mut *conn, id, amount)
            .await
            .map_err(ApiError::DatabaseError)?;
        drop(conn);

        if !found {
            return Err(ApiError::NotFound("Collection not found".to_string()));
        }

        let collection = self.get(id).await?;
        info!(
            collection_id = id,
            amount = amount,
            current_amount = collection.current_amount,
            "Collection amount incremented"
        );
        Ok(collection)
    }
}

fn ensure_can_modify(collection: &Collection, actor: &AuthedUser) -> Result<(), ApiError> {
    if actor.is_admin || actor.id == collection.created_by {
        return Ok(());
    }
    warn!(
        collection_id = collection.id,
        user_id = %actor.id,
        "Refused collection change by non-owner"
    );
    Err(ApiError::Forbidden(
        "Only the creator or an admin can modify this collection".to_string(),
    ))
}
