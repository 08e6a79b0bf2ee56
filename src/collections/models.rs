use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_CURRENCY: &str = "GHS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Active => "active",
            CollectionStatus::Paused => "paused",
            CollectionStatus::Completed => "completed",
            CollectionStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Option<f64>,
    pub current_amount: f64,
    pub currency: String,
    pub status: String, // active | paused | completed | cancelled
    pub is_public: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub created_by: String,
}

impl Collection {
    /// Share of the target raised, clamped to 0..=100 (0 without a target)
    pub fn progress_percentage(&self) -> f64 {
        match self.target_amount {
            Some(target) if target > 0.0 => {
                (self.current_amount / target * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CollectionStatus::Active.as_str()
    }
}

/// Collection as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResponse {
    #[serde(flatten)]
    pub collection: Collection,
    pub progress_percentage: f64,
}

impl From<Collection> for CollectionResponse {
    fn from(collection: Collection) -> Self {
        let progress_percentage = collection.progress_percentage();
        Self {
            collection,
            progress_percentage,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(alias = "targetAmount")]
    pub target_amount: Option<f64>,
    pub currency: Option<String>,
    #[serde(alias = "isPublic")]
    pub is_public: Option<bool>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCollectionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "targetAmount")]
    pub target_amount: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<CollectionStatus>,
    #[serde(alias = "isPublic")]
    pub is_public: Option<bool>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncrementAmountRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct AmountResponse {
    pub message: String,
    pub collection_id: i64,
    pub current_amount: f64,
    pub progress_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
