// src/admin/models.rs

use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::collections::models::CollectionResponse;
use crate::payments::models::{Payment, PaymentStats};

// Dashboard models
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub collections: CollectionMetrics,
    pub payments: PaymentStats,
    pub users: UserMetrics,
    pub recent_payments: Vec<Payment>,
    pub top_collections: Vec<CollectionResponse>,
    pub last_updated: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CollectionMetrics {
    pub total: i64,
    pub active: i64,
    pub public: i64,
    pub total_raised: f64,
    pub total_target: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserMetrics {
    pub total: i64,
    pub active: i64,
    pub admins: i64,
}

// User management models
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleStatusResponse {
    pub message: String,
    pub user: User,
}
