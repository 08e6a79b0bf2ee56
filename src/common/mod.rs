// Common module - shared types and utilities across all modules

pub mod database;
pub mod dev_mode;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{safe_email_log, safe_token_log, Pagination};
pub use id_generator::{generate_oauth_state, generate_payment_reference, generate_user_id};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
