// src/admin/validators.rs

use super::models::UpdateUserRequest;
use crate::auth::models::{ROLE_ADMIN, ROLE_USER};
use crate::common::{ValidationResult, Validator};

impl Validator<UpdateUserRequest> for UpdateUserRequest {
    fn validate(&self, data: &UpdateUserRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.role.is_none() && data.full_name.is_none() {
            result.add_error("request", "Nothing to update");
        }

        if let Some(role) = &data.role {
            if role != ROLE_ADMIN && role != ROLE_USER {
                result.add_error("role", "Role must be 'admin' or 'user'");
            }
        }

        if let Some(name) = &data.full_name {
            if name.trim().is_empty() {
                result.add_error("full_name", "Name must not be empty");
            } else if name.chars().count() > 100 {
                result.add_error("full_name", "Name must not exceed 100 characters");
            }
        }

        result
    }
}
