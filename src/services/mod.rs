// src/services/mod.rs
//
// Shared services used across the domain modules

pub mod oauth;
pub mod rate_limit;

// Re-export commonly used types for convenience
pub use oauth::OAuthService;
pub use rate_limit::RateLimitService;
