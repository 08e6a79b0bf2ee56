//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google and Apple OAuth sign-in
//! - Session token minting and validation
//! - AuthedUser extractor for protected routes

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;


pub use extractors::{AuthedUser, MaybeAuthedUser};
pub use models::User;
pub use routes::auth_routes;
