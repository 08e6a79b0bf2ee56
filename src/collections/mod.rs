//! # Collections Module
//!
//! Fundraising campaigns: public listing, creator-owned management and
//! the raised-amount counter that payments feed into.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::collections_routes;
