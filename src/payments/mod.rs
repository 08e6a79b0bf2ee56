//! # Payments Module
//!
//! Mock payments against collections. A submitted payment settles at once
//! and feeds the collection's raised total.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::payments_routes;
