// src/system/mod.rs
//! Banner, health check and the dev-only environment report

pub mod handlers;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::system_routes;
