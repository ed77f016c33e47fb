// src/lib.rs

pub mod config;
pub mod coverage;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod state;

// Re-export specific items for convenience if needed
pub use routes::create_router;
