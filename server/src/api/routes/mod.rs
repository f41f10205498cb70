//! API route handlers

pub mod config;
pub mod health;
pub mod products;

use axum::Json;

use crate::core::constants::WELCOME_MESSAGE;

/// Root endpoint
pub async fn welcome() -> Json<&'static str> {
    Json(WELCOME_MESSAGE)
}
