//! Client configuration endpoints

use axum::Router;
use axum::extract::State;
use axum::routing::get;

use crate::api::types::ApiError;
use crate::core::config::PaypalConfig;

#[derive(Clone)]
pub struct ConfigApiState {
    pub paypal: PaypalConfig,
}

pub fn routes(paypal: PaypalConfig) -> Router<()> {
    Router::new()
        .route("/paypal", get(paypal_client_id))
        .with_state(ConfigApiState { paypal })
}

/// PayPal client id for the checkout page, as plain text
#[utoipa::path(
    get,
    path = "/api/config/paypal",
    tag = "config",
    responses(
        (status = 200, description = "PayPal client id", body = String, content_type = "text/plain"),
        (status = 404, description = "PayPal is not configured")
    )
)]
pub async fn paypal_client_id(State(state): State<ConfigApiState>) -> Result<String, ApiError> {
    state.paypal.client_id.ok_or_else(|| {
        ApiError::not_found("PAYPAL_NOT_CONFIGURED", "PayPal client id is not configured")
    })
}
