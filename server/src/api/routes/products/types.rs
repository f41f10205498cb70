//! Product API types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// One page of a product listing
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    #[schema(value_type = Vec<Object>)]
    pub products: Vec<Value>,
    pub page: u32,
    pub pages: u64,
}

/// Query params for the top rated products
#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TopRatedQuery {
    /// Number of products (1-50); the configured default when absent
    #[validate(range(min = 1, max = 50, message = "Limit must be between 1 and 50"))]
    pub limit: Option<u32>,
}
