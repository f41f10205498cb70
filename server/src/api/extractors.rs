//! Request extractors for API routes
//!
//! Rejections render as the same JSON error body as [`ApiError`](super::types::ApiError).

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::constants::MAX_PRODUCT_ID_LENGTH;
use crate::domain::catalog::{QueryParseError, RawQueryParameters, parse_query_string};

/// Validate a product id: 1-64 chars, no control characters
pub fn is_valid_product_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_PRODUCT_ID_LENGTH && !id.chars().any(char::is_control)
}

/// Validated product path extractor.
///
/// Extracts `id` from the URL path. Returns a 400 Bad Request if it is empty,
/// too long, or holds control characters.
#[derive(Debug)]
pub struct ProductIdPath {
    pub id: String,
}

impl<S> FromRequestParts<S> for ProductIdPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        if !is_valid_product_id(&id) {
            return Err(ValidationRejection::InvalidProductId);
        }

        Ok(Self { id })
    }
}

/// Raw query string decoded with bracket nesting (`price[gt]=100`)
#[derive(Debug)]
pub struct SearchQuery(pub RawQueryParameters);

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.uri.query().unwrap_or_default();
        let params = parse_query_string(raw).map_err(ValidationRejection::QueryString)?;
        tracing::trace!(params = ?params, "Decoded search query");
        Ok(Self(params))
    }
}

/// Validation rejection with structured error response
#[derive(Debug)]
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Invalid product id format
    InvalidProductId,
    /// Failed to deserialize query parameters
    Query(QueryRejection),
    /// Query string could not be decoded
    QueryString(QueryParseError),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            Self::Path(rejection) => ("PATH_PARSE_ERROR", rejection.body_text()),
            Self::InvalidProductId => (
                "INVALID_PRODUCT_ID",
                format!(
                    "Invalid product id: must be 1-{} characters",
                    MAX_PRODUCT_ID_LENGTH
                ),
            ),
            Self::Query(rejection) => ("QUERY_PARSE_ERROR", rejection.body_text()),
            Self::QueryString(e) => ("QUERY_PARSE_ERROR", e.to_string()),
            Self::Validation(errors) => ("VALIDATION_ERROR", format_validation_errors(&errors)),
        };
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters and validates them using the `validator` crate.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_is_valid_product_id() {
        assert!(is_valid_product_id("5f1a2b3c4d5e6f7a8b9c0d1e"));
        assert!(!is_valid_product_id(""));
        assert!(!is_valid_product_id(&"x".repeat(65)));
        assert!(!is_valid_product_id("bad\nid"));
    }

    #[tokio::test]
    async fn test_search_query_decodes_brackets() {
        let mut parts = parts("/api/products?price%5Bgt%5D=100&color=red");
        let SearchQuery(params) = SearchQuery::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(params.get("color").and_then(|v| v.as_text()), Some("red"));
        let price = params.get("price").and_then(|v| v.as_map()).unwrap();
        assert_eq!(price.get("gt").and_then(|v| v.as_text()), Some("100"));
    }

    #[tokio::test]
    async fn test_search_query_without_query_string() {
        let mut parts = parts("/api/products");
        let SearchQuery(params) = SearchQuery::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_rejection_status() {
        let response = ValidationRejection::InvalidProductId.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
