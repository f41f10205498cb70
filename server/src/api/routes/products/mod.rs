//! Product API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::api::extractors::{ProductIdPath, SearchQuery, ValidatedQuery};
use crate::api::types::ApiError;
use crate::core::config::CatalogConfig;
use crate::data::{CatalogRepository, ProductSearchParams};
use crate::domain::catalog::{ProductSearch, SearchSettings};

use types::{ProductListResponse, TopRatedQuery};

/// Shared state for Products API endpoints
#[derive(Clone)]
pub struct ProductsApiState {
    pub repository: Arc<dyn CatalogRepository>,
    pub search: SearchSettings,
    pub top_rated_limit: u32,
}

/// Build Products API routes
pub fn routes(repository: Arc<dyn CatalogRepository>, catalog: &CatalogConfig) -> Router<()> {
    let state = ProductsApiState {
        repository,
        search: catalog.search_settings(),
        top_rated_limit: catalog.top_rated_limit,
    };

    Router::new()
        .route("/", get(list_products))
        .route("/top", get(top_products))
        .route("/{id}", get(get_product))
        .with_state(state)
}

/// Search products
///
/// `color`, `brand` and `category` match case-insensitively anywhere in the
/// field; `price` accepts `gt`, `gte`, `lt`, `lte` and `in` operators, e.g.
/// `price[gte]=10&price[lt]=50`.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(
        ("keyword" = Option<String>, Query, description = "Search product names"),
        ("page" = Option<u32>, Query, description = "Page number (default 1)"),
        ("limit" = Option<u32>, Query, description = "Products per page"),
        ("sort" = Option<String>, Query, description = "Sort fields, `-` prefix for descending, e.g. `-rating price`"),
        ("color" = Option<String>, Query, description = "Color filter"),
        ("brand" = Option<String>, Query, description = "Brand filter"),
        ("category" = Option<String>, Query, description = "Category filter"),
        ("price" = Option<String>, Query, description = "Exact price, or use price[gt], price[lte], ...")
    ),
    responses(
        (status = 200, description = "Matching products", body = ProductListResponse),
        (status = 400, description = "Unsupported filter field or invalid filter")
    )
)]
pub async fn list_products(
    State(state): State<ProductsApiState>,
    SearchQuery(params): SearchQuery,
) -> Result<Json<ProductListResponse>, ApiError> {
    let search = ProductSearch::from_params(&params, &state.search)?;
    let filter = search.filter.compile()?;
    tracing::debug!(
        filter = %search.filter.to_document(),
        page = search.page,
        limit = search.limit,
        "Searching products"
    );

    let (products, total) = state
        .repository
        .search_products(&ProductSearchParams {
            filter,
            sort: search.sort.clone(),
            skip: search.skip(),
            limit: search.limit as usize,
        })
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(ProductListResponse {
        products,
        page: search.page,
        pages: search.pages(total),
    }))
}

/// Top rated products, best first
#[utoipa::path(
    get,
    path = "/api/products/top",
    tag = "products",
    params(TopRatedQuery),
    responses(
        (status = 200, description = "Array of product documents"),
        (status = 400, description = "Invalid limit")
    )
)]
pub async fn top_products(
    State(state): State<ProductsApiState>,
    ValidatedQuery(query): ValidatedQuery<TopRatedQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let limit = query.limit.unwrap_or(state.top_rated_limit);
    let products = state
        .repository
        .top_rated_products(limit)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product document"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<ProductsApiState>,
    path: ProductIdPath,
) -> Result<Json<Value>, ApiError> {
    state
        .repository
        .get_product(&path.id)
        .await
        .map_err(ApiError::from_data)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("PRODUCT_NOT_FOUND", "Product not found"))
}
