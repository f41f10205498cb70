//! CatalogRepository trait implementation for SQLite
//!
//! Implements the CatalogRepository trait for Arc<SqliteService> so routes
//! can hold the store behind a trait object.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::data::error::DataError;
use crate::data::traits::CatalogRepository;
use crate::data::types::{NewProduct, ProductSearchParams};

use super::SqliteService;
use super::repositories::product;

#[async_trait]
impl CatalogRepository for Arc<SqliteService> {
    async fn search_products(
        &self,
        params: &ProductSearchParams,
    ) -> Result<(Vec<Value>, u64), DataError> {
        product::search_products(self.pool(), params)
            .await
            .map_err(Into::into)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Value>, DataError> {
        product::get_product(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn top_rated_products(&self, limit: u32) -> Result<Vec<Value>, DataError> {
        product::top_rated_products(self.pool(), limit)
            .await
            .map_err(Into::into)
    }

    async fn insert_products(&self, products: &[NewProduct]) -> Result<Vec<Value>, DataError> {
        product::insert_products(self.pool(), products)
            .await
            .map_err(Into::into)
    }

    async fn count_products(&self) -> Result<u64, DataError> {
        product::count_products(self.pool())
            .await
            .map_err(Into::into)
    }
}
