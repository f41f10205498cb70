//! Repository traits for the product store

use async_trait::async_trait;
use serde_json::Value;

use crate::data::error::DataError;
use crate::data::types::{NewProduct, ProductSearchParams};

/// Repository trait for product catalog operations
///
/// Implemented by the SQLite backend.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Matching products for one page, plus the total match count
    async fn search_products(
        &self,
        params: &ProductSearchParams,
    ) -> Result<(Vec<Value>, u64), DataError>;

    /// Get a single product by ID
    async fn get_product(&self, id: &str) -> Result<Option<Value>, DataError>;

    /// Highest rated products, best first
    async fn top_rated_products(&self, limit: u32) -> Result<Vec<Value>, DataError>;

    /// Insert products atomically; either all are stored or none
    async fn insert_products(&self, products: &[NewProduct]) -> Result<Vec<Value>, DataError>;

    async fn count_products(&self) -> Result<u64, DataError>;
}
