//! Product repository for SQLite operations
//!
//! Products are stored as whole JSON documents. Listing scans documents in
//! insertion order and applies the compiled predicate in memory, so any
//! document field can be filtered on.

use futures::TryStreamExt;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewProduct, ProductRow, ProductSearchParams};

/// Insert products in one transaction and return the stored documents
pub async fn insert_products(
    pool: &SqlitePool,
    products: &[NewProduct],
) -> Result<Vec<Value>, SqliteError> {
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;
    let mut documents = Vec::with_capacity(products.len());

    for product in products {
        let id = product.id.clone().unwrap_or_else(cuid2::create_id);
        let document = product.to_document(&id, now)?;

        sqlx::query(
            "INSERT INTO products (id, name, rating, document, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&product.name)
        .bind(product.rating)
        .bind(document.to_string())
        .bind(now.timestamp())
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                SqliteError::Conflict(format!("Product {} already exists", id))
            }
            _ => SqliteError::Database(e),
        })?;

        documents.push(document);
    }

    tx.commit().await?;
    tracing::debug!(count = documents.len(), "Inserted products");
    Ok(documents)
}

/// Get a product document by ID
pub async fn get_product(pool: &SqlitePool, id: &str) -> Result<Option<Value>, SqliteError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT id, document FROM products WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, document)| ProductRow { id, document }.into_document())
        .transpose()
        .map_err(Into::into)
}

/// Find matching products; returns the requested page and the total match count
pub async fn search_products(
    pool: &SqlitePool,
    params: &ProductSearchParams,
) -> Result<(Vec<Value>, u64), SqliteError> {
    let mut rows =
        sqlx::query_as::<_, (String, String)>("SELECT id, document FROM products ORDER BY rowid")
            .fetch(pool);

    let mut matched = Vec::new();
    while let Some((id, document)) = rows.try_next().await? {
        let document = ProductRow { id, document }.into_document()?;
        if params.filter.matches(&document) {
            matched.push(document);
        }
    }

    let total = matched.len() as u64;
    params.sort.sort(&mut matched);

    let page = matched
        .into_iter()
        .skip(params.skip)
        .take(params.limit)
        .collect::<Vec<_>>();

    tracing::trace!(total, returned = page.len(), "Product search");
    Ok((page, total))
}

/// Highest rated products first; ties keep insertion order
pub async fn top_rated_products(pool: &SqlitePool, limit: u32) -> Result<Vec<Value>, SqliteError> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT id, document FROM products ORDER BY rating DESC, rowid LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, document)| ProductRow { id, document }.into_document())
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
}

/// Count all stored products
pub async fn count_products(pool: &SqlitePool) -> Result<u64, SqliteError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(count as u64)
}
