//! Data storage layer
//!
//! - `sqlite` - Product document store
//! - `types` - Shared data types
//! - `traits` - Repository traits
//! - `error` - Unified error type

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::CatalogRepository;
pub use types::{NewProduct, ProductSearchParams};
