//! Shared data types for the store and API layers

mod catalog;

pub use catalog::{NewProduct, ProductRow, ProductSearchParams};
