//! SQLite repositories
//!
//! Types (NewProduct, ProductSearchParams, etc.) should be imported from `crate::data::types`.

pub mod product;

pub use product::{
    count_products, get_product, insert_products, search_products, top_rated_products,
};
