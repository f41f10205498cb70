//! Domain logic for the storefront
//!
//! - `catalog` - Query-string decoding, filter translation, predicate evaluation and search composition

pub mod catalog;

pub use catalog::{
    FieldPredicate, FilterPredicate, ProductSearch, QueryValue, RawQueryParameters,
    UnsupportedFieldError,
};
