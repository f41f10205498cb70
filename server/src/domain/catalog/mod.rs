//! Product catalog query handling
//!
//! A product listing request flows through these stages:
//!
//! 1. `params` decodes the raw URL query string into [`RawQueryParameters`]
//!    (`price[gt]=100` becomes a nested map).
//! 2. `filter` validates field names and translates the parameters into a
//!    [`FilterPredicate`].
//! 3. `search` adds the keyword, paging and sort settings.
//! 4. `predicate` compiles the predicate and matches it against stored
//!    product documents.

pub mod filter;
pub mod params;
pub mod predicate;
pub mod search;
mod value;

pub use filter::{FilterTranslator, UnsupportedFieldError, translate};
pub use params::{QueryParseError, QueryStringParser, parse_query_string};
pub use predicate::{CompiledPredicate, FieldPredicate, FilterPredicate, PredicateError};
pub use search::{ProductSearch, SearchSettings, SortDirection, SortKey, SortSpec};
pub use value::{QueryValue, RawQueryParameters};
