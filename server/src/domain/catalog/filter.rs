//! Query filter translation
//!
//! Turns loosely-typed search parameters into a [`FilterPredicate`]:
//!
//! - reserved keys (`page`, `sort`, `limit`, `fields`, `keyword`) are dropped,
//! - every remaining key must be a filterable field, otherwise translation
//!   fails as a whole,
//! - operator tokens used as nested keys (`price[gt]=100`) are rewritten to
//!   their `$`-prefixed store form at any depth,
//! - `price` is kept as is, every other field becomes a case-insensitive
//!   pattern match.
//!
//! Plain equality on a text field (`color=red`) is a substring search, so
//! `color=red` also matches `"dark red"`.

use thiserror::Error;

use super::predicate::{FieldPredicate, FilterPredicate};
use super::value::{QueryValue, RawQueryParameters};

/// Keys with paging, sorting or keyword meaning
pub const RESERVED_KEYS: &[&str] = &["page", "sort", "limit", "fields", "keyword"];

/// Fields a client may filter on
pub const FILTERABLE_FIELDS: &[&str] = &["color", "price", "brand", "category"];

/// Fields compared by value instead of by pattern
pub const VALUE_FIELDS: &[&str] = &["price"];

/// Comparison operator tokens accepted as nested keys
pub const OPERATOR_TOKENS: &[&str] = &["gt", "gte", "lt", "lte", "in"];

/// Prefix marking an operator key in the store form
pub const OPERATOR_PREFIX: char = '$';

/// A query parameter names a field that cannot be filtered on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The parameter {field} is not supported for searching.")]
pub struct UnsupportedFieldError {
    pub field: String,
}

/// Translate with the default field lists
pub fn translate(params: &RawQueryParameters) -> Result<FilterPredicate, UnsupportedFieldError> {
    FilterTranslator::default().translate(params)
}

/// Filter translator over fixed field lists
#[derive(Debug, Clone, Copy)]
pub struct FilterTranslator {
    reserved: &'static [&'static str],
    allowed: &'static [&'static str],
    value_fields: &'static [&'static str],
}

impl Default for FilterTranslator {
    fn default() -> Self {
        Self::new(RESERVED_KEYS, FILTERABLE_FIELDS, VALUE_FIELDS)
    }
}

impl FilterTranslator {
    pub const fn new(
        reserved: &'static [&'static str],
        allowed: &'static [&'static str],
        value_fields: &'static [&'static str],
    ) -> Self {
        Self {
            reserved,
            allowed,
            value_fields,
        }
    }

    /// Build a predicate from request parameters.
    ///
    /// No partial predicate is ever returned: the first key outside the
    /// reserved and filterable sets aborts with [`UnsupportedFieldError`].
    /// Parameters are keyed by name, so "first" means first in name order,
    /// not first in the query string (`zeta=1&alpha=2` reports `alpha`).
    pub fn translate(
        &self,
        params: &RawQueryParameters,
    ) -> Result<FilterPredicate, UnsupportedFieldError> {
        let candidates: Vec<(&String, &QueryValue)> = params
            .iter()
            .filter(|(key, _)| !self.reserved.contains(&key.as_str()))
            .collect();

        if let Some((field, _)) = candidates
            .iter()
            .find(|(key, _)| !self.allowed.contains(&key.as_str()))
        {
            tracing::debug!(field = %field, "Rejected filter parameter");
            return Err(UnsupportedFieldError {
                field: field.to_string(),
            });
        }

        let mut predicate = FilterPredicate::new();
        for (field, value) in candidates {
            let value = rewrite_operators(value);
            let clause = if self.value_fields.contains(&field.as_str()) {
                FieldPredicate::Value(value)
            } else {
                FieldPredicate::Pattern {
                    pattern: value,
                    case_insensitive: true,
                }
            };
            predicate.insert(field.clone(), clause);
        }

        tracing::trace!(filter = %predicate.to_document(), "Translated filter");
        Ok(predicate)
    }
}

/// Prefix operator-token map keys with `$`, recursively. Values are left alone.
pub fn rewrite_operators(value: &QueryValue) -> QueryValue {
    match value {
        QueryValue::Text(_) => value.clone(),
        QueryValue::List(items) => QueryValue::List(items.iter().map(rewrite_operators).collect()),
        QueryValue::Map(entries) => QueryValue::Map(
            entries
                .iter()
                .map(|(key, inner)| (operator_key(key), rewrite_operators(inner)))
                .collect(),
        ),
    }
}

fn operator_key(key: &str) -> String {
    if OPERATOR_TOKENS.contains(&key) {
        format!("{OPERATOR_PREFIX}{key}")
    } else {
        key.to_string()
    }
}
