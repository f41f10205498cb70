//! Product search composition
//!
//! Combines the translated filter with the keyword, paging and sort settings
//! of a product listing request.

use std::cmp::Ordering;

use serde_json::Value;

use super::filter::{UnsupportedFieldError, translate};
use super::predicate::{FieldPredicate, FilterPredicate};
use super::value::RawQueryParameters;
use crate::core::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Document field searched by `keyword`
pub const KEYWORD_FIELD: &str = "name";

/// Page size settings applied to every search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

/// A fully resolved product listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSearch {
    pub filter: FilterPredicate,
    pub page: u32,
    pub limit: u32,
    pub sort: SortSpec,
}

impl ProductSearch {
    /// Resolve a listing request.
    ///
    /// `page` and `limit` fall back to their defaults unless they parse as
    /// positive integers; `limit` is capped at the configured maximum. A
    /// non-empty `keyword` searches product names and replaces any `name`
    /// clause.
    pub fn from_params(
        params: &RawQueryParameters,
        settings: &SearchSettings,
    ) -> Result<Self, UnsupportedFieldError> {
        let mut filter = translate(params)?;

        if let Some(keyword) = text_param(params, "keyword").filter(|k| !k.is_empty()) {
            filter.insert(KEYWORD_FIELD, FieldPredicate::pattern(keyword));
        }

        let page = positive_param(params, "page").unwrap_or(1);
        let limit = positive_param(params, "limit")
            .unwrap_or(settings.default_limit)
            .min(settings.max_limit)
            .max(1);
        let sort = text_param(params, "sort")
            .map(SortSpec::parse)
            .unwrap_or_default();

        Ok(Self {
            filter,
            page,
            limit,
            sort,
        })
    }

    /// Documents skipped before the current page
    pub fn skip(&self) -> usize {
        (self.limit as usize).saturating_mul(self.page.saturating_sub(1) as usize)
    }

    /// Page count for `total` matching documents
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

fn text_param<'a>(params: &'a RawQueryParameters, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_text())
}

fn positive_param(params: &RawQueryParameters, key: &str) -> Option<u32> {
    text_param(params, key)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered list of sort keys, e.g. `"-rating price"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse field names separated by spaces or commas. `-field` sorts
    /// descending; `+field` and `field` ascending.
    pub fn parse(raw: &str) -> Self {
        let keys = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|token| {
                let (direction, field) = match token.strip_prefix('-') {
                    Some(field) => (SortDirection::Desc, field),
                    None => (SortDirection::Asc, token.strip_prefix('+').unwrap_or(token)),
                };
                (!field.is_empty()).then(|| SortKey {
                    field: field.to_string(),
                    direction,
                })
            })
            .collect();
        Self { keys }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values(
                sort_value(a.get(&key.field), key.direction),
                sort_value(b.get(&key.field), key.direction),
            );
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable sort; ties keep their current order
    pub fn sort(&self, documents: &mut [Value]) {
        if !self.keys.is_empty() {
            documents.sort_by(|a, b| self.compare(a, b));
        }
    }
}

/// Arrays sort by their smallest element ascending and their largest
/// descending; an empty array sorts like a missing value.
fn sort_value(value: Option<&Value>, direction: SortDirection) -> Option<&Value> {
    match value {
        Some(Value::Array(items)) => {
            let by_value = |x: &&Value, y: &&Value| compare_values(Some(*x), Some(*y));
            match direction {
                SortDirection::Asc => items.iter().min_by(by_value),
                SortDirection::Desc => items.iter().max_by(by_value),
            }
        }
        other => other,
    }
}

/// Cross-type order: missing/null, numbers, text, objects, arrays, booleans
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
