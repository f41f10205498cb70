//! URL query string decoding
//!
//! Decodes `color=red&price[gt]=100&category[]=shoes` into
//! [`RawQueryParameters`]:
//!
//! | Input | Result |
//! |-------|--------|
//! | `a=x` | `a: "x"` |
//! | `a=x&a=y`, `a[]=x&a[]=y` | `a: ["x", "y"]` |
//! | `a[b]=x` | `a: {b: "x"}` |
//! | `a=x&a[b]=y` | `a: {"0": "x", b: "y"}` |
//!
//! `+` decodes to a space before percent-decoding. Invalid UTF-8 is replaced,
//! never rejected.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use super::value::{QueryValue, RawQueryParameters};

/// Pairs read from one query string, the rest are ignored
pub const MAX_PARAMETERS: usize = 1000;

/// Bracket segments turned into nested maps
pub const MAX_NESTING_DEPTH: usize = 5;

/// Longest query string accepted (bytes)
pub const MAX_QUERY_LENGTH: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParseError {
    #[error("Query string is {length} bytes, the limit is {max}")]
    TooLong { length: usize, max: usize },
}

/// Decode with the default limits
pub fn parse_query_string(raw: &str) -> Result<RawQueryParameters, QueryParseError> {
    QueryStringParser::default().parse(raw)
}

/// Query string decoder with configurable limits
#[derive(Debug, Clone, Copy)]
pub struct QueryStringParser {
    max_parameters: usize,
    max_depth: usize,
    max_length: usize,
}

impl Default for QueryStringParser {
    fn default() -> Self {
        Self {
            max_parameters: MAX_PARAMETERS,
            max_depth: MAX_NESTING_DEPTH,
            max_length: MAX_QUERY_LENGTH,
        }
    }
}

impl QueryStringParser {
    #[cfg(test)]
    pub fn with_max_parameters(mut self, max_parameters: usize) -> Self {
        self.max_parameters = max_parameters;
        self
    }

    #[cfg(test)]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(&self, raw: &str) -> Result<RawQueryParameters, QueryParseError> {
        if raw.len() > self.max_length {
            return Err(QueryParseError::TooLong {
                length: raw.len(),
                max: self.max_length,
            });
        }

        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut params = RawQueryParameters::new();

        for pair in raw
            .split('&')
            .filter(|p| !p.is_empty())
            .take(self.max_parameters)
        {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode_component(name);
            if name.is_empty() {
                continue;
            }

            let (root, segments) = self.split_key(&name);
            let existing = params.remove(&root);
            params.insert(root, merge(existing, &segments, decode_component(value)));
        }

        Ok(params)
    }

    /// Split `a[b][c]` into `("a", ["b", "c"])`.
    ///
    /// Segments past the depth limit, or trailing text that is not a bracket
    /// group, stay together as one literal final segment.
    fn split_key(&self, name: &str) -> (String, Vec<String>) {
        let Some(open) = name.find('[').filter(|&i| i > 0) else {
            return (name.to_string(), Vec::new());
        };

        let mut segments = Vec::new();
        let mut rest = &name[open..];
        while segments.len() < self.max_depth {
            let Some(inner) = rest.strip_prefix('[') else {
                break;
            };
            let Some(close) = inner.find(']') else {
                break;
            };
            let segment = &inner[..close];
            if segment.contains('[') {
                break;
            }
            segments.push(segment.to_string());
            rest = &inner[close + 1..];
        }

        if segments.is_empty() {
            return (name.to_string(), Vec::new());
        }
        if !rest.is_empty() {
            segments.push(rest.to_string());
        }
        (name[..open].to_string(), segments)
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Fold one decoded pair into the value already stored under its root key
fn merge(existing: Option<QueryValue>, segments: &[String], value: String) -> QueryValue {
    match segments.split_first() {
        None => append(existing, QueryValue::Text(value)),
        Some((segment, rest)) if segment.is_empty() => {
            append(existing, merge(None, rest, value))
        }
        Some((segment, rest)) => {
            let mut entries = match existing {
                None => BTreeMap::new(),
                Some(QueryValue::Map(entries)) => entries,
                Some(other) => indexed(other),
            };
            let child = entries.remove(segment.as_str());
            entries.insert(segment.clone(), merge(child, rest, value));
            QueryValue::Map(entries)
        }
    }
}

/// Add an item to a sequence, keeping an existing map as the container
fn append(existing: Option<QueryValue>, item: QueryValue) -> QueryValue {
    match existing {
        None => item,
        Some(QueryValue::List(mut items)) => {
            items.push(item);
            QueryValue::List(items)
        }
        Some(QueryValue::Map(mut entries)) => {
            let key = next_index(&entries);
            entries.insert(key, item);
            QueryValue::Map(entries)
        }
        Some(text) => QueryValue::List(vec![text, item]),
    }
}

/// Re-key text or list values under `"0"`, `"1"`, ... so map keys can join them
fn indexed(value: QueryValue) -> BTreeMap<String, QueryValue> {
    let items = match value {
        QueryValue::List(items) => items,
        QueryValue::Map(entries) => return entries,
        text => vec![text],
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (i.to_string(), item))
        .collect()
}

fn next_index(entries: &BTreeMap<String, QueryValue>) -> String {
    (0..)
        .map(|i: usize| i.to_string())
        .find(|key| !entries.contains_key(key))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> RawQueryParameters {
        parse_query_string(raw).unwrap()
    }

    #[test]
    fn test_parse_simple_pairs() {
        let params = parse("color=red&brand=acme");
        assert_eq!(params.get("color"), Some(&QueryValue::text("red")));
        assert_eq!(params.get("brand"), Some(&QueryValue::text("acme")));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_ignores_leading_question_mark() {
        let params = parse("?color=red");
        assert_eq!(params.get("color"), Some(&QueryValue::text("red")));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
        assert!(parse("?").is_empty());
        assert!(parse("&&").is_empty());
    }

    #[test]
    fn test_parse_pair_without_equals_has_empty_value() {
        let params = parse("keyword");
        assert_eq!(params.get("keyword"), Some(&QueryValue::text("")));
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let params = parse("sort=a=b");
        assert_eq!(params.get("sort"), Some(&QueryValue::text("a=b")));
    }

    #[test]
    fn test_parse_empty_name_is_ignored() {
        let params = parse("=orphan&color=red");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_parse_plus_and_percent_decoding() {
        let params = parse("keyword=red+shoes&brand=H%26M&sort=%2Bprice");
        assert_eq!(params.get("keyword"), Some(&QueryValue::text("red shoes")));
        assert_eq!(params.get("brand"), Some(&QueryValue::text("H&M")));
        assert_eq!(params.get("sort"), Some(&QueryValue::text("+price")));
    }

    #[test]
    fn test_parse_invalid_utf8_is_replaced() {
        let params = parse("color=%FF");
        assert_eq!(params.get("color"), Some(&QueryValue::text("\u{FFFD}")));
    }

    #[test]
    fn test_parse_encoded_brackets() {
        let params = parse("price%5Bgt%5D=100");
        assert_eq!(
            params.get("price"),
            Some(&QueryValue::map([("gt", "100")]))
        );
    }

    #[test]
    fn test_parse_nested_operators() {
        let params = parse("price[gt]=100&price[lte]=500");
        assert_eq!(
            params.get("price"),
            Some(&QueryValue::map([("gt", "100"), ("lte", "500")]))
        );
    }

    #[test]
    fn test_parse_repeated_keys_build_list() {
        let params = parse("category=shoes&category=boots&category=hats");
        assert_eq!(
            params.get("category"),
            Some(&QueryValue::list(["shoes", "boots", "hats"]))
        );
    }

    #[test]
    fn test_parse_empty_brackets_build_list() {
        let params = parse("category[]=shoes&category[]=boots");
        assert_eq!(
            params.get("category"),
            Some(&QueryValue::list(["shoes", "boots"]))
        );
    }

    #[test]
    fn test_parse_nested_list() {
        let params = parse("category[in][]=shoes&category[in][]=boots");
        assert_eq!(
            params.get("category"),
            Some(&QueryValue::map([(
                "in",
                QueryValue::list(["shoes", "boots"])
            )]))
        );
    }

    #[test]
    fn test_parse_mixed_text_then_map() {
        let params = parse("color=red&color[b]=blue");
        assert_eq!(
            params.get("color"),
            Some(&QueryValue::map([("0", "red"), ("b", "blue")]))
        );
    }

    #[test]
    fn test_parse_mixed_map_then_text() {
        let params = parse("color[b]=blue&color=red&color=green");
        assert_eq!(
            params.get("color"),
            Some(&QueryValue::map([("0", "red"), ("1", "green"), ("b", "blue")]))
        );
    }

    #[test]
    fn test_parse_depth_limit_keeps_remainder_literal() {
        let params = parse("a[1][2][3][4][5][6][7]=x");
        let expected = QueryValue::map([(
            "1",
            QueryValue::map([(
                "2",
                QueryValue::map([(
                    "3",
                    QueryValue::map([(
                        "4",
                        QueryValue::map([("5", QueryValue::map([("[6][7]", "x")]))]),
                    )]),
                )]),
            )]),
        )]);
        assert_eq!(params.get("a"), Some(&expected));
    }

    #[test]
    fn test_parse_custom_depth() {
        let params = QueryStringParser::default()
            .with_max_depth(1)
            .parse("a[b][c]=x")
            .unwrap();
        assert_eq!(
            params.get("a"),
            Some(&QueryValue::map([(
                "b",
                QueryValue::map([("[c]", "x")])
            )]))
        );
    }

    #[test]
    fn test_parse_malformed_brackets_stay_literal() {
        let params = parse("a[b=1&[c]=2");
        assert_eq!(params.get("a[b"), Some(&QueryValue::text("1")));
        assert_eq!(params.get("[c]"), Some(&QueryValue::text("2")));
    }

    #[test]
    fn test_parse_parameter_limit() {
        let raw = (0..1500)
            .map(|i| format!("k{i}=v"))
            .collect::<Vec<_>>()
            .join("&");
        assert_eq!(parse(&raw).len(), MAX_PARAMETERS);

        let params = QueryStringParser::default()
            .with_max_parameters(2)
            .parse("a=1&b=2&c=3")
            .unwrap();
        assert_eq!(params.len(), 2);
        assert!(!params.contains_key("c"));
    }

    #[test]
    fn test_parse_too_long() {
        let raw = "a".repeat(MAX_QUERY_LENGTH + 1);
        let err = parse_query_string(&raw).unwrap_err();
        assert_eq!(
            err,
            QueryParseError::TooLong {
                length: MAX_QUERY_LENGTH + 1,
                max: MAX_QUERY_LENGTH
            }
        );
    }

    #[test]
    fn test_parse_single_bracket_fragment() {
        let params = parse("price[gte]=10");
        assert_eq!(params.get("price"), Some(&QueryValue::map([("gte", "10")])));
    }
}
