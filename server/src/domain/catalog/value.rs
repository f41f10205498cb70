//! Loosely-typed query parameter values

use std::collections::BTreeMap;

use serde::Serialize;

/// Decoded query parameters keyed by parameter name
pub type RawQueryParameters = BTreeMap<String, QueryValue>;

/// A single query parameter value.
///
/// Plain `a=x` pairs decode to `Text`, repeated names and `a[]=x` to `List`,
/// and bracket syntax such as `price[gt]=100` to `Map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Text(String),
    List(Vec<QueryValue>),
    Map(BTreeMap<String, QueryValue>),
}

impl QueryValue {
    #[cfg(test)]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[cfg(test)]
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    #[cfg(test)]
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, QueryValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Render as JSON (text stays text, lists become arrays, maps objects)
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text() {
        assert_eq!(QueryValue::text("red").as_text(), Some("red"));
        assert_eq!(QueryValue::list(["a"]).as_text(), None);
    }

    #[test]
    fn test_to_json_nested() {
        let value = QueryValue::map([
            ("$gt", QueryValue::text("100")),
            ("$in", QueryValue::list(["1", "2"])),
        ]);
        assert_eq!(
            value.to_json(),
            serde_json::json!({ "$gt": "100", "$in": ["1", "2"] })
        );
    }

    #[test]
    fn test_serialize_untagged() {
        let value = QueryValue::map([("gt", "5")]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"gt":"5"}"#);
    }
}
