//! Product catalog types shared by the store and the HTTP layer

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::catalog::{CompiledPredicate, SortSpec};

/// A product as written by `catalog import`
///
/// Stored whole as a JSON document with `_id`, `createdAt` and `updatedAt`
/// added.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// Keeps an existing id; a new one is generated when absent
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64, message = "Product id must be 1-64 characters"))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub category: Vec<String>,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub count_in_stock: i64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: f64,

    #[serde(default)]
    #[validate(range(min = 0, message = "Review count must not be negative"))]
    pub num_reviews: i64,

    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub reviews: Vec<Value>,
}

impl NewProduct {
    /// Build the stored document
    pub fn to_document(&self, id: &str, now: DateTime<Utc>) -> Result<Value, serde_json::Error> {
        let mut document = serde_json::to_value(self)?;
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        if let Value::Object(map) = &mut document {
            map.insert("_id".to_string(), Value::String(id.to_string()));
            map.insert("createdAt".to_string(), Value::String(timestamp.clone()));
            map.insert("updatedAt".to_string(), Value::String(timestamp));
        }
        Ok(document)
    }
}

/// Product row from database
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub document: String,
}

impl ProductRow {
    pub fn into_document(self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.document)
    }
}

/// Store-level parameters of a product listing
#[derive(Debug)]
pub struct ProductSearchParams {
    pub filter: CompiledPredicate,
    pub sort: SortSpec,
    pub skip: usize,
    pub limit: usize,
}

impl ProductSearchParams {
    /// All products in store order
    #[cfg(test)]
    pub fn all() -> Self {
        Self {
            filter: CompiledPredicate::match_all(),
            sort: SortSpec::default(),
            skip: 0,
            limit: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(value: Value) -> NewProduct {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_new_product_defaults() {
        let p = product(json!({ "name": "Lamp", "price": 19.5 }));
        assert!(p.id.is_none());
        assert!(p.category.is_empty());
        assert_eq!(p.count_in_stock, 0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_new_product_camel_case_fields() {
        let p = product(json!({
            "_id": "p1",
            "name": "Phone",
            "price": 599,
            "countInStock": 3,
            "numReviews": 12,
            "rating": 4.5
        }));
        assert_eq!(p.id.as_deref(), Some("p1"));
        assert_eq!(p.count_in_stock, 3);
        assert_eq!(p.num_reviews, 12);
    }

    #[test]
    fn test_new_product_validation() {
        let p = product(json!({ "name": "", "price": -1, "rating": 7 }));
        let errors = p.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("rating"));
    }

    #[test]
    fn test_to_document_adds_id_and_timestamps() {
        let p = product(json!({ "name": "Phone", "price": 10, "category": ["tech"] }));
        let now = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let doc = p.to_document("abc", now).unwrap();

        assert_eq!(doc["_id"], "abc");
        assert_eq!(doc["name"], "Phone");
        assert_eq!(doc["category"], json!(["tech"]));
        assert_eq!(doc["countInStock"], 0);
        assert_eq!(doc["createdAt"], "2024-05-01T10:00:00.000Z");
        assert_eq!(doc["updatedAt"], doc["createdAt"]);
    }

    #[test]
    fn test_product_row_into_document() {
        let row = ProductRow {
            id: "p1".to_string(),
            document: r#"{"_id":"p1","name":"Phone"}"#.to_string(),
        };
        assert_eq!(row.into_document().unwrap()["name"], "Phone");
    }
}
