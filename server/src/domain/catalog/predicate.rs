//! Filter predicates and their evaluation against product documents
//!
//! A [`FilterPredicate`] maps field names to [`FieldPredicate`] clauses.
//! Before scanning documents it is compiled once into a [`CompiledPredicate`],
//! which surfaces pattern errors up front and reuses the built regexes.
//!
//! Matching rules per clause (all clauses must hold):
//!
//! | Clause | Document value matches when |
//! |--------|-----------------------------|
//! | `Value("x")` | equal; numbers compare numerically |
//! | `Value([..])` | equal to any element |
//! | `Value({$gt: ..})` | every operator holds |
//! | `Value({k: ..})` | equal to the same object |
//! | `Value({$gt: .., k: ..})` | rejected at compile time |
//! | `Pattern("x")` | regex search over text |
//! | `Pattern([..])` | any pattern matches |
//!
//! Array document values match when any element matches. A missing field
//! never matches.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use thiserror::Error;

use super::filter::OPERATOR_PREFIX;
use super::value::QueryValue;

/// Compiled regex size limit (bytes)
const REGEX_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("The parameter {field} cannot be used as a search pattern.")]
    UnsupportedPattern { field: String },

    #[error("Invalid search pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("Unknown operator {operator} for {field}")]
    UnknownOperator { field: String, operator: String },
}

/// Constraint on a single document field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPredicate {
    /// Equality, or `$`-operator comparisons when the value is an operator map
    Value(QueryValue),
    /// Regular expression search over text values
    Pattern {
        pattern: QueryValue,
        case_insensitive: bool,
    },
}

impl FieldPredicate {
    /// Case-insensitive pattern clause
    pub fn pattern(pattern: impl Into<QueryValue>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    /// Render in document-store notation (`{"$regex": .., "$options": "i"}`)
    pub fn to_document(&self) -> Value {
        match self {
            Self::Value(value) => value.to_json(),
            Self::Pattern {
                pattern,
                case_insensitive,
            } => {
                let mut doc = Map::new();
                doc.insert("$regex".to_string(), pattern.to_json());
                if *case_insensitive {
                    doc.insert("$options".to_string(), Value::String("i".to_string()));
                }
                Value::Object(doc)
            }
        }
    }
}

/// Field-to-clause mapping; all clauses must hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    clauses: BTreeMap<String, FieldPredicate>,
}

impl FilterPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clause for a field, replacing any previous one
    pub fn insert(&mut self, field: impl Into<String>, clause: FieldPredicate) {
        self.clauses.insert(field.into(), clause);
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&FieldPredicate> {
        self.clauses.get(field)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn to_document(&self) -> Value {
        Value::Object(
            self.clauses
                .iter()
                .map(|(field, clause)| (field.clone(), clause.to_document()))
                .collect(),
        )
    }

    pub fn compile(&self) -> Result<CompiledPredicate, PredicateError> {
        let clauses = self
            .clauses
            .iter()
            .map(|(field, clause)| Ok((field.clone(), Matcher::compile(field, clause)?)))
            .collect::<Result<Vec<_>, PredicateError>>()?;
        Ok(CompiledPredicate { clauses })
    }

    /// One-off match. Compile first when matching many documents.
    pub fn matches(&self, document: &Value) -> Result<bool, PredicateError> {
        Ok(self.compile()?.matches(document))
    }
}

impl FromIterator<(String, FieldPredicate)> for FilterPredicate {
    fn from_iter<T: IntoIterator<Item = (String, FieldPredicate)>>(iter: T) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}

/// A predicate ready to be matched against many documents
#[derive(Debug, Default)]
pub struct CompiledPredicate {
    clauses: Vec<(String, Matcher)>,
}

impl CompiledPredicate {
    /// Predicate that matches every document
    #[cfg(test)]
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(field, matcher)| match document.get(field) {
                Some(value) => matcher.matches(value),
                None => false,
            })
    }
}

#[derive(Debug)]
enum Matcher {
    Equals(QueryValue),
    Operators(Vec<(Operator, QueryValue)>),
    Patterns(Vec<Regex>),
}

impl Matcher {
    fn compile(field: &str, clause: &FieldPredicate) -> Result<Self, PredicateError> {
        match clause {
            FieldPredicate::Value(value) => Self::compile_value(field, value),
            FieldPredicate::Pattern {
                pattern,
                case_insensitive,
            } => {
                let regexes = match pattern {
                    QueryValue::Text(p) => vec![build_regex(field, p, *case_insensitive)?],
                    QueryValue::List(items) => items
                        .iter()
                        .map(|item| match item {
                            QueryValue::Text(p) => build_regex(field, p, *case_insensitive),
                            _ => Err(PredicateError::UnsupportedPattern {
                                field: field.to_string(),
                            }),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    QueryValue::Map(_) => {
                        return Err(PredicateError::UnsupportedPattern {
                            field: field.to_string(),
                        });
                    }
                };
                Ok(Self::Patterns(regexes))
            }
        }
    }

    fn compile_value(field: &str, value: &QueryValue) -> Result<Self, PredicateError> {
        let Some(entries) = value
            .as_map()
            .filter(|m| m.keys().any(|k| k.starts_with(OPERATOR_PREFIX)))
        else {
            return Ok(Self::Equals(value.clone()));
        };

        // `price=120&price[lte]=500` decodes to {"0": "120", "$lte": "500"}
        if let Some(plain) = entries.keys().find(|k| !k.starts_with(OPERATOR_PREFIX)) {
            return Err(PredicateError::UnknownOperator {
                field: field.to_string(),
                operator: plain.clone(),
            });
        }

        let operators = entries
            .iter()
            .map(|(key, operand)| {
                Operator::parse(key)
                    .map(|op| (op, operand.clone()))
                    .ok_or_else(|| PredicateError::UnknownOperator {
                        field: field.to_string(),
                        operator: key.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Operators(operators))
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Equals(expected) => any_element(value, |v| equals(v, expected)),
            Self::Operators(ops) => {
                any_element(value, |v| ops.iter().all(|(op, operand)| op.holds(v, operand)))
            }
            Self::Patterns(regexes) => any_element(value, |v| {
                v.as_str()
                    .is_some_and(|s| regexes.iter().any(|re| re.is_match(s)))
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    fn parse(key: &str) -> Option<Self> {
        match key.strip_prefix(OPERATOR_PREFIX)? {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    fn holds(&self, value: &Value, operand: &QueryValue) -> bool {
        if *self == Self::In {
            return equals(value, operand);
        }
        let Some(ordering) = operand.as_text().and_then(|t| compare_scalar(value, t)) else {
            return false;
        };
        match self {
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
            Self::In => false,
        }
    }
}

fn build_regex(field: &str, pattern: &str, case_insensitive: bool) -> Result<Regex, PredicateError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| PredicateError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

/// Arrays match when any element does
fn any_element(value: &Value, check: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(&check),
        other => check(other),
    }
}

fn equals(value: &Value, expected: &QueryValue) -> bool {
    match expected {
        QueryValue::Text(text) => compare_scalar(value, text) == Some(Ordering::Equal),
        QueryValue::List(items) => items.iter().any(|item| equals(value, item)),
        QueryValue::Map(_) => *value == expected.to_json(),
    }
}

/// Order a document scalar against query text; `None` when the types differ
fn compare_scalar(value: &Value, text: &str) -> Option<Ordering> {
    match value {
        Value::Number(n) => {
            let expected = text.trim().parse::<f64>().ok()?;
            n.as_f64()?.partial_cmp(&expected)
        }
        Value::String(s) => Some(s.as_str().cmp(text)),
        Value::Bool(b) => text.parse::<bool>().ok().map(|expected| b.cmp(&expected)),
        _ => None,
    }
}
