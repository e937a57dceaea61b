//! Request and response schema shared by the relay and its clients
//!
//! Validation runs on raw JSON values so that a malformed body yields
//! field-level violations rather than a single decode error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Maximum query length in characters, measured after trimming
pub const MAX_QUERY_LENGTH: usize = 1000;

/// A search submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Check the query against the length bounds
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_query(&self.query)
    }
}

/// One research document returned by the upstream service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Markdown body
    pub output: String,
    /// Pre-rendered HTML. Some upstream replies leave it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_html: Option<String>,
}

impl SearchResult {
    pub fn new(output: impl Into<String>, output_html: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            output_html: Some(output_html.into()),
        }
    }
}

/// Ordered results for one query; only the first is displayed
pub type SearchResponse = Vec<SearchResult>;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field path, e.g. `query` or `[1].output`
    pub field: String,
    pub message: String,
}

/// Shape mismatch on either side of the relay
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(transparent)]
#[error("validation failed: {}", describe(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// True if any violation names `field`
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn check_query(query: &str) -> Result<(), ValidationError> {
    let length = query.trim().chars().count();
    if length == 0 {
        return Err(ValidationError::single("query", "Query cannot be empty"));
    }
    if length > MAX_QUERY_LENGTH {
        return Err(ValidationError::single("query", "Query too long"));
    }
    Ok(())
}

/// Validate an incoming request body.
///
/// The query is returned verbatim; trimming only applies to the length check.
pub fn validate_search_request(input: &Value) -> Result<SearchRequest, ValidationError> {
    let Some(object) = input.as_object() else {
        return Err(ValidationError::single("body", "Expected object"));
    };

    let query = match object.get("query") {
        None => return Err(ValidationError::single("query", "Required")),
        Some(Value::String(query)) => query,
        Some(_) => return Err(ValidationError::single("query", "Expected string")),
    };

    check_query(query)?;

    Ok(SearchRequest {
        query: query.clone(),
    })
}

/// Wrap a bare upstream reply into a one-element array; arrays pass through
pub fn normalize_search_response(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        other => Value::Array(vec![other]),
    }
}

/// Validate an upstream reply, accepting either one record or an array of them
pub fn validate_search_response(input: &Value) -> Result<SearchResponse, ValidationError> {
    let records: Vec<&Value> = match input {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut violations = Vec::new();
    let mut results = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let Some(object) = record.as_object() else {
            violations.push(FieldViolation {
                field: format!("[{}]", index),
                message: "Expected object".to_string(),
            });
            continue;
        };

        let output = match object.get("output") {
            Some(Value::String(output)) => Some(output.clone()),
            Some(_) => {
                violations.push(FieldViolation {
                    field: format!("[{}].output", index),
                    message: "Expected string".to_string(),
                });
                None
            }
            None => {
                violations.push(FieldViolation {
                    field: format!("[{}].output", index),
                    message: "Required".to_string(),
                });
                None
            }
        };

        let output_html = match object.get("output_html") {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(html)) => Some(Some(html.clone())),
            Some(_) => {
                violations.push(FieldViolation {
                    field: format!("[{}].output_html", index),
                    message: "Expected string".to_string(),
                });
                None
            }
        };

        if let (Some(output), Some(output_html)) = (output, output_html) {
            results.push(SearchResult {
                output,
                output_html,
            });
        }
    }

    if violations.is_empty() {
        Ok(results)
    } else {
        Err(ValidationError { violations })
    }
}
