//! Conditional-match query semantics shared by every document-store backend.
//!
//! A filter is a conjunction of per-field conditions: exact match, not-equal,
//! set inclusion, and pattern match with options. Fields are addressed at the
//! top level of the document.

use regex::RegexBuilder;
use serde_json::Value;

use crate::error::FlowError;

/// One per-field condition.
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    In(Vec<Value>),
    Regex { pattern: String, case_insensitive: bool },
}

/// Conjunction of field conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_string(), Condition::Eq(value.into())));
        self
    }

    pub fn ne(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_string(), Condition::Ne(value.into())));
        self
    }

    pub fn is_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.clauses.push((field.to_string(), Condition::In(values)));
        self
    }

    pub fn regex(mut self, field: &str, pattern: &str, case_insensitive: bool) -> Self {
        self.clauses.push((
            field.to_string(),
            Condition::Regex { pattern: pattern.to_string(), case_insensitive },
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether the document satisfies every clause. A missing field reads as
    /// JSON null.
    pub fn matches(&self, doc: &Value) -> Result<bool, FlowError> {
        for (field, condition) in &self.clauses {
            let actual = doc.get(field).unwrap_or(&Value::Null);
            let hit = match condition {
                Condition::Eq(expected) => actual == expected,
                Condition::Ne(expected) => actual != expected,
                Condition::In(allowed) => allowed.contains(actual),
                Condition::Regex { pattern, case_insensitive } => {
                    let regex = RegexBuilder::new(pattern)
                        .case_insensitive(*case_insensitive)
                        .build()
                        .map_err(|e| FlowError::Storage(format!("invalid pattern: {e}")))?;
                    actual.as_str().is_some_and(|s| regex.is_match(s))
                }
            };
            if !hit {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
