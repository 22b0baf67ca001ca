//! Validation rules attached to routes.
//!
//! # Data Flow
//! ```text
//! Route declaration:
//!     RouteRules { query?, body?, headers?, path? }
//!     → each section holds an Arc<dyn RuleSet>
//!
//! Dispatch (VALIDATE):
//!     section input (map or parsed body) → RuleSet::check → Ok | RuleViolation
//!
//! Synthesis:
//!     RuleSet::to_schema → {type: object, properties, required}
//!     → parameters (query/header/path) or requestBody (body)
//! ```
//!
//! # Design Decisions
//! - The rule engine is pluggable; `JsonSchemaRules` is the bundled engine
//! - One rule set checks one section only; sections never see each other
//! - A rule set is both a checker and a schema source, so the served contract
//!   and the documented contract cannot drift apart

pub mod json_schema;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub use json_schema::{JsonSchemaRules, RuleError};

/// Request section a rule set applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Query,
    Body,
    Headers,
    Path,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Query => "query",
            Section::Body => "body",
            Section::Headers => "headers",
            Section::Path => "path",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected section input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RuleViolation {
    pub message: String,
}

impl RuleViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A schema check for one request section.
pub trait RuleSet: Send + Sync + fmt::Debug {
    /// Check a section's structured input.
    fn check(&self, input: &Value) -> Result<(), RuleViolation>;

    /// Describe the accepted input as an object schema with `properties`
    /// and `required`.
    fn to_schema(&self) -> Value;
}

/// The zero to four section rule sets a route declares.
#[derive(Debug, Clone, Default)]
pub struct RouteRules {
    pub query: Option<Arc<dyn RuleSet>>,
    pub body: Option<Arc<dyn RuleSet>>,
    pub headers: Option<Arc<dyn RuleSet>>,
    pub path: Option<Arc<dyn RuleSet>>,
}

impl RouteRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, rules: impl RuleSet + 'static) -> Self {
        self.query = Some(Arc::new(rules));
        self
    }

    pub fn body(mut self, rules: impl RuleSet + 'static) -> Self {
        self.body = Some(Arc::new(rules));
        self
    }

    pub fn headers(mut self, rules: impl RuleSet + 'static) -> Self {
        self.headers = Some(Arc::new(rules));
        self
    }

    pub fn path(mut self, rules: impl RuleSet + 'static) -> Self {
        self.path = Some(Arc::new(rules));
        self
    }

    /// True when no section declares rules.
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.body.is_none() && self.headers.is_none() && self.path.is_none()
    }

    /// Declared sections in check order.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &Arc<dyn RuleSet>)> {
        [
            (Section::Query, self.query.as_ref()),
            (Section::Body, self.body.as_ref()),
            (Section::Headers, self.headers.as_ref()),
            (Section::Path, self.path.as_ref()),
        ]
        .into_iter()
        .filter_map(|(section, rules)| rules.map(|r| (section, r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(schema: Value) -> JsonSchemaRules {
        JsonSchemaRules::new(schema).unwrap()
    }

    #[test]
    fn test_empty_rules() {
        let r = RouteRules::new();
        assert!(r.is_empty());
        assert_eq!(r.sections().count(), 0);
    }

    #[test]
    fn test_sections_follow_check_order() {
        let r = RouteRules::new()
            .path(rules(json!({"type": "object"})))
            .query(rules(json!({"type": "object"})));

        let order: Vec<Section> = r.sections().map(|(s, _)| s).collect();
        assert_eq!(order, vec![Section::Query, Section::Path]);
        assert!(!r.is_empty());
    }
}
