//! Faults raised by handlers and the mappings that turn them into responses.
//!
//! A handler signals failure by returning a [`Fault`]: a tagged value whose
//! [`FaultKind`] discriminant (plus an optional lineage of broader kinds) is
//! what fault mappings match on. Domain error enums implement
//! [`FaultCatalog`] and convert with `?`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::http::response::ApiResponse;

/// Discriminant of a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaultKind(&'static str);

impl FaultKind {
    /// Root kind; every fault is an `Error`.
    pub const ERROR: FaultKind = FaultKind("Error");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A failure returned by a handler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: FaultKind,
    /// Broader kinds this fault also belongs to, nearest first.
    pub lineage: Vec<FaultKind>,
    pub message: String,
    pub details: Option<Value>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            lineage: Vec::new(),
            message: message.into(),
            details: None,
        }
    }

    /// A fault with no declared kind beyond the root.
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ERROR, message)
    }

    /// Declare a broader kind this fault belongs to.
    pub fn within(mut self, parent: FaultKind) -> Self {
        self.lineage.push(parent);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// True when `kind` is this fault's kind, one of its ancestors, or the root.
    pub fn is(&self, kind: FaultKind) -> bool {
        kind == self.kind || kind == FaultKind::ERROR || self.lineage.contains(&kind)
    }
}

/// A domain error enum that can be raised from handlers.
pub trait FaultCatalog: fmt::Display {
    fn kind(&self) -> FaultKind;

    fn lineage(&self) -> Vec<FaultKind> {
        Vec::new()
    }

    fn details(&self) -> Option<Value> {
        None
    }
}

impl<E: FaultCatalog> From<E> for Fault {
    fn from(error: E) -> Self {
        Fault {
            kind: error.kind(),
            lineage: error.lineage(),
            message: error.to_string(),
            details: error.details(),
        }
    }
}

/// Builds the complete response for a matched fault.
pub type Resolver = Arc<dyn Fn(&Fault) -> ApiResponse + Send + Sync>;

/// One ordered rule translating a fault kind into a response.
#[derive(Clone)]
pub struct FaultMapping {
    pub kind: FaultKind,
    /// Status used when there is no resolver; always documented.
    pub code: u16,
    pub description: Option<String>,
    pub resolve: Option<Resolver>,
}

impl FaultMapping {
    pub fn new(kind: FaultKind, code: u16) -> Self {
        Self {
            kind,
            code,
            description: None,
            resolve: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn resolve<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Fault) -> ApiResponse + Send + Sync + 'static,
    {
        self.resolve = Some(Arc::new(resolver));
        self
    }

    pub fn matches(&self, fault: &Fault) -> bool {
        fault.is(self.kind)
    }

    /// Response for a fault this mapping matched.
    pub fn respond(&self, fault: &Fault) -> ApiResponse {
        match &self.resolve {
            Some(resolver) => resolver(fault),
            None => ApiResponse::new(fault.message.clone(), self.code),
        }
    }
}

impl fmt::Debug for FaultMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultMapping")
            .field("kind", &self.kind)
            .field("code", &self.code)
            .field("description", &self.description)
            .field("resolve", &self.resolve.is_some())
            .finish()
    }
}

/// First mapping, in declaration order, that matches `fault`.
pub fn first_match<'a>(mappings: &'a [FaultMapping], fault: &Fault) -> Option<(usize, &'a FaultMapping)> {
    mappings
        .iter()
        .enumerate()
        .find(|(_, mapping)| mapping.matches(fault))
}
