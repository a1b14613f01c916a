//! Interceptor Types
//!
//! Type definitions shared by the analyzer, the planner chain and the
//! append-only filter.

use serde::{Deserialize, Serialize};

use crate::catalog::RelationId;

/// Command kind of an incoming statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Select,
    Insert,
    Update,
    Delete,
    /// MERGE designates a result relation and mutates it like UPDATE/DELETE
    Merge,
    /// DDL, SET, transaction control and other administrative statements
    #[default]
    Utility,
}

impl CommandKind {
    /// Returns true if this kind can never modify existing rows of a relation
    pub fn is_append_safe(&self) -> bool {
        matches!(self, Self::Select | Self::Insert | Self::Utility)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::Utility => "UTILITY",
        }
    }
}

/// One analyzed statement handed to the planner chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Detected command kind
    pub command: CommandKind,
    /// Target relation for INSERT/UPDATE/DELETE/MERGE, if one was resolved
    pub result_relation: Option<RelationId>,
    /// Original statement text, kept for diagnostics
    #[serde(default)]
    pub source_text: Option<String>,
}

impl Query {
    pub fn new(command: CommandKind) -> Self {
        Self {
            command,
            ..Default::default()
        }
    }

    pub fn with_result_relation(mut self, id: RelationId) -> Self {
        self.result_relation = Some(id);
        self
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }
}

/// Cursor options passed along with a planning request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorOptions {
    pub scroll: bool,
    pub hold: bool,
    /// Prefer fast-start plans
    pub fast_plan: bool,
}

/// Parameter values bound to a statement, in textual form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundParams {
    pub values: Vec<Option<String>>,
}

impl BoundParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Output of the planner chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStatement {
    pub command: CommandKind,
    pub result_relation: Option<RelationId>,
    pub cursor_options: CursorOptions,
    pub param_count: usize,
}

/// Outcome of one consultation of the append-only filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "relation", rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    /// Fully qualified name of the protected relation the statement targets
    Reject(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}
