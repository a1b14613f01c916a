// SPDX-License-Identifier: Apache-2.0

//! Normalized error types for the append-only filter
//!
//! Every failure the crate can report is one of these variants. Only
//! `PolicyViolation` is meant to reach the statement's originator; the
//! remaining variants cover configuration and host wiring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error class as seen by the client, mirroring the host's error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The statement was cancelled before it ran
    QueryCanceled,
    SyntaxError,
    UndefinedObject,
    InsufficientPrivilege,
    CantChangeRuntimeParam,
    InvalidParameterValue,
    Internal,
}

/// Unified error type for all filter operations
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum FilterError {
    #[error("Relation {relation} is append only!")]
    PolicyViolation { relation: String },

    #[error("Query syntax error: {message}")]
    SyntaxError { message: String },

    #[error("Unrecognized configuration parameter \"{name}\"")]
    UnknownSetting { name: String },

    #[error("Permission denied to set parameter \"{name}\"")]
    PermissionDenied { name: String },

    #[error("Parameter \"{name}\" cannot be changed")]
    ReadOnlySetting { name: String },

    #[error("Invalid value for parameter \"{name}\": \"{value}\"")]
    InvalidValue { name: String, value: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Interceptor chain error: {message}")]
    HookOrder { message: String },
}

impl FilterError {
    pub fn policy_violation(relation: impl Into<String>) -> Self {
        Self::PolicyViolation {
            relation: relation.into(),
        }
    }

    pub fn syntax_error(msg: impl Into<String>) -> Self {
        Self::SyntaxError { message: msg.into() }
    }

    pub fn unknown_setting(name: impl Into<String>) -> Self {
        Self::UnknownSetting { name: name.into() }
    }

    pub fn permission_denied(name: impl Into<String>) -> Self {
        Self::PermissionDenied { name: name.into() }
    }

    pub fn read_only(name: impl Into<String>) -> Self {
        Self::ReadOnlySetting { name: name.into() }
    }

    pub fn invalid_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config { message: msg.into() }
    }

    pub fn hook_order(msg: impl Into<String>) -> Self {
        Self::HookOrder { message: msg.into() }
    }

    /// The client-facing class of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::PolicyViolation { .. } => ErrorClass::QueryCanceled,
            Self::SyntaxError { .. } => ErrorClass::SyntaxError,
            Self::UnknownSetting { .. } => ErrorClass::UndefinedObject,
            Self::PermissionDenied { .. } => ErrorClass::InsufficientPrivilege,
            Self::ReadOnlySetting { .. } => ErrorClass::CantChangeRuntimeParam,
            Self::InvalidValue { .. } => ErrorClass::InvalidParameterValue,
            Self::Config { .. } | Self::HookOrder { .. } => ErrorClass::Internal,
        }
    }

    /// SQLSTATE code reported alongside the message
    pub fn sqlstate(&self) -> &'static str {
        match self.class() {
            ErrorClass::QueryCanceled => "57014",
            ErrorClass::SyntaxError => "42601",
            ErrorClass::UndefinedObject => "42704",
            ErrorClass::InsufficientPrivilege => "42501",
            ErrorClass::CantChangeRuntimeParam => "55P02",
            ErrorClass::InvalidParameterValue => "22023",
            ErrorClass::Internal => "XX000",
        }
    }

    /// Returns true for the cancellation-class error raised on a blocked write
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation { .. })
    }
}

/// Result type alias for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
