// SPDX-License-Identifier: Apache-2.0

//! Policy Store
//!
//! Read access to the administrator-supplied protection policy. The filter
//! receives a `PolicyStore` at construction and reads it on every
//! consultation.

use std::sync::Arc;

use super::settings::{
    Settings, LEGACY_RELATION_SETTING, LEGACY_SCHEMA_SETTING, MODULE_LOADED_SETTING,
    RELATIONS_SETTING,
};

/// Source of the protected-relation configuration
pub trait PolicyStore: Send + Sync {
    /// Raw comma-separated list of protected relations, if any is configured
    fn protected_relations(&self) -> Option<String>;

    /// Diagnostic installation flag. Never consulted for enforcement.
    fn is_active(&self) -> bool;
}

/// Policy store backed by the settings registry
pub struct SettingsPolicyStore {
    settings: Arc<Settings>,
}

impl SettingsPolicyStore {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    fn legacy_entry(&self) -> Option<String> {
        let table = self.settings.get_string(LEGACY_RELATION_SETTING)?;
        let schema = self.settings.get_string(LEGACY_SCHEMA_SETTING)?;
        if table.is_empty() || schema.is_empty() {
            return None;
        }
        Some(format!("{}.{}", schema, table))
    }
}

impl PolicyStore for SettingsPolicyStore {
    fn protected_relations(&self) -> Option<String> {
        let list = self
            .settings
            .get_string(RELATIONS_SETTING)
            .filter(|s| !s.trim().is_empty());

        match (list, self.legacy_entry()) {
            (Some(list), Some(legacy)) => Some(format!("{},{}", list, legacy)),
            (Some(list), None) => Some(list),
            (None, legacy) => legacy,
        }
    }

    fn is_active(&self) -> bool {
        self.settings.get_bool(MODULE_LOADED_SETTING).unwrap_or(false)
    }
}

/// Fixed policy, mainly for hosts that manage configuration themselves
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    pub relations: Option<String>,
}

impl StaticPolicy {
    pub fn new(relations: impl Into<String>) -> Self {
        Self {
            relations: Some(relations.into()),
        }
    }
}

impl PolicyStore for StaticPolicy {
    fn protected_relations(&self) -> Option<String> {
        self.relations.clone()
    }

    fn is_active(&self) -> bool {
        true
    }
}
