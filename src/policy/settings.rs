// SPDX-License-Identifier: Apache-2.0

//! Settings Registry
//!
//! Named, typed configuration parameters in the style of the host's
//! runtime settings. Values can be changed at any time and are always read
//! fresh, so the filter picks up a new relation list without a restart.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FilterError, FilterResult};

/// Comma-separated list of protected `schema.table` entries
pub const RELATIONS_SETTING: &str = "append_only_filter.append_only_relations";
/// Single protected relation name (legacy form, paired with the schema setting)
pub const LEGACY_RELATION_SETTING: &str = "append_only_filter.append_only_relation";
/// Schema of the legacy single protected relation
pub const LEGACY_SCHEMA_SETTING: &str = "append_only_filter.append_only_relation_schema";
/// Read-only diagnostic flag reporting installation status
pub const MODULE_LOADED_SETTING: &str = "append_only_filter.module_loaded";

/// Who may change a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingContext {
    /// Any session may change it
    User,
    /// Only a superuser may change it
    Superuser,
    /// Fixed once defined; only the owning module changes it
    ReadOnly,
}

/// Privilege of the session issuing a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    User,
    Superuser,
}

/// Current value of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(Option<String>),
    Bool(bool),
}

impl SettingValue {
    fn render(&self) -> String {
        match self {
            Self::String(Some(s)) => s.clone(),
            Self::String(None) => String::new(),
            Self::Bool(true) => "on".to_string(),
            Self::Bool(false) => "off".to_string(),
        }
    }
}

/// Description of one registered setting
#[derive(Debug, Clone, Serialize)]
pub struct SettingInfo {
    pub name: String,
    pub description: String,
    pub context: SettingContext,
    pub value: SettingValue,
}

#[derive(Debug, Clone)]
struct SettingEntry {
    description: String,
    context: SettingContext,
    default: SettingValue,
    value: SettingValue,
}

/// Registry of named settings
#[derive(Debug, Default)]
pub struct Settings {
    entries: RwLock<HashMap<String, SettingEntry>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a string setting. Redefining keeps the current value.
    pub fn define_string(
        &self,
        name: &str,
        description: &str,
        default: Option<&str>,
        context: SettingContext,
    ) {
        let default = SettingValue::String(default.map(str::to_string));
        self.define(name, description, default, context);
    }

    /// Define a boolean setting. Redefining keeps the current value.
    pub fn define_bool(&self, name: &str, description: &str, default: bool, context: SettingContext) {
        self.define(name, description, SettingValue::Bool(default), context);
    }

    fn define(&self, name: &str, description: &str, default: SettingValue, context: SettingContext) {
        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            debug!(setting = name, "Setting already defined");
            return;
        }
        entries.insert(
            name.to_string(),
            SettingEntry {
                description: description.to_string(),
                context,
                value: default.clone(),
                default,
            },
        );
    }

    /// Current value, or None if the name is not registered
    pub fn get(&self, name: &str) -> Option<SettingValue> {
        self.entries.read().get(name).map(|e| e.value.clone())
    }

    /// Current value of a string setting; None when unset or not a string
    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            SettingValue::String(value) => value,
            SettingValue::Bool(_) => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            SettingValue::Bool(value) => Some(value),
            SettingValue::String(_) => None,
        }
    }

    /// Change a setting from its textual form, as an administrator would
    pub fn set(&self, name: &str, value: &str, privilege: Privilege) -> FilterResult<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| FilterError::unknown_setting(name))?;

        check_privilege(name, entry.context, privilege)?;

        entry.value = match entry.value {
            SettingValue::String(_) => SettingValue::String(Some(value.to_string())),
            SettingValue::Bool(_) => SettingValue::Bool(
                parse_bool(value).ok_or_else(|| FilterError::invalid_value(name, value))?,
            ),
        };

        info!(setting = name, value = %entry.value.render(), "Setting changed");
        Ok(())
    }

    /// Restore a setting to its default
    pub fn reset(&self, name: &str, privilege: Privilege) -> FilterResult<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| FilterError::unknown_setting(name))?;

        check_privilege(name, entry.context, privilege)?;
        entry.value = entry.default.clone();

        info!(setting = name, "Setting reset to default");
        Ok(())
    }

    /// Change a setting on behalf of its owning module, bypassing the context
    pub(crate) fn set_internal(&self, name: &str, value: SettingValue) -> FilterResult<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| FilterError::unknown_setting(name))?;

        if std::mem::discriminant(&entry.value) != std::mem::discriminant(&value) {
            return Err(FilterError::invalid_value(name, value.render()));
        }
        entry.value = value;
        Ok(())
    }

    /// Textual value as shown to a client
    pub fn show(&self, name: &str) -> FilterResult<String> {
        self.get(name)
            .map(|v| v.render())
            .ok_or_else(|| FilterError::unknown_setting(name))
    }

    /// All registered settings, sorted by name
    pub fn list(&self) -> Vec<SettingInfo> {
        let entries = self.entries.read();
        let mut infos: Vec<SettingInfo> = entries
            .iter()
            .map(|(name, e)| SettingInfo {
                name: name.clone(),
                description: e.description.clone(),
                context: e.context,
                value: e.value.clone(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

fn check_privilege(name: &str, context: SettingContext, privilege: Privilege) -> FilterResult<()> {
    match (context, privilege) {
        (SettingContext::ReadOnly, _) => Err(FilterError::read_only(name)),
        (SettingContext::Superuser, Privilege::User) => Err(FilterError::permission_denied(name)),
        _ => Ok(()),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Settings {
        let settings = Settings::new();
        settings.define_string(RELATIONS_SETTING, "protected", None, SettingContext::Superuser);
        settings.define_bool(MODULE_LOADED_SETTING, "loaded", true, SettingContext::ReadOnly);
        settings.define_bool("append_only_filter.verbose", "verbose", false, SettingContext::User);
        settings
    }

    #[test]
    fn test_unset_string_reads_as_none() {
        let settings = registry();
        assert_eq!(settings.get_string(RELATIONS_SETTING), None);
        assert_eq!(settings.show(RELATIONS_SETTING).unwrap(), "");
    }

    #[test]
    fn test_superuser_can_set_relations() {
        let settings = registry();
        settings
            .set(RELATIONS_SETTING, "public.ledger", Privilege::Superuser)
            .unwrap();
        assert_eq!(
            settings.get_string(RELATIONS_SETTING).as_deref(),
            Some("public.ledger")
        );

        settings.reset(RELATIONS_SETTING, Privilege::Superuser).unwrap();
        assert_eq!(settings.get_string(RELATIONS_SETTING), None);
    }

    #[test]
    fn test_user_cannot_set_superuser_setting() {
        let settings = registry();
        let err = settings
            .set(RELATIONS_SETTING, "public.ledger", Privilege::User)
            .unwrap_err();
        assert!(matches!(err, FilterError::PermissionDenied { .. }));
        assert_eq!(settings.get_string(RELATIONS_SETTING), None);
    }

    #[test]
    fn test_read_only_setting_rejects_changes() {
        let settings = registry();
        let err = settings
            .set(MODULE_LOADED_SETTING, "off", Privilege::Superuser)
            .unwrap_err();
        assert!(matches!(err, FilterError::ReadOnlySetting { .. }));

        settings
            .set_internal(MODULE_LOADED_SETTING, SettingValue::Bool(false))
            .unwrap();
        assert_eq!(settings.get_bool(MODULE_LOADED_SETTING), Some(false));
        assert_eq!(settings.show(MODULE_LOADED_SETTING).unwrap(), "off");
    }

    #[test]
    fn test_bool_parsing() {
        let settings = registry();
        settings
            .set("append_only_filter.verbose", "YES", Privilege::User)
            .unwrap();
        assert_eq!(settings.get_bool("append_only_filter.verbose"), Some(true));

        let err = settings
            .set("append_only_filter.verbose", "maybe", Privilege::User)
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_setting() {
        let settings = registry();
        assert!(matches!(
            settings.set("append_only_filter.nope", "x", Privilege::Superuser),
            Err(FilterError::UnknownSetting { .. })
        ));
        assert!(settings.get("append_only_filter.nope").is_none());
    }

    #[test]
    fn test_redefine_keeps_value() {
        let settings = registry();
        settings
            .set(RELATIONS_SETTING, "public.ledger", Privilege::Superuser)
            .unwrap();
        settings.define_string(RELATIONS_SETTING, "protected", None, SettingContext::Superuser);
        assert_eq!(
            settings.get_string(RELATIONS_SETTING).as_deref(),
            Some("public.ledger")
        );
        assert_eq!(settings.list().len(), 3);
    }
}
