// SPDX-License-Identifier: Apache-2.0

//! Policy Store
//!
//! Holds the protected-relation list and the installation flag, and
//! exposes them to the statement filter.

pub mod settings;
pub mod store;

pub use settings::{
    Privilege, SettingContext, SettingInfo, SettingValue, Settings, LEGACY_RELATION_SETTING,
    LEGACY_SCHEMA_SETTING, MODULE_LOADED_SETTING, RELATIONS_SETTING,
};
pub use store::{PolicyStore, SettingsPolicyStore, StaticPolicy};

/// Register the filter's settings with their defaults
pub fn define_filter_settings(settings: &Settings) {
    settings.define_string(
        RELATIONS_SETTING,
        "Sets the relations which are protected against UPDATE and DELETE.",
        None,
        SettingContext::Superuser,
    );
    settings.define_string(
        LEGACY_RELATION_SETTING,
        "Sets a single relation which is protected against UPDATE and DELETE.",
        None,
        SettingContext::Superuser,
    );
    settings.define_string(
        LEGACY_SCHEMA_SETTING,
        "Sets the schema of the single protected relation.",
        None,
        SettingContext::Superuser,
    );
    settings.define_bool(
        MODULE_LOADED_SETTING,
        "true if the module is loaded",
        true,
        SettingContext::ReadOnly,
    );
}
