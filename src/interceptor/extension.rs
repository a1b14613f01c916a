// SPDX-License-Identifier: Apache-2.0

//! Extension lifecycle
//!
//! Load registers the settings and puts the filter on top of the planner
//! chain. Unload takes it off again and clears the installation flag.

use std::sync::Arc;

use tracing::{info, warn};

use super::filter::AppendOnlyFilter;
use super::pipeline::{LayerHandle, Planner, PlannerChain};
use crate::catalog::Catalog;
use crate::error::FilterResult;
use crate::policy::{
    define_filter_settings, PolicyStore, SettingValue, Settings, SettingsPolicyStore,
    MODULE_LOADED_SETTING,
};

/// A loaded append-only filter
pub struct AppendOnlyExtension {
    chain: Arc<PlannerChain>,
    settings: Arc<Settings>,
    handle: LayerHandle,
}

impl AppendOnlyExtension {
    /// Define the settings and install the filter into `chain`
    pub fn load(
        chain: Arc<PlannerChain>,
        settings: Arc<Settings>,
        catalog: Arc<dyn Catalog>,
    ) -> FilterResult<Self> {
        define_filter_settings(&settings);

        let policy: Arc<dyn PolicyStore> = Arc::new(SettingsPolicyStore::new(Arc::clone(&settings)));
        let handle = chain.install(move |next| {
            Arc::new(AppendOnlyFilter::new(policy, catalog, next)) as Arc<dyn Planner>
        });

        settings.set_internal(MODULE_LOADED_SETTING, SettingValue::Bool(true))?;
        info!(depth = chain.depth(), "Append-only filter loaded");

        Ok(Self {
            chain,
            settings,
            handle,
        })
    }

    /// Remove the filter, restoring the previous interceptor (or none)
    pub fn unload(self) -> FilterResult<()> {
        if let Err(e) = self.chain.uninstall(&self.handle) {
            warn!(error = %e, "Failed to remove append-only filter");
            return Err(e);
        }

        self.settings
            .set_internal(MODULE_LOADED_SETTING, SettingValue::Bool(false))?;
        info!("Append-only filter unloaded");
        Ok(())
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn chain(&self) -> &Arc<PlannerChain> {
        &self.chain
    }
}
