// append-only-filter - Planning-time guard for append-only relations
// Core library

pub mod catalog;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod observability;
pub mod policy;

use std::path::Path;
use std::sync::Arc;

pub use catalog::{Catalog, InMemoryCatalog, RelationId};
pub use config::FilterConfig;
pub use error::{ErrorClass, FilterError, FilterResult};
pub use interceptor::{
    analyze, AppendOnlyExtension, AppendOnlyFilter, BoundParams, CommandKind, CursorOptions,
    PlannedStatement, Planner, PlannerChain, Query, Verdict,
};
pub use policy::{PolicyStore, Privilege, Settings, SettingsPolicyStore, StaticPolicy};

/// Load configuration from `config_path`, apply environment overrides and
/// install the filter into `chain`.
pub fn start(
    config_path: &Path,
    chain: Arc<PlannerChain>,
    catalog: Arc<dyn Catalog>,
) -> FilterResult<AppendOnlyExtension> {
    let mut config = FilterConfig::load(config_path)?;
    config.apply_env();
    observability::init_tracing(&config.logging);

    // Settings are complete before the filter joins the chain
    let settings = Arc::new(Settings::new());
    policy::define_filter_settings(&settings);
    config.apply_to(&settings)?;

    AppendOnlyExtension::load(chain, settings, catalog)
}
