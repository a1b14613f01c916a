//! Statement Interceptor
//!
//! Planning-time enforcement of the append-only policy:
//! - **Analyzer**: SQL text to command kind and target relation
//! - **Pipeline**: ordered chain of planning interceptors
//! - **Filter**: the append-only decision, installed as one chain layer
//! - **Extension**: load/unload lifecycle for the filter

pub mod analyzer;
pub mod extension;
pub mod filter;
pub mod pipeline;
pub mod relations;
pub mod types;

pub use analyzer::analyze;
pub use extension::AppendOnlyExtension;
pub use filter::AppendOnlyFilter;
pub use pipeline::{LayerHandle, Planner, PlannerChain, StandardPlanner};
pub use types::*;
