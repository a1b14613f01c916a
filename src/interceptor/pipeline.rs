// SPDX-License-Identifier: Apache-2.0

//! Interceptor Pipeline
//!
//! Ordered chain of planning interceptors over the host's standard planner.
//! Each interceptor is built with a reference to the entry point that was
//! current when it was installed and forwards to it, so interceptors from
//! independent modules compose:
//!
//! ```text
//! plan() -> layer N -> layer N-1 -> ... -> layer 1 -> standard planner
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::types::{BoundParams, CursorOptions, PlannedStatement, Query};
use crate::error::{FilterError, FilterResult};

/// The host's planning hook signature
pub trait Planner: Send + Sync {
    fn plan(
        &self,
        query: &Query,
        options: CursorOptions,
        params: &BoundParams,
    ) -> FilterResult<PlannedStatement>;

    /// Name used in logs and diagnostics
    fn name(&self) -> &str {
        "planner"
    }
}

/// Default planner used when no interceptor is installed
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardPlanner;

impl Planner for StandardPlanner {
    fn plan(
        &self,
        query: &Query,
        options: CursorOptions,
        params: &BoundParams,
    ) -> FilterResult<PlannedStatement> {
        Ok(PlannedStatement {
            command: query.command,
            result_relation: query.result_relation,
            cursor_options: options,
            param_count: params.len(),
        })
    }

    fn name(&self) -> &str {
        "standard_planner"
    }
}

/// Proof of installation, required to remove a layer again
#[derive(Debug, PartialEq, Eq)]
pub struct LayerHandle {
    id: u64,
    name: String,
}

impl LayerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct Layer {
    id: u64,
    planner: Arc<dyn Planner>,
}

struct ChainState {
    layers: Vec<Layer>,
    next_id: u64,
}

/// Ordered chain of planning interceptors
pub struct PlannerChain {
    standard: Arc<dyn Planner>,
    state: RwLock<ChainState>,
}

impl PlannerChain {
    /// Creates a chain over the built-in standard planner
    pub fn new() -> Self {
        Self::with_standard(Arc::new(StandardPlanner))
    }

    /// Creates a chain over a host-provided standard planner
    pub fn with_standard(standard: Arc<dyn Planner>) -> Self {
        Self {
            standard,
            state: RwLock::new(ChainState {
                layers: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Current entry point: the most recent layer, or the standard planner
    pub fn head(&self) -> Arc<dyn Planner> {
        let state = self.state.read();
        state
            .layers
            .last()
            .map(|layer| Arc::clone(&layer.planner))
            .unwrap_or_else(|| Arc::clone(&self.standard))
    }

    /// Install a new layer on top of the chain.
    ///
    /// `factory` receives the current entry point as the layer's `next` and
    /// must not call back into this chain.
    pub fn install<F>(&self, factory: F) -> LayerHandle
    where
        F: FnOnce(Arc<dyn Planner>) -> Arc<dyn Planner>,
    {
        let mut state = self.state.write();
        let next = state
            .layers
            .last()
            .map(|layer| Arc::clone(&layer.planner))
            .unwrap_or_else(|| Arc::clone(&self.standard));

        let planner = factory(next);
        let id = state.next_id;
        state.next_id += 1;

        let handle = LayerHandle {
            id,
            name: planner.name().to_string(),
        };
        info!(layer = %handle.name, depth = state.layers.len() + 1, "Planner interceptor installed");

        state.layers.push(Layer { id, planner });
        handle
    }

    /// Remove a layer, restoring the entry point that preceded it.
    ///
    /// Only the most recently installed layer can be removed.
    pub fn uninstall(&self, handle: &LayerHandle) -> FilterResult<()> {
        let mut state = self.state.write();
        let position = state.layers.iter().position(|l| l.id == handle.id);
        match position {
            Some(i) if i + 1 == state.layers.len() => {
                state.layers.pop();
                info!(layer = %handle.name, depth = state.layers.len(), "Planner interceptor removed");
                Ok(())
            }
            Some(_) => Err(FilterError::hook_order(format!(
                "interceptor '{}' is not the most recently installed layer",
                handle.name
            ))),
            None => Err(FilterError::hook_order(format!(
                "interceptor '{}' is not installed",
                handle.name
            ))),
        }
    }

    /// Number of installed layers
    pub fn depth(&self) -> usize {
        self.state.read().layers.len()
    }

    /// Layer names from the entry point down to the first installed layer
    pub fn layer_names(&self) -> Vec<String> {
        self.state
            .read()
            .layers
            .iter()
            .rev()
            .map(|layer| layer.planner.name().to_string())
            .collect()
    }
}

impl Default for PlannerChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner for PlannerChain {
    fn plan(
        &self,
        query: &Query,
        options: CursorOptions,
        params: &BoundParams,
    ) -> FilterResult<PlannedStatement> {
        let head = self.head();
        debug!(entry = head.name(), command = query.command.as_str(), "Planning statement");
        head.plan(query, options, params)
    }

    fn name(&self) -> &str {
        "planner_chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::types::CommandKind;
    use parking_lot::Mutex;

    /// Records its name into a shared trace before forwarding
    struct Recorder {
        name: &'static str,
        next: Arc<dyn Planner>,
        trace: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Planner for Recorder {
        fn plan(
            &self,
            query: &Query,
            options: CursorOptions,
            params: &BoundParams,
        ) -> FilterResult<PlannedStatement> {
            self.trace.lock().push(self.name);
            self.next.plan(query, options, params)
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn layer(
        name: &'static str,
        trace: &Arc<Mutex<Vec<&'static str>>>,
    ) -> impl FnOnce(Arc<dyn Planner>) -> Arc<dyn Planner> {
        let trace = Arc::clone(trace);
        move |next| Arc::new(Recorder { name, next, trace }) as Arc<dyn Planner>
    }

    #[test]
    fn test_standard_planner_without_layers() {
        let chain = PlannerChain::new();
        let params = BoundParams {
            values: vec![Some("1".to_string()), None],
        };
        let planned = chain
            .plan(&Query::new(CommandKind::Select), CursorOptions::default(), &params)
            .unwrap();

        assert_eq!(planned.command, CommandKind::Select);
        assert_eq!(planned.param_count, 2);
        assert_eq!(chain.depth(), 0);
        assert_eq!(chain.head().name(), "standard_planner");
    }

    #[test]
    fn test_layers_run_newest_first() {
        let chain = PlannerChain::new();
        let trace = Arc::new(Mutex::new(Vec::new()));
        let _first = chain.install(layer("first", &trace));
        let _second = chain.install(layer("second", &trace));

        chain
            .plan(&Query::new(CommandKind::Select), CursorOptions::default(), &BoundParams::none())
            .unwrap();

        assert_eq!(*trace.lock(), vec!["second", "first"]);
        assert_eq!(chain.layer_names(), vec!["second", "first"]);
    }

    #[test]
    fn test_uninstall_restores_previous_head() {
        let chain = PlannerChain::new();
        let trace = Arc::new(Mutex::new(Vec::new()));
        let first = chain.install(layer("first", &trace));
        let second = chain.install(layer("second", &trace));

        chain.uninstall(&second).unwrap();
        assert_eq!(chain.head().name(), "first");

        chain.uninstall(&first).unwrap();
        assert_eq!(chain.head().name(), "standard_planner");
    }

    #[test]
    fn test_uninstall_out_of_order_fails() {
        let chain = PlannerChain::new();
        let trace = Arc::new(Mutex::new(Vec::new()));
        let first = chain.install(layer("first", &trace));
        let _second = chain.install(layer("second", &trace));

        let err = chain.uninstall(&first).unwrap_err();
        assert!(matches!(err, FilterError::HookOrder { .. }));
        assert_eq!(chain.depth(), 2);
    }

    #[test]
    fn test_uninstall_twice_fails() {
        let chain = PlannerChain::new();
        let trace = Arc::new(Mutex::new(Vec::new()));
        let first = chain.install(layer("first", &trace));

        chain.uninstall(&first).unwrap();
        assert!(chain.uninstall(&first).is_err());
    }
}
