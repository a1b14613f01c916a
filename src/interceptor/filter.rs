// SPDX-License-Identifier: Apache-2.0

//! Append-Only Filter
//!
//! Planning interceptor that rejects UPDATE, DELETE and MERGE statements
//! whose target relation is in the configured protected list.
//!
//! The filter only blocks on an exact match against a positively resolved
//! target. An empty configuration, a read or insert, or a target whose name
//! can no longer be resolved all pass through.

use std::sync::Arc;

use tracing::{debug, warn};

use super::pipeline::Planner;
use super::relations::{parse_relation_list, qualified_name};
use super::types::{BoundParams, CursorOptions, PlannedStatement, Query, Verdict};
use crate::catalog::Catalog;
use crate::error::{FilterError, FilterResult};
use crate::policy::PolicyStore;

pub const FILTER_NAME: &str = "append_only_filter";

/// The statement interceptor
pub struct AppendOnlyFilter {
    policy: Arc<dyn PolicyStore>,
    catalog: Arc<dyn Catalog>,
    next: Arc<dyn Planner>,
}

impl AppendOnlyFilter {
    pub fn new(
        policy: Arc<dyn PolicyStore>,
        catalog: Arc<dyn Catalog>,
        next: Arc<dyn Planner>,
    ) -> Self {
        Self {
            policy,
            catalog,
            next,
        }
    }

    /// Decide whether a statement may proceed
    pub fn consult(&self, query: &Query) -> Verdict {
        let Some(raw) = self.policy.protected_relations() else {
            return Verdict::Allow;
        };
        if raw.is_empty() {
            return Verdict::Allow;
        }

        if query.command.is_append_safe() {
            return Verdict::Allow;
        }

        let Some(qualified) = self.resolve_target(query) else {
            debug!(
                command = query.command.as_str(),
                "Target relation unresolved, allowing statement"
            );
            return Verdict::Allow;
        };

        if parse_relation_list(&raw)
            .into_iter()
            .any(|entry| entry == qualified)
        {
            return Verdict::Reject(qualified);
        }

        Verdict::Allow
    }

    /// `schema.table` of the statement's result relation, if both halves resolve
    fn resolve_target(&self, query: &Query) -> Option<String> {
        let id = query.result_relation?;
        let table = self.catalog.relation_name(id)?;
        let schema = self.catalog.relation_schema(id)?;
        Some(qualified_name(&schema, &table))
    }
}

impl Planner for AppendOnlyFilter {
    fn plan(
        &self,
        query: &Query,
        options: CursorOptions,
        params: &BoundParams,
    ) -> FilterResult<PlannedStatement> {
        // Always forward first so interceptors below us keep working
        let planned = self.next.plan(query, options, params)?;

        match self.consult(query) {
            Verdict::Allow => Ok(planned),
            Verdict::Reject(relation) => {
                warn!(
                    relation = %relation,
                    command = query.command.as_str(),
                    "Rejected write to append-only relation"
                );
                drop(planned);
                Err(FilterError::policy_violation(relation))
            }
        }
    }

    fn name(&self) -> &str {
        FILTER_NAME
    }
}
