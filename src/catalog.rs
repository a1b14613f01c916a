// SPDX-License-Identifier: Apache-2.0

//! Relation Catalog
//!
//! Maps relation ids to schema and table names. The filter only ever reads
//! names back from ids; a missing entry means the relation is gone and the
//! target counts as unresolved.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opaque relation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name lookups the filter and the analyzer need from the host
pub trait Catalog: Send + Sync {
    /// Resolve a possibly schema-qualified name to a relation id
    fn lookup(&self, schema: Option<&str>, name: &str) -> Option<RelationId>;

    /// Table name of a relation, None if it no longer exists
    fn relation_name(&self, id: RelationId) -> Option<String>;

    /// Schema name of a relation, None if it no longer exists
    fn relation_schema(&self, id: RelationId) -> Option<String>;
}

#[derive(Debug, Clone)]
struct RelationEntry {
    schema: String,
    name: String,
}

#[derive(Debug)]
struct CatalogState {
    relations: HashMap<RelationId, RelationEntry>,
    search_path: Vec<String>,
    next_id: u32,
}

/// Thread-safe catalog kept in memory
#[derive(Debug)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

/// First id handed out; lower ids are reserved for system relations
const FIRST_USER_ID: u32 = 16384;

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CatalogState {
                relations: HashMap::new(),
                search_path: vec!["public".to_string()],
                next_id: FIRST_USER_ID,
            }),
        }
    }

    /// Register a relation, returning the existing id if it is already present
    pub fn create_relation(&self, schema: &str, name: &str) -> RelationId {
        let mut state = self.state.write();
        if let Some(id) = find(&state.relations, schema, name) {
            return id;
        }

        let id = RelationId(state.next_id);
        state.next_id += 1;
        state.relations.insert(
            id,
            RelationEntry {
                schema: schema.to_string(),
                name: name.to_string(),
            },
        );
        debug!(relation = %id, schema, name, "Relation created");
        id
    }

    /// Remove a relation. Returns false if it was not present.
    pub fn drop_relation(&self, id: RelationId) -> bool {
        let removed = self.state.write().relations.remove(&id).is_some();
        if removed {
            debug!(relation = %id, "Relation dropped");
        }
        removed
    }

    /// Replace the schema search order used for unqualified names
    pub fn set_search_path<I, S>(&self, schemas: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.write().search_path = schemas.into_iter().map(Into::into).collect();
    }

    pub fn search_path(&self) -> Vec<String> {
        self.state.read().search_path.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().relations.is_empty()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn find(relations: &HashMap<RelationId, RelationEntry>, schema: &str, name: &str) -> Option<RelationId> {
    relations
        .iter()
        .find(|(_, r)| r.schema == schema && r.name == name)
        .map(|(id, _)| *id)
}

impl Catalog for InMemoryCatalog {
    fn lookup(&self, schema: Option<&str>, name: &str) -> Option<RelationId> {
        let state = self.state.read();
        match schema {
            Some(schema) => find(&state.relations, schema, name),
            None => state
                .search_path
                .iter()
                .find_map(|schema| find(&state.relations, schema, name)),
        }
    }

    fn relation_name(&self, id: RelationId) -> Option<String> {
        self.state.read().relations.get(&id).map(|r| r.name.clone())
    }

    fn relation_schema(&self, id: RelationId) -> Option<String> {
        self.state.read().relations.get(&id).map(|r| r.schema.clone())
    }
}
