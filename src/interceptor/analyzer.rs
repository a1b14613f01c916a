// SPDX-License-Identifier: Apache-2.0

//! Statement Analyzer
//!
//! Turns SQL text into `Query` values the planner chain understands:
//! a command kind plus, for data-modifying statements, the resolved id of
//! the target relation.
//!
//! Identifiers are folded the way the host does it: unquoted names are
//! lower-cased, quoted names are kept verbatim.

use sqlparser::ast::{
    FromTable, Ident, ObjectName, ObjectNamePart, SetExpr, Statement, TableFactor, TableObject,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::types::{CommandKind, Query};
use crate::catalog::{Catalog, RelationId};
use crate::error::{FilterError, FilterResult};

/// Parse and analyze every statement in `sql`
pub fn analyze(sql: &str, catalog: &dyn Catalog) -> FilterResult<Vec<Query>> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| FilterError::syntax_error(e.to_string()))?;

    Ok(statements
        .iter()
        .map(|statement| analyze_statement(statement, catalog))
        .collect())
}

/// Analyze a single parsed statement
pub fn analyze_statement(statement: &Statement, catalog: &dyn Catalog) -> Query {
    // EXPLAIN plans its inner statement
    if let Statement::Explain { statement, .. } = statement {
        return analyze_statement(statement, catalog);
    }

    let command = classify(statement);
    let result_relation = target_parts(statement).and_then(|parts| resolve(&parts, catalog));

    if command != CommandKind::Utility && command != CommandKind::Select {
        debug!(
            command = command.as_str(),
            resolved = result_relation.is_some(),
            "Analyzed data-modifying statement"
        );
    }

    Query {
        command,
        result_relation,
        source_text: Some(statement.to_string()),
    }
}

/// Command kind of a parsed statement
pub fn classify(statement: &Statement) -> CommandKind {
    match data_modifying_body(statement) {
        Statement::Query(_) => CommandKind::Select,
        Statement::Insert(_) => CommandKind::Insert,
        Statement::Update(_) => CommandKind::Update,
        Statement::Delete(_) => CommandKind::Delete,
        Statement::Merge { .. } => CommandKind::Merge,
        Statement::Explain { statement, .. } => classify(statement),
        _ => CommandKind::Utility,
    }
}

/// `WITH ... DELETE/UPDATE/MERGE/INSERT` parses as a query whose body is the
/// data-modifying statement; its command kind is that of the body.
fn data_modifying_body(statement: &Statement) -> &Statement {
    match statement {
        Statement::Query(query) => match query.body.as_ref() {
            SetExpr::Insert(inner)
            | SetExpr::Update(inner)
            | SetExpr::Delete(inner)
            | SetExpr::Merge(inner) => data_modifying_body(inner),
            _ => statement,
        },
        _ => statement,
    }
}

/// Folded name parts of the statement's target relation
fn target_parts(statement: &Statement) -> Option<Vec<String>> {
    match data_modifying_body(statement) {
        Statement::Insert(insert) => match &insert.table {
            TableObject::TableName(name) => Some(name_parts(name)),
            _ => None,
        },
        Statement::Update(update) => table_factor_parts(&update.table.relation),
        Statement::Delete(delete) => {
            if let Some(name) = delete.tables.first() {
                return Some(name_parts(name));
            }
            match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
                    table_factor_parts(&tables.first()?.relation)
                }
            }
        }
        Statement::Merge { table, .. } => table_factor_parts(table),
        _ => None,
    }
}

fn table_factor_parts(factor: &TableFactor) -> Option<Vec<String>> {
    match factor {
        TableFactor::Table { name, .. } => Some(name_parts(name)),
        _ => None,
    }
}

fn name_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .filter_map(|part| match part {
            ObjectNamePart::Identifier(ident) => Some(fold_ident(ident)),
            _ => None,
        })
        .collect()
}

fn fold_ident(ident: &Ident) -> String {
    match ident.quote_style {
        Some(_) => ident.value.clone(),
        None => ident.value.to_lowercase(),
    }
}

/// Resolve `[database.][schema.]table` through the catalog
fn resolve(parts: &[String], catalog: &dyn Catalog) -> Option<RelationId> {
    match parts {
        [table] => catalog.lookup(None, table),
        [schema, table] => catalog.lookup(Some(schema), table),
        [_database, schema, table] => catalog.lookup(Some(schema), table),
        _ => None,
    }
}
