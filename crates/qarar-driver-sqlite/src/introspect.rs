//! Schema introspection
//!
//! Django names tables `<app_label>_<model>`. Tables are split at the first
//! underscore, so app labels containing underscores are misattributed, and
//! many-to-many join tables show up as models of their own.

use qarar_analyzer::{FieldInfo, FieldKind, IndexInfo, ModelCatalog, ModelInfo};
use qarar_core::{QararError, Result};
use rusqlite::Connection;
use std::collections::HashSet;

fn sql_error(err: rusqlite::Error) -> QararError {
    QararError::Query(err.to_string())
}

/// Splits `content_post` into `("content", "post")`
pub fn split_table_name(table: &str) -> Option<(&str, &str)> {
    let (app, model) = table.split_once('_')?;
    if app.is_empty() || model.is_empty() {
        return None;
    }
    Some((app, model))
}

/// Reads every user table into a catalog of models
pub fn introspect_catalog(conn: &Connection) -> Result<ModelCatalog> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .map_err(sql_error)?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sql_error)?;

    let mut catalog = ModelCatalog::new();
    for table in &tables {
        let Some((app, model)) = split_table_name(table) else {
            tracing::debug!(table = %table, "skipping table without app prefix");
            continue;
        };
        let (fields, indexes) = introspect_fields(conn, table)?;
        let mut info = ModelInfo::new(app, model).with_table(table.clone());
        info.fields = fields;
        info.indexes = indexes;
        catalog.add_model(info);
    }

    tracing::debug!(tables = tables.len(), models = catalog.len(), "introspected schema");
    Ok(catalog)
}

fn introspect_fields(conn: &Connection, table: &str) -> Result<(Vec<FieldInfo>, Vec<IndexInfo>)> {
    let foreign_keys = column_set(conn, "SELECT \"from\" FROM pragma_foreign_key_list(?1)", table)?;
    let indexes = table_indexes(conn, table)?;
    let indexed: HashSet<&str> = indexes.iter().filter_map(IndexInfo::leading_column).collect();

    let mut stmt = conn
        .prepare("SELECT name, pk FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(sql_error)?;
    let columns = stmt
        .query_map([table], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .map_err(sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sql_error)?;

    let fields = columns
        .into_iter()
        .map(|(column, pk)| {
            let is_fk = foreign_keys.contains(&column);
            let name = if is_fk {
                column.strip_suffix("_id").unwrap_or(&column).to_string()
            } else {
                column.clone()
            };
            let field = FieldInfo::new(name)
                .with_kind(if is_fk {
                    FieldKind::ForeignKey
                } else {
                    FieldKind::Regular
                })
                .indexed(indexed.contains(column.as_str()))
                .with_column(column);
            if pk > 0 { field.primary() } else { field }
        })
        .collect();

    Ok((fields, indexes))
}

/// Every index on a table with its key columns in order.
///
/// Expression parts (`lower(title)`) have no column name in
/// `pragma_index_info` and are kept as `None`.
fn table_indexes(conn: &Connection, table: &str) -> Result<Vec<IndexInfo>> {
    let mut list = conn
        .prepare("SELECT name, \"unique\" FROM pragma_index_list(?1) ORDER BY name")
        .map_err(sql_error)?;
    let entries = list
        .query_map([table], |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)))
        .map_err(sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sql_error)?;

    let mut info = conn
        .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")
        .map_err(sql_error)?;
    let mut indexes = Vec::with_capacity(entries.len());
    for (name, is_unique) in entries {
        let columns = info
            .query_map([&name], |row| row.get::<_, Option<String>>(0))
            .map_err(sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sql_error)?;
        indexes.push(IndexInfo::new(name, columns).unique(is_unique));
    }
    Ok(indexes)
}

fn column_set(conn: &Connection, sql: &str, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(sql).map_err(sql_error)?;
    let values = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .map_err(sql_error)?
        .collect::<rusqlite::Result<HashSet<_>>>()
        .map_err(sql_error)?;
    Ok(values)
}

#[cfg(test)]
mod tests;
