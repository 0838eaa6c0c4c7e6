//! Model catalog
//!
//! Describes the models of each app: their tables, fields, relations and
//! which columns are indexed. The optimizer reads it to pick probe queries
//! and index suggestions.

use indexmap::IndexMap;
use qarar_core::{QararError, Result};
use serde::{Deserialize, Serialize};

/// How a field relates to other models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Regular,
    ForeignKey,
    ManyToMany,
}

/// A model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    /// Database column; equal to `name` unless the field maps elsewhere
    pub column: String,
    pub kind: FieldKind,
    /// Whether the column leads an index
    pub db_index: bool,
    pub primary_key: bool,
}

impl FieldInfo {
    /// Creates a regular, unindexed field stored in a column of the same name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            kind: FieldKind::Regular,
            db_index: false,
            primary_key: false,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn indexed(mut self, db_index: bool) -> Self {
        self.db_index = db_index;
        self
    }

    /// Marks the field as the primary key, which is always indexed
    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.db_index = true;
        self
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::ForeignKey | FieldKind::ManyToMany)
    }
}

/// An index on a model's table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    /// Key columns in order; `None` for expression parts such as `lower(title)`
    pub columns: Vec<Option<String>>,
    pub is_unique: bool,
}

impl IndexInfo {
    pub fn new(name: impl Into<String>, columns: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            columns,
            is_unique: false,
        }
    }

    pub fn unique(mut self, is_unique: bool) -> Self {
        self.is_unique = is_unique;
        self
    }

    /// The first key column, unless the index leads with an expression
    pub fn leading_column(&self) -> Option<&str> {
        self.columns.first()?.as_deref()
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

/// A model and the table backing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub app_label: String,
    pub name: String,
    pub table: String,
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub indexes: Vec<IndexInfo>,
}

impl ModelInfo {
    /// Creates a model stored in `<app_label>_<name>`
    pub fn new(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        let app_label = app_label.into();
        let name = name.into();
        Self {
            table: format!("{}_{}", app_label, name.to_lowercase()),
            app_label,
            name,
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_index(mut self, index: IndexInfo) -> Self {
        self.indexes.push(index);
        self
    }

    /// `app_label.name`
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.primary_key)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::ForeignKey)
    }

    /// Whether any index spans more than one key
    pub fn has_composite_index(&self) -> bool {
        self.indexes.iter().any(IndexInfo::is_composite)
    }

    /// Number of foreign key and many-to-many fields
    pub fn relationship_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_relation()).count()
    }
}

/// Models grouped by app, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    apps: IndexMap<String, Vec<ModelInfo>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model under its app
    pub fn add_model(&mut self, model: ModelInfo) {
        self.apps
            .entry(model.app_label.clone())
            .or_default()
            .push(model);
    }

    pub fn app_labels(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }

    /// Models of an app
    pub fn app(&self, label: &str) -> Result<&[ModelInfo]> {
        self.apps
            .get(label)
            .map(Vec::as_slice)
            .ok_or_else(|| QararError::NotFound(format!("App {}", label)))
    }

    /// Looks up a model; the model name is matched case-insensitively
    pub fn model(&self, app_label: &str, model_name: &str) -> Result<&ModelInfo> {
        self.apps
            .get(app_label)
            .and_then(|models| {
                models
                    .iter()
                    .find(|m| m.name.eq_ignore_ascii_case(model_name))
            })
            .ok_or_else(|| QararError::NotFound(format!("Model {}.{}", app_label, model_name)))
    }

    /// Total number of models
    pub fn len(&self) -> usize {
        self.apps.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
