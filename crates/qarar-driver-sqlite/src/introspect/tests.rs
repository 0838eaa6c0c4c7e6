//! Tests for schema introspection

use super::*;
use pretty_assertions::assert_eq;
use qarar_analyzer::{DatabaseOptimizer, IndexSuggestionKind};

const SCHEMA: &str = "
    CREATE TABLE users_user (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        is_active INTEGER NOT NULL
    );
    CREATE TABLE content_category (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );
    CREATE TABLE content_post (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        author_id INTEGER REFERENCES users_user (id),
        category_id INTEGER REFERENCES content_category (id)
    );
    CREATE INDEX content_post_category_id ON content_post (category_id);
    CREATE TABLE migrations (id INTEGER PRIMARY KEY);
";

fn catalog() -> ModelCatalog {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    introspect_catalog(&conn).unwrap()
}

#[test]
fn test_split_table_name() {
    assert_eq!(split_table_name("content_post"), Some(("content", "post")));
    assert_eq!(
        split_table_name("content_post_tags"),
        Some(("content", "post_tags"))
    );
    assert_eq!(split_table_name("migrations"), None);
    assert_eq!(split_table_name("_hidden"), None);
    assert_eq!(split_table_name("trailing_"), None);
}

#[test]
fn test_apps_and_models() {
    let catalog = catalog();

    assert_eq!(
        catalog.app_labels().collect::<Vec<_>>(),
        vec!["content", "users"]
    );
    let models: Vec<_> = catalog
        .app("content")
        .unwrap()
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(models, vec!["category", "post"]);
    assert_eq!(catalog.len(), 3);
}

#[test]
fn test_fields() {
    let catalog = catalog();
    let post = catalog.model("content", "Post").unwrap();

    assert_eq!(post.table, "content_post");
    assert_eq!(
        post.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["id", "title", "status", "created_at", "author", "category"]
    );

    let id = post.field("id").unwrap();
    assert!(id.primary_key && id.db_index);

    let author = post.field("author").unwrap();
    assert_eq!(author.column, "author_id");
    assert_eq!(author.kind, FieldKind::ForeignKey);
    assert!(!author.db_index);

    assert!(post.field("category").unwrap().db_index);
    assert_eq!(post.relationship_count(), 2);
}

#[test]
fn test_unique_constraint_counts_as_index() {
    let catalog = catalog();
    let user = catalog.model("users", "user").unwrap();

    assert!(user.field("email").unwrap().db_index);
    assert!(!user.field("is_active").unwrap().db_index);
}

#[test]
fn test_index_suggestions_from_schema() {
    let catalog = catalog();
    let post = catalog.model("content", "post").unwrap();

    let kinds: Vec<_> = DatabaseOptimizer::suggest_indexes(post)
        .into_iter()
        .map(|s| (s.kind, s.fields))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (IndexSuggestionKind::ForeignKey, vec!["author".to_string()]),
            (IndexSuggestionKind::FilterField, vec!["status".to_string()]),
            (
                IndexSuggestionKind::FilterField,
                vec!["created_at".to_string()]
            ),
            (
                IndexSuggestionKind::Composite,
                vec!["status".to_string(), "created_at".to_string()]
            ),
        ]
    );
}

#[test]
fn test_expression_index_is_skipped() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE content_post (id INTEGER PRIMARY KEY, title TEXT, status TEXT);
         CREATE INDEX content_post_lower_title ON content_post (lower(title));
         CREATE INDEX content_post_status_title ON content_post (status, lower(title));",
    )
    .unwrap();

    let catalog = introspect_catalog(&conn).unwrap();
    let post = catalog.model("content", "post").unwrap();

    assert!(!post.field("title").unwrap().db_index);
    assert!(post.field("status").unwrap().db_index);

    let lower_title = post
        .indexes
        .iter()
        .find(|i| i.name == "content_post_lower_title")
        .unwrap();
    assert_eq!(lower_title.columns, vec![None]);
    assert_eq!(lower_title.leading_column(), None);
    assert!(post.has_composite_index());
}

#[test]
fn test_indexes_are_recorded() {
    let catalog = catalog();
    let post = catalog.model("content", "post").unwrap();

    assert_eq!(post.indexes.len(), 1);
    assert_eq!(post.indexes[0].name, "content_post_category_id");
    assert_eq!(post.indexes[0].columns, vec![Some("category_id".to_string())]);
    assert!(!post.indexes[0].is_unique);
    assert!(!post.has_composite_index());

    let user = catalog.model("users", "user").unwrap();
    assert!(user.indexes.iter().any(|i| i.is_unique));
}
