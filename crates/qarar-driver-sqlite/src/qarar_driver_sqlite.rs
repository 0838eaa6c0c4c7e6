//! SQLite driver for Qarar
//!
//! Executes probe queries through a `QueryLog` and reads a Django-style
//! schema (`<app>_<model>` tables) into a `ModelCatalog`.

mod database;
mod introspect;

pub use database::SqliteDatabase;
pub use introspect::{introspect_catalog, split_table_name};
