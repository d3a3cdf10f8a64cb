//! Catalog of queryable message-field names, refreshed wholesale from an
//! external schema source.

mod catalog;
mod source;

pub use catalog::{run_refresher, FieldCatalog};
pub use source::{FieldSet, HttpSchemaSource, SchemaError, SchemaSource, StaticSchemaSource};
