//! Core extkit: the schema-and-data layer of the extension SDK.
//!
//! This crate is the pure part of extkit. It knows nothing about the host
//! window or the messaging channel; it only models:
//! - `SchemaNode` / `BlockSchema`: the content type's schema tree
//! - `FieldPath`: validated dotted field uids (`modular_blocks.0.banner`)
//! - `resolve`: the walk that maps a path over the schema tree and the
//!   entry's data tree to a value and its schema
//!
//! # Example
//!
//! ```rust
//! use extkit_model::{fieldpath, resolve, SchemaNode};
//! use serde_json::json;
//!
//! let schema: Vec<SchemaNode> =
//!     serde_json::from_value(json!([{ "uid": "title", "data_type": "single_line" }])).unwrap();
//! let data = json!({ "title": "Hello" });
//!
//! let resolved = resolve(&schema, &data, &fieldpath!("title")).unwrap();
//! assert_eq!(resolved.value, &json!("Hello"));
//! ```

mod error;
mod path;
mod resolver;
mod schema;

pub use error::ResolveError;
pub use path::{FieldPath, Segment};
pub use resolver::{resolve, Resolved};
pub use schema::{BlockSchema, DataType, FieldSchema, SchemaNode, SchemaRef};
