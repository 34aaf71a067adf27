//! Scoped handle for one content type of the stack.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::stack::{params_or_default, stack_query, EntryResource, Query, QueryModule};
use crate::{Connection, Error};

/// Factory for entry resources and entry queries scoped to one content
/// type.
pub struct ContentTypeHandle {
    uid: String,
    connection: Arc<dyn Connection>,
}

impl ContentTypeHandle {
    pub(crate) fn new(uid: String, connection: Arc<dyn Connection>) -> Self {
        Self { uid, connection }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Handle for one entry of this content type.
    pub fn entry(&self, uid: &str) -> Result<EntryResource, Error> {
        if uid.is_empty() {
            return Err(Error::invalid_argument(
                "Kindly provide an entry uid. e.g. .entry(\"blt1234567890abcef\")",
            ));
        }
        Ok(EntryResource::new(
            uid.to_string(),
            self.uid.clone(),
            Arc::clone(&self.connection),
        ))
    }

    /// Query over this content type's entries.
    pub fn query(&self) -> Query {
        Query::new(
            Arc::clone(&self.connection),
            QueryModule::Entries,
            Some(self.uid.clone()),
        )
    }

    /// Create a new entry from the given payload.
    pub async fn create_entry(&self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        let options = json!({
            "payload": payload,
            "content_type_uid": self.uid,
            "action": "createEntry",
        });
        stack_query(self.connection.as_ref(), options).await
    }

    /// Fetch this content type's definition.
    pub async fn fetch(&self, params: Value) -> Result<Value, Error> {
        let options = json!({
            "uid": self.uid,
            "params": params_or_default(params),
            "action": "getContentType",
        });
        stack_query(self.connection.as_ref(), options).await
    }
}
