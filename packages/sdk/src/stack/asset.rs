//! Request builder for one asset of the stack.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::stack::stack_query;
use crate::{Connection, Error};

/// CRUD-style request builder for one asset, addressed by uid.
///
/// Assets live outside any content type, so the shaped options never carry
/// a `content_type_uid`.
pub struct AssetResource {
    uid: String,
    params: Map<String, Value>,
    connection: Arc<dyn Connection>,
}

impl AssetResource {
    pub(crate) fn new(uid: String, connection: Arc<dyn Connection>) -> Self {
        Self {
            uid,
            params: Map::new(),
            connection,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Restrict result fields; `"BASE"` addresses the asset itself.
    pub fn only(mut self, reference: &str, fields: &[&str]) -> Self {
        let slot = self
            .params
            .entry("only".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = slot {
            let list = map
                .entry(reference.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = list {
                list.extend(fields.iter().map(|field| json!(field)));
            }
        }
        self
    }

    /// Which environment's data to retrieve.
    pub fn environment(mut self, environment: &str) -> Result<Self, Error> {
        if environment.is_empty() {
            return Err(Error::invalid_argument("Argument should be a String."));
        }
        self.params.insert("environment".to_string(), json!(environment));
        Ok(self)
    }

    /// Arbitrary extra request parameter.
    pub fn add_param(mut self, key: &str, value: impl Into<Value>) -> Result<Self, Error> {
        if key.is_empty() {
            return Err(Error::invalid_parameters());
        }
        self.params.insert(key.to_string(), value.into());
        Ok(self)
    }

    /// Fetch the asset.
    pub async fn fetch(self) -> Result<Value, Error> {
        self.request("getAsset", None).await
    }

    /// Update the asset from the given payload.
    pub async fn update(self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        self.request("updateAsset", Some(payload)).await
    }

    /// Delete the asset.
    pub async fn delete(self) -> Result<Value, Error> {
        self.request("deleteAsset", None).await
    }

    /// Publish immediately or on the schedule carried in the payload.
    pub async fn publish(self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        self.request("publishAsset", Some(payload)).await
    }

    /// Unpublish immediately or on the schedule carried in the payload.
    pub async fn unpublish(self, payload: Value) -> Result<Value, Error> {
        if !payload.is_object() {
            return Err(Error::invalid_parameters());
        }
        self.request("unpublishAsset", Some(payload)).await
    }

    /// Entries and assets in which this asset is referenced.
    pub async fn get_references(self) -> Result<Value, Error> {
        self.request("getAssetReferences", None).await
    }

    async fn request(self, action: &str, payload: Option<Value>) -> Result<Value, Error> {
        let mut options = Map::new();
        if let Some(payload) = payload {
            options.insert("payload".to_string(), payload);
        }
        options.insert("uid".to_string(), json!(self.uid));
        options.insert("params".to_string(), Value::Object(self.params));
        options.insert("action".to_string(), json!(action));
        stack_query(self.connection.as_ref(), Value::Object(options)).await
    }
}
