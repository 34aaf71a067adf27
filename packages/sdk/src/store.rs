//! Host-backed key/value store.
//!
//! Persistence lives entirely in the host application; every operation is
//! one request on the `store` action with `{action, key?, value?}`.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::{Connection, Error};

/// Per-extension persistent store, delegated to the host.
pub struct StoreHandle {
    connection: Arc<dyn Connection>,
}

impl StoreHandle {
    pub(crate) fn new(connection: Arc<dyn Connection>) -> Self {
        Self { connection }
    }

    /// The stored value for `key`, `Null` when absent.
    pub async fn get(&self, key: &str) -> Result<Value, Error> {
        if key.is_empty() {
            return Err(Error::invalid_parameters());
        }
        let response = self
            .connection
            .send_to_parent("store", json!({ "action": "get", "key": key }))
            .await?;
        Ok(response.data)
    }

    /// All stored key/value pairs as one object.
    pub async fn get_all(&self) -> Result<Value, Error> {
        let response = self
            .connection
            .send_to_parent("store", json!({ "action": "getAll" }))
            .await?;
        match response.data {
            Value::Null => Ok(Value::Object(serde_json::Map::new())),
            data => Ok(data),
        }
    }

    /// Store `value` under `key`. A `Null` value is not storable; use
    /// [`remove`](Self::remove) instead.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        if key.is_empty() || value.is_null() {
            return Err(Error::invalid_parameters());
        }
        self.connection
            .send_to_parent(
                "store",
                json!({ "action": "set", "key": key, "value": value }),
            )
            .await?;
        Ok(())
    }

    /// Remove the value stored under `key`.
    pub async fn remove(&self, key: &str) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::invalid_parameters());
        }
        self.connection
            .send_to_parent("store", json!({ "action": "remove", "key": key }))
            .await?;
        Ok(())
    }

    /// Drop everything this extension has stored.
    pub async fn clear(&self) -> Result<(), Error> {
        self.connection
            .send_to_parent("store", json!({ "action": "clear" }))
            .await?;
        Ok(())
    }
}
