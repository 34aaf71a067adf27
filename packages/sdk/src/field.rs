//! Handle for a single field of the current entry.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{json, Value};

use extkit_model::{resolve, DataType, FieldPath, FieldSchema};

use crate::bus::{channel, MessageBus};
use crate::entry::ContentType;
use crate::{Connection, Error};

struct FieldState {
    value: Value,
    resolved_value: Value,
}

/// Cached view of one field, addressed by its dotted uid path.
///
/// The cached value is refreshed on every full-entry data push: the handle
/// re-resolves its own path against the fresh payload. A path that no
/// longer resolves (an instance was removed, a block changed shape) degrades
/// the cache to `Null` instead of erroring; subsequent `get_data` calls
/// report `Null` until the path resolves again.
pub struct FieldHandle {
    uid: FieldPath,
    schema: FieldSchema,
    state: Arc<Mutex<FieldState>>,
    connection: Arc<dyn Connection>,
    bus: Arc<MessageBus>,
    self_field: bool,
}

impl fmt::Debug for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHandle")
            .field("uid", &self.uid)
            .field("schema", &self.schema)
            .field("self_field", &self.self_field)
            .finish_non_exhaustive()
    }
}

impl FieldHandle {
    /// `self_field` marks the one field the extension itself is mounted on
    /// (custom-field mode). Only that handle accepts writes to compound
    /// types, and only that handle tracks the dedicated field-change
    /// channel.
    pub(crate) fn new(
        uid: FieldPath,
        schema: FieldSchema,
        value: Value,
        content_type: Arc<ContentType>,
        connection: Arc<dyn Connection>,
        bus: Arc<MessageBus>,
        self_field: bool,
    ) -> Self {
        let state = Arc::new(Mutex::new(FieldState {
            resolved_value: value.clone(),
            value,
        }));

        {
            let state = Arc::clone(&state);
            let path = uid.clone();
            bus.on(channel::UPDATE_FIELDS, move |data| {
                let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
                match resolve(&content_type.schema, data, &path) {
                    Ok(resolved) => {
                        guard.value = resolved.value.clone();
                        guard.resolved_value = resolved.value.clone();
                    }
                    Err(_) => {
                        guard.value = Value::Null;
                        guard.resolved_value = Value::Null;
                    }
                }
            });
        }

        if self_field {
            let state = Arc::clone(&state);
            bus.on(channel::EXTENSION_FIELD_CHANGE, move |data| {
                let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
                guard.value = data.clone();
                guard.resolved_value = data.clone();
            });
        }

        Self {
            uid,
            schema,
            state,
            connection,
            bus,
            self_field,
        }
    }

    /// The dotted path this handle was resolved from.
    pub fn uid(&self) -> &FieldPath {
        &self.uid
    }

    pub fn data_type(&self) -> DataType {
        self.schema.data_type()
    }

    /// The schema the path resolution landed on, captured at lookup time.
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// The cached value, exactly as stored in the entry payload.
    pub fn get_data(&self) -> Value {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value
            .clone()
    }

    /// The cached value in resolved form. Today this coincides with
    /// [`get_data`](Self::get_data); it is a separate slot so resolved
    /// representations (expanded references, asset objects) can diverge
    /// without an API change.
    pub fn get_data_resolved(&self) -> Value {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resolved_value
            .clone()
    }

    /// Write a new value for this field to the host.
    ///
    /// Compound and reference-like types are rejected locally unless this
    /// is the extension's own field; the host is the authority for
    /// everything else. On success the cache is updated immediately rather
    /// than waiting for the next data push.
    pub async fn set_data(&self, value: Value) -> Result<(), Error> {
        if !self.self_field && self.data_type().is_compound() {
            return Err(Error::UnsupportedFieldType);
        }
        let payload = json!({
            "data": value,
            "uid": self.uid.to_string(),
            "self": self.self_field,
        });
        self.connection.send_to_parent("setData", payload).await?;
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        guard.value = value.clone();
        guard.resolved_value = value;
        Ok(())
    }

    /// Ask the host to move keyboard focus to this field.
    pub async fn set_focus(&self) -> Result<(), Error> {
        self.connection.send_to_parent("focus", Value::Null).await?;
        Ok(())
    }

    /// Run the callback whenever the extension's own field value changes in
    /// the host UI. Returns `false` (without registering) on any handle
    /// other than the self field; other fields' edits arrive through the
    /// entry-level broadcasts. The cached value has already been updated by
    /// the time the callback sees the payload.
    pub fn on_change(&self, callback: impl Fn(&Value) + Send + Sync + 'static) -> bool {
        if !self.self_field {
            return false;
        }
        self.bus.on(channel::EXTENSION_FIELD_CHANGE, callback);
        true
    }
}
