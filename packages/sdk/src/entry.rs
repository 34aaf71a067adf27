//! Handle for the entry currently being edited.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use extkit_model::{resolve, FieldPath};

use crate::bus::{channel, MessageBus};
use crate::field::FieldHandle;
use crate::{Connection, Error};

/// The content type the current entry conforms to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub schema: Vec<extkit_model::SchemaNode>,
}

/// Local mirror of the entry being edited in the host UI.
///
/// The cached data is replaced wholesale (never merged) by `entrySave`
/// broadcasts. Live, unsaved edits arrive on `entryChange` and are kept in
/// a separate side channel so the authoritative saved state stays intact.
pub struct EntryHandle {
    content_type: Arc<ContentType>,
    locale: String,
    data: Arc<Mutex<Value>>,
    changed_data: Arc<Mutex<Value>>,
    connection: Arc<dyn Connection>,
    bus: Arc<MessageBus>,
}

impl EntryHandle {
    /// Built by [`crate::Extension`]; registers the cache-maintenance
    /// subscriptions before any user callback can be registered, so cache
    /// replacement always runs ahead of user callbacks on the same
    /// broadcast.
    pub(crate) fn new(
        content_type: Arc<ContentType>,
        entry: Value,
        locale: String,
        connection: Arc<dyn Connection>,
        bus: Arc<MessageBus>,
    ) -> Self {
        let data = Arc::new(Mutex::new(entry));
        let changed_data = Arc::new(Mutex::new(Value::Null));

        {
            let data = Arc::clone(&data);
            bus.on(channel::ENTRY_SAVE, move |payload| {
                let mut guard = data.lock().unwrap_or_else(PoisonError::into_inner);
                *guard = payload.clone();
            });
        }
        {
            let changed_data = Arc::clone(&changed_data);
            bus.on(channel::ENTRY_CHANGE, move |payload| {
                let mut guard = changed_data.lock().unwrap_or_else(PoisonError::into_inner);
                *guard = payload.clone();
            });
        }

        Self {
            content_type,
            locale,
            data,
            changed_data,
            connection,
            bus,
        }
    }

    /// The current cached entry payload, as last confirmed by the host.
    pub fn get_data(&self) -> Value {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Live unsaved edits, as last pushed on the change channel. `Null`
    /// until the first change broadcast.
    pub fn changed_data(&self) -> Value {
        self.changed_data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Resolve a dotted field uid and wrap the result in a new handle.
    ///
    /// Each call returns an independent handle; handles for the same path
    /// share no mutable state but all track the same broadcasts.
    /// Resolution failures propagate unchanged.
    pub fn get_field(&self, uid: &str) -> Result<FieldHandle, Error> {
        let path = FieldPath::parse(uid)?;
        let (schema, value) = {
            let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
            let resolved = resolve(&self.content_type.schema, &data, &path)?;
            (resolved.schema.to_owned(), resolved.value.clone())
        };
        Ok(FieldHandle::new(
            path,
            schema,
            value,
            Arc::clone(&self.content_type),
            Arc::clone(&self.connection),
            Arc::clone(&self.bus),
            false,
        ))
    }

    /// Run the callback on every save broadcast. The handle's own cached
    /// data has already been replaced by the time the callback sees the
    /// payload.
    pub fn on_save(&self, callback: impl Fn(&Value) + Send + Sync + 'static) {
        self.bus.on(channel::ENTRY_SAVE, callback);
    }

    /// Run the callback on every change broadcast (live unsaved edits).
    pub fn on_change(&self, callback: impl Fn(&Value) + Send + Sync + 'static) {
        self.bus.on(channel::ENTRY_CHANGE, callback);
    }

    pub fn on_publish(&self, callback: impl Fn(&Value) + Send + Sync + 'static) {
        self.bus.on(channel::ENTRY_PUBLISH, callback);
    }

    pub fn on_unpublish(&self, callback: impl Fn(&Value) + Send + Sync + 'static) {
        self.bus.on(channel::ENTRY_UNPUBLISH, callback);
    }
}
