//! Internal broadcast bus.
//!
//! One bus per [`crate::Extension`], injected into every handle at
//! construction. The extension root demultiplexes host events onto named
//! channels; handles subscribe to the channels they care about. There is no
//! process-global emitter, so independent extensions (and tests) never see
//! each other's events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

/// Channel names used by the extension root and the handles.
pub mod channel {
    pub const ENTRY_SAVE: &str = "entrySave";
    pub const ENTRY_CHANGE: &str = "entryChange";
    pub const ENTRY_PUBLISH: &str = "entryPublish";
    pub const ENTRY_UNPUBLISH: &str = "entryUnPublish";
    pub const DASHBOARD_RESIZE: &str = "dashboardResize";
    pub const EXTENSION_FIELD_CHANGE: &str = "extensionFieldChange";
    /// Full-entry data push; every field handle re-resolves on this.
    pub const UPDATE_FIELDS: &str = "updateFields";
}

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Synchronous publish/subscribe over named channels.
///
/// Delivery is synchronous and in registration order. Handlers are
/// infallible by signature, so a subscriber cannot abort delivery to its
/// siblings. Registrations are additive; there is no unsubscribe.
#[derive(Default)]
pub struct MessageBus {
    channels: Mutex<HashMap<String, Vec<Handler>>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler on a channel. Multiple handlers on the same
    /// channel are all invoked independently.
    pub fn on(&self, channel: &str, handler: impl Fn(&Value) + Send + Sync + 'static) {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(channel.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Deliver a payload to every handler currently registered on the
    /// channel. The handler list is snapshotted before dispatch, so a
    /// handler may register further handlers without deadlocking; those
    /// see the next emit.
    pub fn emit(&self, channel: &str, payload: &Value) {
        let handlers: Vec<Handler> = {
            let channels = self
                .channels
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            channels.get(channel).cloned().unwrap_or_default()
        };
        tracing::debug!(channel, listeners = handlers.len(), "broadcast");
        for handler in handlers {
            handler(payload);
        }
    }

    /// Number of handlers registered on a channel.
    pub fn listener_count(&self, channel: &str) -> usize {
        let channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        channels.get(channel).map(Vec::len).unwrap_or(0)
    }
}
