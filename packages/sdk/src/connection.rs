//! The cross-window connection capability.
//!
//! The actual transport (message serialization, origin checks, promise
//! matching) lives outside this crate. The SDK only requires something that
//! can send a request to the parent window and await the response, and that
//! can surface host-pushed events. Embedders inject an implementation; tests
//! use [`crate::testing::ScriptedConnection`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// Response envelope for a request sent to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub data: Value,
}

/// Handler for a host-pushed event.
pub type EventHandler = Box<dyn Fn(&Value) + Send + Sync>;

/// Opaque transport to the parent window.
///
/// # Object Safety
///
/// This trait is object-safe: handles hold an `Arc<dyn Connection>`.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Send a request and await the host's response envelope.
    ///
    /// The returned future stays pending until the host answers; no timeout
    /// is enforced here. Transport failures reject with
    /// [`Error::Transport`].
    async fn send_to_parent(&self, action: &str, payload: Value) -> Result<Response, Error>;

    /// Subscribe to a host-pushed event stream. The SDK calls this exactly
    /// once, for the multiplexed `extensionEvent` channel.
    fn on(&self, event_name: &str, handler: EventHandler);
}

/// Unwrap a response envelope per the convention all resource calls share:
/// a string-shaped `data` is a domain-level failure carrying the host's
/// message; anything else is the result.
pub fn unwrap_response(response: Response) -> Result<Value, Error> {
    match response.data {
        Value::String(message) => Err(Error::Host(message)),
        data => Ok(data),
    }
}
