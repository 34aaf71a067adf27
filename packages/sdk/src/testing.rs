//! Scripted [`Connection`] for tests.
//!
//! Records every outbound request and replays queued responses, so tests
//! can assert exact wire shapes without a host window. Used throughout this
//! crate's own tests and exported for extension authors to test against.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{Connection, Error, EventHandler, Response};

/// In-memory connection with a scripted response queue.
///
/// Each `send_to_parent` pops the next queued response; an empty queue
/// answers with a `Null` data envelope, which suits calls whose result is
/// discarded.
#[derive(Default)]
pub struct ScriptedConnection {
    sent: Mutex<Vec<(String, Value)>>,
    responses: Mutex<VecDeque<Result<Value, String>>>,
    handlers: Mutex<HashMap<String, Vec<EventHandler>>>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response envelope with the given `data`.
    pub fn push_response(&self, data: Value) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(data));
    }

    /// Queue a transport failure.
    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(message.to_string()));
    }

    /// Every request sent so far, in order.
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request, if any.
    pub fn last_sent(&self) -> Option<(String, Value)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Deliver a raw host-pushed event to its subscribers.
    pub fn dispatch(&self, event_name: &str, payload: &Value) {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = handlers.get(event_name) {
            for handler in list {
                handler(payload);
            }
        }
    }

    /// Deliver a named extension event the way the host does: wrapped in
    /// the multiplexed `extensionEvent` envelope.
    pub fn dispatch_event(&self, name: &str, data: Value) {
        self.dispatch("extensionEvent", &json!({ "name": name, "data": data }));
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send_to_parent(&self, action: &str, payload: Value) -> Result<Response, Error> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((action.to_string(), payload));
        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(data)) => Ok(Response { data }),
            Some(Err(message)) => Err(Error::Transport { message }),
            None => Ok(Response { data: Value::Null }),
        }
    }

    fn on(&self, event_name: &str, handler: EventHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_name.to_string())
            .or_default()
            .push(handler);
    }
}
