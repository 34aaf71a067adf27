//! Iframe sizing and dashboard-widget window state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{json, Value};

use crate::bus::{channel, MessageBus};
use crate::extension::ExtensionType;
use crate::{Connection, Error};

/// Layout state of a dashboard widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    HalfWidth,
    FullWidth,
}

impl DashboardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardState::HalfWidth => "half_width",
            DashboardState::FullWidth => "full_width",
        }
    }

    pub(crate) fn from_wire(s: &str) -> Option<Self> {
        match s {
            "half_width" => Some(DashboardState::HalfWidth),
            "full_width" => Some(DashboardState::FullWidth),
            _ => None,
        }
    }
}

/// Injected capability that reports content-height changes.
///
/// The platform's actual mechanism (DOM mutation observation, layout
/// polling) stays outside this crate; the SDK only needs a stream of
/// observed heights between `start` and `stop`.
pub trait ResizeObserver: Send + Sync {
    fn start(&self, callback: Box<dyn Fn(u64) + Send + Sync>);
    fn stop(&self);
}

/// Sizing control for the extension's iframe.
///
/// Height updates are deduplicated: re-sending the current height is a
/// no-op. Dashboard widgets in the half-width state never resize.
pub struct WindowHandle {
    connection: Arc<dyn Connection>,
    extension_type: ExtensionType,
    state: Arc<Mutex<DashboardState>>,
    height: Arc<Mutex<Option<u64>>>,
    auto_resizing: AtomicBool,
    observer: Option<Arc<dyn ResizeObserver>>,
    bus: Arc<MessageBus>,
}

impl WindowHandle {
    pub(crate) fn new(
        connection: Arc<dyn Connection>,
        extension_type: ExtensionType,
        state: DashboardState,
        observer: Option<Arc<dyn ResizeObserver>>,
        bus: Arc<MessageBus>,
    ) -> Self {
        Self {
            connection,
            extension_type,
            state: Arc::new(Mutex::new(state)),
            height: Arc::new(Mutex::new(None)),
            auto_resizing: AtomicBool::new(false),
            observer,
            bus,
        }
    }

    /// The current dashboard layout state, tracked from resize broadcasts.
    pub fn state(&self) -> DashboardState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show the host's resize control for this widget. Only meaningful for
    /// dashboard widgets; a no-op elsewhere.
    pub async fn enable_resizing(&self) -> Result<(), Error> {
        if self.extension_type != ExtensionType::Dashboard {
            return Ok(());
        }
        self.connection
            .send_to_parent("window", json!({ "action": "enableResizing" }))
            .await?;
        Ok(())
    }

    /// Run the callback whenever the host maximizes or minimizes this
    /// dashboard widget. Returns `false` (without registering) for
    /// non-dashboard extensions. The tracked state is updated before the
    /// callback runs.
    pub fn on_dashboard_resize(
        &self,
        callback: impl Fn(DashboardState) + Send + Sync + 'static,
    ) -> bool {
        if self.extension_type != ExtensionType::Dashboard {
            return false;
        }
        let state = Arc::clone(&self.state);
        self.bus.on(channel::DASHBOARD_RESIZE, move |payload| {
            let new_state = payload
                .get("state")
                .and_then(Value::as_str)
                .and_then(DashboardState::from_wire);
            if let Some(new_state) = new_state {
                *state.lock().unwrap_or_else(PoisonError::into_inner) = new_state;
                callback(new_state);
            } else {
                tracing::warn!(?payload, "unrecognized dashboard resize payload");
            }
        });
        true
    }

    /// Set the iframe height. Re-sending the last sent height is a no-op,
    /// as is any update while a dashboard widget is in half-width state.
    pub async fn update_height(&self, height: u64) -> Result<(), Error> {
        if self.extension_type == ExtensionType::Dashboard
            && self.state() == DashboardState::HalfWidth
        {
            return Ok(());
        }
        {
            let mut last = self.height.lock().unwrap_or_else(PoisonError::into_inner);
            if *last == Some(height) {
                return Ok(());
            }
            *last = Some(height);
        }
        self.connection.send_to_parent("resize", json!(height)).await?;
        Ok(())
    }

    /// Start forwarding observed content heights to the host.
    ///
    /// Idempotent; a second call while enabled does nothing. Fails when no
    /// resize observer was injected at initialization.
    pub fn enable_auto_resizing(&self) -> Result<(), Error> {
        if self.auto_resizing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if self.extension_type == ExtensionType::Dashboard
            && self.state() == DashboardState::HalfWidth
        {
            self.auto_resizing.store(false, Ordering::SeqCst);
            return Ok(());
        }
        let observer = match &self.observer {
            Some(observer) => Arc::clone(observer),
            None => {
                self.auto_resizing.store(false, Ordering::SeqCst);
                return Err(Error::invalid_argument(
                    "auto resizing requires a resize observer",
                ));
            }
        };

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        observer.start(Box::new(move |height| {
            let _ = tx.send(height);
        }));

        let connection = Arc::clone(&self.connection);
        let last = Arc::clone(&self.height);
        tokio::spawn(async move {
            while let Some(height) = rx.recv().await {
                let changed = {
                    let mut guard = last.lock().unwrap_or_else(PoisonError::into_inner);
                    if *guard == Some(height) {
                        false
                    } else {
                        *guard = Some(height);
                        true
                    }
                };
                if changed {
                    if let Err(error) = connection.send_to_parent("resize", json!(height)).await {
                        tracing::warn!(%error, height, "resize request failed");
                    }
                }
            }
        });
        Ok(())
    }

    /// Stop forwarding observed heights. Idempotent.
    pub fn disable_auto_resizing(&self) {
        if !self.auto_resizing.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(observer) = &self.observer {
            observer.stop();
        }
    }
}
