//! Composition root for an extension instance.
//!
//! One `Extension` is built from the host's bootstrap payload. It owns the
//! internal [`MessageBus`], registers the single multiplexed event
//! subscription on the connection, and hands out the entry/field/stack/
//! store/window handles.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use extkit_model::{FieldPath, FieldSchema, SchemaNode};

use crate::bus::{channel, MessageBus};
use crate::entry::{ContentType, EntryHandle};
use crate::field::FieldHandle;
use crate::stack::Stack;
use crate::store::StoreHandle;
use crate::window::{DashboardState, ResizeObserver, WindowHandle};
use crate::{Connection, Error};

/// What kind of extension the host mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    /// Custom field: rendered in place of one field's input.
    Field,
    /// Sidebar widget next to the entry editor.
    Widget,
    /// Dashboard widget.
    Dashboard,
}

impl ExtensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionType::Field => "FIELD",
            ExtensionType::Widget => "WIDGET",
            ExtensionType::Dashboard => "DASHBOARD",
        }
    }

    /// Missing or unrecognized types default to `FIELD`, the host's own
    /// default.
    fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("WIDGET") => ExtensionType::Widget,
            Some("DASHBOARD") => ExtensionType::Dashboard,
            _ => ExtensionType::Field,
        }
    }
}

/// The bootstrap payload the host answers `init` with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitPayload {
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub user: Value,
    #[serde(default, rename = "type")]
    pub extension_type: Option<String>,
    #[serde(default)]
    pub field_config: Value,
    /// Field extensions only: the uid of the field the extension replaces.
    #[serde(default)]
    pub uid: Option<String>,
    /// Field extensions only: that field's schema.
    #[serde(default)]
    pub schema: Option<SchemaNode>,
    /// Field extensions only: that field's current value.
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub entry: Value,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub stack: Value,
    #[serde(default)]
    pub dashboard_width: Option<String>,
}

/// Perform the `init` handshake and deserialize the bootstrap payload.
pub async fn initialize(
    connection: &dyn Connection,
    version: Option<&str>,
) -> Result<InitPayload, Error> {
    let payload = match version {
        Some(version) => json!({ "version": version }),
        None => json!({}),
    };
    let response = connection.send_to_parent("init", payload).await?;
    serde_json::from_value(response.data).map_err(|source| Error::Malformed {
        message: source.to_string(),
    })
}

/// A fully constructed extension instance.
pub struct Extension {
    config: Value,
    current_user: Value,
    extension_type: ExtensionType,
    field_config: Value,
    entry: EntryHandle,
    field: Option<FieldHandle>,
    stack: Stack,
    store: StoreHandle,
    window: WindowHandle,
    connection: Arc<dyn Connection>,
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("extension_type", &self.extension_type)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Extension {
    /// Build the handle family from a bootstrap payload.
    ///
    /// Registers the `extensionEvent` subscription on the connection; every
    /// later host push is demultiplexed onto the internal bus. For FIELD
    /// extensions the payload must carry the self field's uid and schema.
    pub fn new(
        init: InitPayload,
        connection: Arc<dyn Connection>,
        observer: Option<Arc<dyn ResizeObserver>>,
    ) -> Result<Self, Error> {
        let bus = Arc::new(MessageBus::new());
        let extension_type = ExtensionType::from_wire(init.extension_type.as_deref());
        let content_type = Arc::new(init.content_type);

        let entry = EntryHandle::new(
            Arc::clone(&content_type),
            init.entry,
            init.locale,
            Arc::clone(&connection),
            Arc::clone(&bus),
        );

        let field = if extension_type == ExtensionType::Field {
            let uid = init.uid.ok_or_else(|| Error::Malformed {
                message: "field extension bootstrap without a field uid".to_string(),
            })?;
            let schema = init.schema.ok_or_else(|| Error::Malformed {
                message: "field extension bootstrap without a field schema".to_string(),
            })?;
            Some(FieldHandle::new(
                FieldPath::parse(&uid)?,
                FieldSchema::Node(schema),
                init.value,
                Arc::clone(&content_type),
                Arc::clone(&connection),
                Arc::clone(&bus),
                true,
            ))
        } else {
            None
        };

        let state = init
            .dashboard_width
            .as_deref()
            .and_then(DashboardState::from_wire)
            .unwrap_or(DashboardState::HalfWidth);
        let window = WindowHandle::new(
            Arc::clone(&connection),
            extension_type,
            state,
            observer,
            Arc::clone(&bus),
        );

        let stack = Stack::new(init.stack, Arc::clone(&connection));
        let store = StoreHandle::new(Arc::clone(&connection));

        let demux_bus = Arc::clone(&bus);
        connection.on(
            "extensionEvent",
            Box::new(move |event| {
                let name = event.get("name").and_then(Value::as_str);
                let data = event.get("data").cloned().unwrap_or(Value::Null);
                match name {
                    Some(channel::ENTRY_SAVE) => {
                        demux_bus.emit(channel::ENTRY_SAVE, &data);
                        // A save is also a full-entry data push.
                        demux_bus.emit(channel::UPDATE_FIELDS, &data);
                    }
                    Some(
                        name @ (channel::ENTRY_CHANGE
                        | channel::ENTRY_PUBLISH
                        | channel::ENTRY_UNPUBLISH
                        | channel::DASHBOARD_RESIZE
                        | channel::EXTENSION_FIELD_CHANGE
                        | channel::UPDATE_FIELDS),
                    ) => demux_bus.emit(name, &data),
                    Some(other) => {
                        tracing::debug!(event = other, "ignoring unrecognized host event");
                    }
                    None => tracing::warn!("host event without a name"),
                }
            }),
        );

        Ok(Self {
            config: init.config,
            current_user: init.user,
            extension_type,
            field_config: init.field_config,
            entry,
            field,
            stack,
            store,
            window,
            connection,
        })
    }

    /// Tell the host the extension has rendered and is ready for traffic.
    pub async fn set_ready(&self) -> Result<(), Error> {
        self.connection.send_to_parent("ready", Value::Null).await?;
        Ok(())
    }

    /// The extension's configuration parameters.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// The signed-in user, roles included.
    pub fn current_user(&self) -> &Value {
        &self.current_user
    }

    pub fn extension_type(&self) -> ExtensionType {
        self.extension_type
    }

    /// Instance-specific configuration of a field extension.
    pub fn field_config(&self) -> &Value {
        &self.field_config
    }

    pub fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    /// The field this extension replaces. `None` outside FIELD extensions.
    pub fn field(&self) -> Option<&FieldHandle> {
        self.field.as_ref()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn window(&self) -> &WindowHandle {
        &self.window
    }
}
