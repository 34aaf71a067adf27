//! extkit SDK: typed handles for extensions embedded in a host application.
//!
//! An extension runs inside an iframe and talks to the hosting
//! content-management application exclusively through cross-window
//! messaging. This crate models that conversation:
//!
//! - [`Connection`]: the opaque transport capability (request/response plus
//!   a host-pushed event stream) that the embedder injects
//! - [`Extension`]: the composition root built from the host's bootstrap
//!   payload, fanning host events out over an internal [`MessageBus`]
//! - [`EntryHandle`] / [`FieldHandle`]: cached mirrors of the entry being
//!   edited, with field lookup through the path-resolution engine of
//!   `extkit-model`
//! - [`Stack`], [`Query`] and the resource builders: request shaping for
//!   content types, entries, assets, environments and locales
//! - [`StoreHandle`] / [`WindowHandle`]: host-backed persistence and iframe
//!   sizing
//!
//! All state lives in the host. This crate keeps a local cached mirror,
//! refreshed wholesale by host broadcasts, and never persists anything
//! itself.

mod bus;
mod connection;
mod entry;
mod error;
mod extension;
mod field;
mod stack;
mod store;
pub mod testing;
mod window;

pub use bus::{channel, MessageBus};
pub use connection::{unwrap_response, Connection, EventHandler, Response};
pub use entry::{ContentType, EntryHandle};
pub use error::Error;
pub use extension::{initialize, Extension, ExtensionType, InitPayload};
pub use field::FieldHandle;
pub use stack::{
    AssetResource, ContentTypeHandle, EntryResource, Query, QueryModule, Stack,
};
pub use store::StoreHandle;
pub use window::{DashboardState, ResizeObserver, WindowHandle};

// Re-export the model layer so extensions depend on one crate.
pub use extkit_model::{
    resolve, BlockSchema, DataType, FieldPath, FieldSchema, ResolveError, Resolved, SchemaNode,
    SchemaRef, Segment,
};
