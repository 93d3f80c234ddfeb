//! Handler registry and dispatch for the dnp middleware.
//!
//! A [`Manager`] turns one inbound datagram into one handler invocation and
//! one raw ASCII reply. Handlers are keyed by entity kind and 16-bit id,
//! selected from the frame's request address.

pub mod entity;
pub mod error;
pub mod handler;
pub mod manager;
pub mod populate;
pub mod registry;

pub use entity::EntityKind;
pub use error::{ManagerError, Result};
pub use handler::{Handle, Handler, HandlerCatalog, HandlerError, HandlerResult};
pub use manager::{
    reply_confirms_success, select_target, Manager, ManagerConfig, Outcome, Target,
    FAILURE_REPLY, NOT_FOUND_REPLY, SERVER_ERROR_REPLY, SUCCESS_REPLY,
};
pub use populate::populate;
pub use registry::HandlerRegistry;
