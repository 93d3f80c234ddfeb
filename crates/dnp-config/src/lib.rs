//! JSON-backed configuration for services, components and resources.
//!
//! Configuration is persisted as JSON documents keyed by numeric id. The
//! middleware core only reads it at startup to populate its handler registry.

pub mod document;
pub mod error;
pub mod format;
pub mod rows;
pub mod service;

pub use document::{ConfigDocument, PathSegment};
pub use error::{ConfigError, Result};
pub use format::ConfigFormat;
pub use rows::{ComponentRow, ResourceRow, Row, RowKind, MAX_TEXT_LEN};
pub use service::{EntityEntry, ServiceConfiguration};
