use dnp_frame::Address;

use crate::entity::EntityKind;
use crate::handler::HandlerError;

/// Errors that can occur while registering or dispatching handlers.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] dnp_frame::FrameError),

    /// The request address could not be decomposed.
    #[error("route error: {0}")]
    Route(#[from] dnp_frame::RouteError),

    /// Configuration error while populating the registry.
    #[error("config error: {0}")]
    Config(#[from] dnp_config::ConfigError),

    /// Entity kind name outside service, component, resource.
    #[error("entity not supported: {0}")]
    UnsupportedEntity(String),

    /// A handler was referenced by a name nothing provides.
    #[error("invalid handler: {0}")]
    InvalidHandler(String),

    /// The request address selects no entity.
    #[error("address {0} selects no target")]
    NoTarget(Address),

    /// Nothing is registered for the selected entity.
    #[error("no handler registered for {kind} {id}")]
    HandlerNotFound { kind: EntityKind, id: u16 },

    /// The handler ran and reported an error.
    #[error("handler for {kind} {id} failed: {source}")]
    HandlerFailed {
        kind: EntityKind,
        id: u16,
        #[source]
        source: HandlerError,
    },
}

pub type Result<T> = std::result::Result<T, ManagerError>;
