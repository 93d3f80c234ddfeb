//! UDP device middleware.
//!
//! dnp decodes fixed-layout datagrams, routes them by a 48-bit
//! service/component/resource address and dispatches them to registered
//! handlers, answering each request with a short ASCII reply.
//!
//! # Crate Structure
//!
//! - [`frame`]: Flags bitfield, frame codec and address decomposition
//! - [`transport`]: UDP client and servers
//! - [`config`]: JSON service, component and resource configuration
//! - [`manager`]: Handler registry and dispatch (behind `manager` feature)

/// Re-export frame types.
pub mod frame {
    pub use dnp_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use dnp_transport::*;
}

/// Re-export configuration types.
pub mod config {
    pub use dnp_config::*;
}

/// Re-export manager types (requires `manager` feature).
#[cfg(feature = "manager")]
pub mod manager {
    pub use dnp_manager::*;
}
