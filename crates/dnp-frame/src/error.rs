/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A flags word outside the 16-bit range.
    #[error("flags field value out of range ({0}, expected 0..=65535)")]
    FlagsOutOfRange(i64),

    /// A mandatory packet field was never set.
    #[error("packet missing mandatory field: {0}")]
    MissingField(&'static str),

    /// Strict decoding ran out of bytes inside a header field.
    #[error("frame truncated in field {field} ({available} of {needed} bytes)")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// Strict encoding found a value wider than its field.
    #[error("value {value:#x} does not fit field {field} ({width} bytes)")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        width: usize,
    },

    /// An I/O error surfaced through a codec adapter.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while decomposing an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The value does not fit the 48-bit address space.
    #[error("address {0:#x} could not be routed (exceeds 48 bits)")]
    NotAddressable(u64),

    /// Text that is neither an integer nor a dotted `service.component.resource` triple.
    #[error("address could not be parsed: {0}")]
    Unparseable(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
