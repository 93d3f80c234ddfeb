//! Fixed-layout frame codec for the dnp middleware.
//!
//! Every datagram carries exactly one frame:
//! - a 2-byte packet id
//! - a 2-byte flags word (8 semantic bits, low byte reserved)
//! - four 6-byte big-endian addresses (request, response, window start, window end)
//! - an opaque payload running to the end of the datagram
//!
//! There is no length prefix. The datagram boundary is the frame boundary.

pub mod address;
pub mod codec;
pub mod error;
pub mod flags;
pub mod packet;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use address::{route, Address, ADDRESS_BITS, MAX_ADDRESS};
pub use codec::{
    decode_packet, encode_packet, parse_fields, CodecPolicy, Field, PacketFields, HEADER_SIZE,
    TEMPLATE,
};
pub use error::{FrameError, Result, RouteError};
pub use flags::{FlagField, Flags};
pub use packet::{Packet, PacketBuilder};

#[cfg(feature = "async")]
pub use tokio_codec::PacketCodec;
