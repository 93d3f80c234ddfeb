use bytes::{Bytes, BytesMut};

use crate::address::{route, Address};
use crate::codec::{encode_packet, write_packet, CodecPolicy, Field, PacketFields, HEADER_SIZE};
use crate::error::{FrameError, Result, RouteError};
use crate::flags::Flags;

/// One decoded (or to-be-encoded) frame.
///
/// Fields are set only at construction; use [`Packet::builder`] to assemble one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    id: u16,
    flags: Flags,
    request_address: u64,
    response_address: u64,
    data_window_start: u64,
    data_window_end: u64,
    payload: Bytes,
}

impl Packet {
    /// Create a packet carrying only the mandatory fields.
    pub fn new(id: u16, flags: Flags) -> Self {
        Self {
            id,
            flags,
            request_address: 0,
            response_address: 0,
            data_window_start: 0,
            data_window_end: 0,
            payload: Bytes::new(),
        }
    }

    pub fn builder() -> PacketBuilder {
        PacketBuilder::default()
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn request_address(&self) -> u64 {
        self.request_address
    }

    pub fn response_address(&self) -> u64 {
        self.response_address
    }

    pub fn data_window_start(&self) -> u64 {
        self.data_window_start
    }

    pub fn data_window_end(&self) -> u64 {
        self.data_window_end
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Decompose the request address into its routing levels.
    pub fn request_target(&self) -> std::result::Result<Address, RouteError> {
        route(self.request_address)
    }

    /// The total wire size of this packet (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode with the lenient policy; oversized values are truncated to field width.
    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        write_packet(self, &mut buf);
        buf.freeze()
    }

    /// Encode under an explicit policy.
    pub fn pack_with(&self, policy: CodecPolicy) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_packet(self, policy, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Integer value of a fixed-width header field.
    pub(crate) fn field_value(&self, field: Field) -> u64 {
        match field {
            Field::Id => u64::from(self.id),
            Field::Flags => u64::from(self.flags.pack()),
            Field::RequestAddress => self.request_address,
            Field::ResponseAddress => self.response_address,
            Field::DataWindowStart => self.data_window_start,
            Field::DataWindowEnd => self.data_window_end,
            Field::Payload => 0,
        }
    }
}

impl TryFrom<PacketFields> for Packet {
    type Error = FrameError;

    fn try_from(fields: PacketFields) -> Result<Self> {
        let id = u16::try_from(fields.id).map_err(|_| FrameError::FieldOverflow {
            field: Field::Id.name(),
            value: fields.id,
            width: 2,
        })?;
        let flags = Flags::try_unpack(i64::try_from(fields.flags).unwrap_or(i64::MAX))?;

        Ok(Self {
            id,
            flags,
            request_address: fields.request_address,
            response_address: fields.response_address,
            data_window_start: fields.data_window_start,
            data_window_end: fields.data_window_end,
            payload: fields.payload,
        })
    }
}

/// Assembles a [`Packet`]; `id` and `flags` are mandatory.
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder {
    id: Option<u16>,
    flags: Option<Flags>,
    request_address: Option<u64>,
    response_address: Option<u64>,
    data_window_start: Option<u64>,
    data_window_end: Option<u64>,
    payload: Option<Bytes>,
}

impl PacketBuilder {
    pub fn id(mut self, id: u16) -> Self {
        self.id = Some(id);
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn request_address(mut self, address: impl Into<u64>) -> Self {
        self.request_address = Some(address.into());
        self
    }

    pub fn response_address(mut self, address: impl Into<u64>) -> Self {
        self.response_address = Some(address.into());
        self
    }

    pub fn data_window(mut self, start: u64, end: u64) -> Self {
        self.data_window_start = Some(start);
        self.data_window_end = Some(end);
        self
    }

    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn build(self) -> Result<Packet> {
        let id = self.id.ok_or(FrameError::MissingField("id"))?;
        let flags = self.flags.ok_or(FrameError::MissingField("flags"))?;
        Ok(Packet {
            id,
            flags,
            request_address: self.request_address.unwrap_or_default(),
            response_address: self.response_address.unwrap_or_default(),
            data_window_start: self.data_window_start.unwrap_or_default(),
            data_window_end: self.data_window_end.unwrap_or_default(),
            payload: self.payload.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_id() {
        let result = Packet::builder().flags(Flags::request()).build();
        assert!(matches!(result, Err(FrameError::MissingField("id"))));
    }

    #[test]
    fn builder_requires_flags() {
        let result = Packet::builder().id(7).build();
        assert!(matches!(result, Err(FrameError::MissingField("flags"))));
    }

    #[test]
    fn optional_fields_default_to_zero() {
        let packet = Packet::builder()
            .id(30_000)
            .flags(Flags::request())
            .build()
            .unwrap();
        assert_eq!(packet, Packet::new(30_000, Flags::request()));
        assert_eq!(packet.request_address(), 0);
        assert!(packet.payload().is_empty());
        assert_eq!(packet.wire_size(), HEADER_SIZE);
    }

    #[test]
    fn request_target_decomposes_address() {
        let packet = Packet::builder()
            .id(1)
            .flags(Flags::request())
            .request_address(Address::new(5, 7, 9))
            .build()
            .unwrap();
        assert_eq!(packet.request_target().unwrap(), Address::new(5, 7, 9));
    }

    #[test]
    fn hydrate_rejects_flags_out_of_range() {
        let fields = PacketFields {
            flags: 1 << 16,
            ..PacketFields::default()
        };
        assert!(matches!(
            Packet::try_from(fields),
            Err(FrameError::FlagsOutOfRange(65_536))
        ));
    }

    #[test]
    fn hydrate_copies_every_field() {
        let fields = PacketFields {
            id: 0xFE02,
            flags: 0xFF00,
            request_address: 1,
            response_address: 2,
            data_window_start: 3,
            data_window_end: 4,
            payload: Bytes::from_static(b"abc"),
        };
        let packet = Packet::try_from(fields).unwrap();
        assert_eq!(packet.id(), 0xFE02);
        assert_eq!(packet.flags().pack(), 0xFF00);
        assert_eq!(packet.response_address(), 2);
        assert_eq!(packet.data_window_end(), 4);
        assert_eq!(packet.payload().as_ref(), b"abc");
    }
}
