use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::packet::Packet;

/// Fixed header: id (2) + flags (2) + four 6-byte addresses = 28 bytes.
pub const HEADER_SIZE: usize = 28;

/// One slot of the frame template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Flags,
    RequestAddress,
    ResponseAddress,
    DataWindowStart,
    DataWindowEnd,
    Payload,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Flags => "flags",
            Field::RequestAddress => "request_address",
            Field::ResponseAddress => "response_address",
            Field::DataWindowStart => "data_window_start",
            Field::DataWindowEnd => "data_window_end",
            Field::Payload => "payload",
        }
    }

    /// Byte width of the field; `None` means "the rest of the datagram".
    pub fn width(self) -> Option<usize> {
        match self {
            Field::Id | Field::Flags => Some(2),
            Field::RequestAddress
            | Field::ResponseAddress
            | Field::DataWindowStart
            | Field::DataWindowEnd => Some(6),
            Field::Payload => None,
        }
    }
}

/// Wire order of the frame fields.
///
/// ```text
/// ┌────────┬────────┬──────────┬──────────┬──────────┬──────────┬───────────────┐
/// │ id     │ flags  │ request  │ response │ window   │ window   │ payload       │
/// │ (2B BE)│ (2B BE)│ (6B BE)  │ (6B BE)  │ start 6B │ end 6B   │ (rest)        │
/// └────────┴────────┴──────────┴──────────┴──────────┴──────────┴───────────────┘
/// ```
pub const TEMPLATE: [Field; 7] = [
    Field::Id,
    Field::Flags,
    Field::RequestAddress,
    Field::ResponseAddress,
    Field::DataWindowStart,
    Field::DataWindowEnd,
    Field::Payload,
];

/// How the codec treats input that does not fit the template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodecPolicy {
    /// Missing header bytes decode as zero; oversized values are truncated to field width.
    #[default]
    Lenient,
    /// Short headers and oversized values are errors.
    Strict,
}

/// Raw integer fields collected by [`parse_fields`], before hydration into a [`Packet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketFields {
    pub id: u64,
    pub flags: u64,
    pub request_address: u64,
    pub response_address: u64,
    pub data_window_start: u64,
    pub data_window_end: u64,
    pub payload: Bytes,
}

impl PacketFields {
    fn set_integer(&mut self, field: Field, value: u64) {
        let slot = match field {
            Field::Id => &mut self.id,
            Field::Flags => &mut self.flags,
            Field::RequestAddress => &mut self.request_address,
            Field::ResponseAddress => &mut self.response_address,
            Field::DataWindowStart => &mut self.data_window_start,
            Field::DataWindowEnd => &mut self.data_window_end,
            Field::Payload => return,
        };
        *slot = value;
    }
}

/// Walk the template over a datagram and collect the raw field values.
///
/// Under [`CodecPolicy::Lenient`] this never fails: bytes missing from a short
/// buffer are read as zero, and the payload is whatever remains (possibly nothing).
pub fn parse_fields(src: &[u8], policy: CodecPolicy) -> Result<PacketFields> {
    let mut fields = PacketFields::default();
    let mut offset = 0usize;

    for field in TEMPLATE {
        let Some(width) = field.width() else {
            let rest = src.get(offset..).unwrap_or_default();
            fields.payload = Bytes::copy_from_slice(rest);
            break;
        };

        let available = src.len().saturating_sub(offset).min(width);
        if available < width {
            if policy == CodecPolicy::Strict {
                return Err(FrameError::Truncated {
                    field: field.name(),
                    needed: width,
                    available,
                });
            }
            trace!(
                field = field.name(),
                needed = width,
                available,
                "zero-padding short frame field"
            );
        }

        let value = (0..width).fold(0u64, |acc, index| {
            let byte = src.get(offset + index).copied().unwrap_or(0);
            (acc << 8) | u64::from(byte)
        });
        fields.set_integer(field, value);
        offset += width;
    }

    Ok(fields)
}

/// Decode one datagram into a [`Packet`].
pub fn decode_packet(src: &[u8], policy: CodecPolicy) -> Result<Packet> {
    let fields = parse_fields(src, policy)?;
    Packet::try_from(fields)
}

/// Encode a packet into the wire format.
///
/// The payload is appended verbatim after the header, with no length prefix.
pub fn encode_packet(packet: &Packet, policy: CodecPolicy, dst: &mut BytesMut) -> Result<()> {
    if policy == CodecPolicy::Strict {
        check_field_widths(packet)?;
    }
    write_packet(packet, dst);
    Ok(())
}

/// Lenient encoding; values wider than their field keep only their low bytes.
pub(crate) fn write_packet(packet: &Packet, dst: &mut BytesMut) {
    dst.reserve(packet.wire_size());
    for field in TEMPLATE {
        match field.width() {
            Some(width) => put_be(dst, packet.field_value(field), width),
            None => dst.put_slice(packet.payload()),
        }
    }
}

fn check_field_widths(packet: &Packet) -> Result<()> {
    for field in TEMPLATE {
        let Some(width) = field.width() else {
            continue;
        };
        let value = packet.field_value(field);
        if value >> (width * 8) != 0 {
            return Err(FrameError::FieldOverflow {
                field: field.name(),
                value,
                width,
            });
        }
    }
    Ok(())
}

fn put_be(dst: &mut BytesMut, value: u64, width: usize) {
    for index in (0..width).rev() {
        dst.put_u8((value >> (index * 8)) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::flags::{FlagField, Flags};

    fn sample() -> Packet {
        Packet::builder()
            .id(0x1234)
            .flags(Flags::request().with(FlagField::ResponseRequired, true))
            .request_address(Address::new(1, 2, 3))
            .response_address(0x0000_0A0B_0C0Du64)
            .data_window(16, 32)
            .payload(&b"hello"[..])
            .build()
            .unwrap()
    }

    #[test]
    fn template_widths_sum_to_header_size() {
        let total: usize = TEMPLATE.iter().filter_map(|field| field.width()).sum();
        assert_eq!(total, HEADER_SIZE);
    }

    #[test]
    fn encode_layout_is_big_endian() {
        let wire = sample().pack();
        assert_eq!(wire.len(), HEADER_SIZE + 5);
        assert_eq!(&wire[0..2], &[0x12, 0x34]);
        assert_eq!(&wire[2..4], &[0x08, 0x00]);
        assert_eq!(&wire[4..10], &[0, 1, 0, 2, 0, 3]);
        assert_eq!(&wire[10..16], &[0, 0, 0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(&wire[16..22], &[0, 0, 0, 0, 0, 16]);
        assert_eq!(&wire[22..28], &[0, 0, 0, 0, 0, 32]);
        assert_eq!(&wire[28..], b"hello");
    }

    #[test]
    fn encode_decode_roundtrip() {
        let packet = sample();
        let decoded = decode_packet(&packet.pack(), CodecPolicy::Strict).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn decode_reference_datagram() {
        let data = [
            254, 2, 255, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2,
            2, 8, 9, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9,
        ];
        let fields = parse_fields(&data, CodecPolicy::Lenient).unwrap();
        assert_eq!(fields.id, 0xFE02);
        assert_eq!(fields.flags, 0xFF00);
        assert_eq!(fields.request_address, 0);
        assert_eq!(fields.response_address, 0x0202_0202_0202);
        assert_eq!(fields.data_window_start, 0);
        assert_eq!(fields.data_window_end, 0x0202_0202_0202);
        assert_eq!(fields.payload.as_ref(), &[8, 9, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

        let packet = Packet::try_from(fields).unwrap();
        assert_eq!(packet.pack().as_ref(), &data[..]);
    }

    #[test]
    fn lenient_decode_zero_pads_short_buffer() {
        let fields = parse_fields(&[0xAB, 0xCD, 0x80], CodecPolicy::Lenient).unwrap();
        assert_eq!(fields.id, 0xABCD);
        assert_eq!(fields.flags, 0x8000);
        assert_eq!(fields.request_address, 0);
        assert!(fields.payload.is_empty());
    }

    #[test]
    fn lenient_decode_empty_buffer() {
        let packet = decode_packet(&[], CodecPolicy::Lenient).unwrap();
        assert_eq!(packet, Packet::new(0, Flags::default()));
    }

    #[test]
    fn header_only_buffer_has_empty_payload() {
        let wire = Packet::new(9, Flags::response()).pack();
        let packet = decode_packet(&wire, CodecPolicy::Lenient).unwrap();
        assert!(packet.payload().is_empty());
    }

    #[test]
    fn strict_decode_rejects_short_buffer() {
        let result = parse_fields(&[0; 12], CodecPolicy::Strict);
        assert!(matches!(
            result,
            Err(FrameError::Truncated {
                field: "response_address",
                needed: 6,
                available: 2
            })
        ));
    }

    #[test]
    fn reserved_flag_bits_do_not_survive_roundtrip() {
        let mut wire = Packet::new(1, Flags::default()).pack().to_vec();
        wire[3] = 0xFF;
        let packet = decode_packet(&wire, CodecPolicy::Lenient).unwrap();
        assert_eq!(packet.pack()[3], 0);
    }

    #[test]
    fn lenient_encode_truncates_oversized_address() {
        let packet = Packet::builder()
            .id(1)
            .flags(Flags::default())
            .request_address(0xFFFF_0001_0002_0003u64)
            .build()
            .unwrap();
        let wire = packet.pack();
        assert_eq!(&wire[4..10], &[0, 1, 0, 2, 0, 3]);
    }

    #[test]
    fn strict_encode_rejects_oversized_address() {
        let packet = Packet::builder()
            .id(1)
            .flags(Flags::default())
            .data_window(1 << 48, 0)
            .build()
            .unwrap();
        let mut buf = BytesMut::new();
        let result = encode_packet(&packet, CodecPolicy::Strict, &mut buf);
        assert!(matches!(
            result,
            Err(FrameError::FieldOverflow {
                field: "data_window_start",
                width: 6,
                ..
            })
        ));
        assert!(buf.is_empty());
    }
}
