use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_packet, encode_packet, CodecPolicy};
use crate::error::{FrameError, Result};
use crate::packet::Packet;

/// Datagram codec for use with `tokio_util::udp::UdpFramed` and friends.
///
/// Each buffer handed to [`Decoder::decode`] is treated as one complete datagram.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketCodec {
    policy: CodecPolicy,
}

impl PacketCodec {
    pub fn new(policy: CodecPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CodecPolicy {
        self.policy
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>> {
        if src.is_empty() {
            return Ok(None);
        }
        let datagram = src.split();
        decode_packet(&datagram, self.policy).map(Some)
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        encode_packet(&item, self.policy, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::Flags;

    #[test]
    fn decode_consumes_whole_datagram() {
        let packet = Packet::builder()
            .id(3)
            .flags(Flags::response())
            .payload(&b"tail"[..])
            .build()
            .unwrap();
        let mut codec = PacketCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(packet.clone(), &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, packet);
        assert!(buf.is_empty());
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn strict_codec_rejects_truncated_datagram() {
        let mut codec = PacketCodec::new(CodecPolicy::Strict);
        let mut buf = BytesMut::from(&[1u8, 2, 3][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(FrameError::Truncated { field: "flags", .. })
        ));
    }
}
