//! Property tests for the flags bitfield and the frame codec.

use dnp_frame::{
    decode_packet, parse_fields, route, Address, CodecPolicy, Flags, Packet, HEADER_SIZE,
    MAX_ADDRESS,
};
use proptest::prelude::*;

fn arb_flags() -> impl Strategy<Value = Flags> {
    any::<u16>().prop_map(Flags::unpack)
}

fn arb_packet() -> impl Strategy<Value = Packet> {
    (
        any::<u16>(),
        arb_flags(),
        0..=MAX_ADDRESS,
        0..=MAX_ADDRESS,
        0..=MAX_ADDRESS,
        0..=MAX_ADDRESS,
        proptest::collection::vec(any::<u8>(), 0..256),
    )
        .prop_map(|(id, flags, request, response, start, end, payload)| {
            Packet::builder()
                .id(id)
                .flags(flags)
                .request_address(request)
                .response_address(response)
                .data_window(start, end)
                .payload(payload)
                .build()
                .expect("id and flags are always set")
        })
}

proptest! {
    /// Reserved low bits are dropped, the eight semantic bits survive.
    #[test]
    fn flags_pack_unpack_masks_reserved_bits(word in any::<u16>()) {
        prop_assert_eq!(Flags::unpack(word).pack(), word & 0xFF00);
    }

    #[test]
    fn frame_roundtrip_preserves_every_field(packet in arb_packet()) {
        let wire = packet.pack_with(CodecPolicy::Strict).expect("in-range packet encodes strictly");
        prop_assert_eq!(wire.len(), HEADER_SIZE + packet.payload().len());
        let decoded = decode_packet(&wire, CodecPolicy::Strict).expect("full frame decodes strictly");
        prop_assert_eq!(decoded, packet);
    }

    /// Lenient decode of any prefix never fails and reads missing bytes as zero.
    #[test]
    fn lenient_decode_of_short_buffer_never_fails(
        bytes in proptest::collection::vec(any::<u8>(), 0..HEADER_SIZE),
    ) {
        let fields = parse_fields(&bytes, CodecPolicy::Lenient).expect("lenient decode is total");
        prop_assert!(fields.payload.is_empty());

        let mut padded = bytes.clone();
        padded.resize(HEADER_SIZE, 0);
        let reference = parse_fields(&padded, CodecPolicy::Lenient).expect("lenient decode is total");
        prop_assert_eq!(fields, reference);
    }

    #[test]
    fn address_decomposition_recomposes(raw in 0..=MAX_ADDRESS) {
        let address = route(raw).expect("48-bit values route");
        prop_assert_eq!(address.to_raw(), raw);
        prop_assert_eq!(
            address,
            Address::new((raw >> 32) as u16, (raw >> 16) as u16, raw as u16)
        );
    }
}
