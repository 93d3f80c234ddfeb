use dnp_frame::{decode_packet, route, CodecPolicy, Packet};
use serde::Serialize;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{payload_preview, print_record, OutputFormat};

#[derive(Serialize)]
struct FlagsOutput {
    word: u16,
    set: Vec<&'static str>,
}

#[derive(Serialize)]
struct DecodeOutput {
    id: u16,
    flags: FlagsOutput,
    request_address: u64,
    request_target: Option<String>,
    response_address: u64,
    data_window_start: u64,
    data_window_end: u64,
    payload_size: usize,
    payload: String,
}

impl DecodeOutput {
    fn from_packet(packet: &Packet) -> Self {
        let flags = packet.flags();
        Self {
            id: packet.id(),
            flags: FlagsOutput {
                word: flags.pack(),
                set: flags
                    .fields()
                    .into_iter()
                    .filter(|(_, value)| *value)
                    .map(|(field, _)| field.name())
                    .collect(),
            },
            request_address: packet.request_address(),
            request_target: route(packet.request_address())
                .ok()
                .map(|address| address.to_string()),
            response_address: packet.response_address(),
            data_window_start: packet.data_window_start(),
            data_window_end: packet.data_window_end(),
            payload_size: packet.payload().len(),
            payload: payload_preview(packet.payload()),
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", format!("{:#06x}", self.id)),
            ("flags", format!("{:#06x} [{}]", self.flags.word, self.flags.set.join(", "))),
            (
                "request_address",
                match &self.request_target {
                    Some(target) => format!("{:#x} ({target})", self.request_address),
                    None => format!("{:#x}", self.request_address),
                },
            ),
            ("response_address", format!("{:#x}", self.response_address)),
            ("data_window_start", format!("{:#x}", self.data_window_start)),
            ("data_window_end", format!("{:#x}", self.data_window_end)),
            ("payload_size", self.payload_size.to_string()),
            ("payload", self.payload.clone()),
        ]
    }
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;
    let policy = if args.strict {
        CodecPolicy::Strict
    } else {
        CodecPolicy::Lenient
    };
    let packet = decode_packet(&bytes, policy).map_err(|err| frame_error("decode failed", err))?;

    let out = DecodeOutput::from_packet(&packet);
    print_record(&out, &out.fields(), packet.payload(), format);
    Ok(SUCCESS)
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = body
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            DATA_INVALID,
            "hex input must have an even number of digits",
        ));
    }

    digits
        .chunks(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(high), Some(low)) => Ok((high << 4) | low),
            _ => Err(CliError::new(
                DATA_INVALID,
                format!("invalid hex digits: {}", String::from_utf8_lossy(pair)),
            )),
        })
        .collect()
}

fn hex_value(digit: u8) -> Option<u8> {
    char::from(digit).to_digit(16).map(|value| value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_ignores_prefix_and_whitespace() {
        assert_eq!(parse_hex("0xFE 02\nff00").unwrap(), vec![0xFE, 0x02, 0xFF, 0x00]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert_eq!(parse_hex("abc").unwrap_err().code, DATA_INVALID);
        assert_eq!(parse_hex("zz").unwrap_err().code, DATA_INVALID);
    }

    #[test]
    fn output_lists_set_flags() {
        let bytes = parse_hex("fe02ff00").unwrap();
        let packet = decode_packet(&bytes, CodecPolicy::Lenient).unwrap();
        let out = DecodeOutput::from_packet(&packet);

        assert_eq!(out.id, 0xFE02);
        assert_eq!(out.flags.word, 0xFF00);
        assert_eq!(out.flags.set.len(), 8);
        assert_eq!(out.request_target.as_deref(), Some("0.0.0"));
        assert_eq!(out.payload_size, 0);
    }
}
