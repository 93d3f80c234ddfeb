use std::fs;
use std::time::Duration;

use dnp_frame::{Address, Flags, Packet};
use dnp_manager::SUCCESS_REPLY;
use dnp_transport::{ClientConfig, Endpoint, UdpClient};
use serde::Serialize;

use crate::cmd::{parse_integer, SendArgs};
use crate::exit::{
    frame_error, io_error, route_error, transport_error, CliError, CliResult, FAILURE, SUCCESS,
    USAGE,
};
use crate::output::{payload_preview, print_record, OutputFormat};

#[derive(Serialize)]
struct SendOutput {
    endpoint: String,
    address: String,
    id: u16,
    sent: usize,
    reply: String,
    reply_size: usize,
    success: bool,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let endpoint = Endpoint::new(&args.host, args.port)
        .map_err(|err| transport_error("invalid destination", err))?;
    let address: Address = args
        .address
        .parse()
        .map_err(|err| route_error("invalid --address", err))?;
    let flags = resolve_flags(args.flags.as_deref())?;
    let timeout = parse_duration(&args.timeout)?;

    let packet = Packet::builder()
        .id(args.id)
        .flags(flags)
        .request_address(address)
        .payload(resolve_payload(&args)?)
        .build()
        .map_err(|err| frame_error("frame build failed", err))?;

    let client = UdpClient::with_config(ClientConfig {
        timeout,
        ..ClientConfig::default()
    })
    .map_err(|err| transport_error("client setup failed", err))?;
    let (sent, reply) = client
        .send_packet(&packet, &endpoint)
        .map_err(|err| transport_error("send failed", err))?;

    let success = reply.as_ref() == SUCCESS_REPLY;
    let out = SendOutput {
        endpoint: endpoint.to_string(),
        address: address.to_string(),
        id: args.id,
        sent,
        reply: payload_preview(&reply),
        reply_size: reply.len(),
        success,
    };
    let fields = [
        ("endpoint", out.endpoint.clone()),
        ("address", out.address.clone()),
        ("id", out.id.to_string()),
        ("sent", out.sent.to_string()),
        ("reply", out.reply.clone()),
    ];
    print_record(&out, &fields, &reply, format);

    Ok(if success { SUCCESS } else { FAILURE })
}

fn resolve_flags(input: Option<&str>) -> CliResult<Flags> {
    let Some(input) = input else {
        return Ok(Flags::request());
    };
    let word = parse_integer(input)
        .ok_or_else(|| CliError::new(USAGE, format!("invalid --flags value: {input}")))?;
    Flags::try_unpack(word).map_err(|err| CliError::new(USAGE, format!("invalid --flags: {err}")))
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
