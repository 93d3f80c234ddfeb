use clap::{Args, Subcommand};
use std::path::PathBuf;

use dnp_transport::Endpoint;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod config;
pub mod decode;
pub mod route;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the middleware server.
    Serve(ServeArgs),
    /// Send one request frame and print the reply.
    Send(SendArgs),
    /// Decode a hex-encoded frame and print its fields.
    Decode(DecodeArgs),
    /// Decompose an address and show the entity it selects.
    Route(RouteArgs),
    /// List the components and resources of a configuration file.
    Config(ConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Route(args) => route::run(args, format),
        Command::Config(args) => config::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (dotted quad).
    #[arg(long, default_value = Endpoint::DEFAULT_BIND_HOST)]
    pub host: String,
    /// UDP port to bind.
    #[arg(long, default_value_t = u32::from(Endpoint::DEFAULT_PORT))]
    pub port: u32,
    /// Service configuration file naming handlers for components and resources.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Register the `print` handler for resource 257.
    #[arg(long)]
    pub demo: bool,
    /// Drop frames shorter than the fixed header instead of zero-padding them.
    #[arg(long)]
    pub strict: bool,
    /// Serve on the tokio runtime.
    #[cfg(feature = "async")]
    #[arg(long = "async")]
    pub use_async: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Destination host (dotted quad).
    #[arg(long, default_value = Endpoint::DEFAULT_HOST)]
    pub host: String,
    /// Destination port.
    #[arg(long, default_value_t = u32::from(Endpoint::DEFAULT_PORT))]
    pub port: u32,
    /// Request address: raw integer (decimal or 0x hex) or dotted service.component.resource.
    #[arg(long, short = 'a')]
    pub address: String,
    /// Frame id.
    #[arg(long, default_value_t = 1)]
    pub id: u16,
    /// Flags word (decimal or 0x hex). Default: a plain request.
    #[arg(long)]
    pub flags: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Maximum time to wait for the reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex; whitespace and a leading 0x are ignored.
    pub hex: String,
    /// Reject frames shorter than the fixed header.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Raw integer (decimal or 0x hex) or dotted service.component.resource.
    pub address: String,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Service configuration file.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_integer(input: &str) -> Option<i64> {
    let input = input.trim();
    match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => input.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integer_accepts_decimal_and_hex() {
        assert_eq!(parse_integer("257"), Some(257));
        assert_eq!(parse_integer("0xFF00"), Some(0xFF00));
        assert_eq!(parse_integer(" -3 "), Some(-3));
        assert_eq!(parse_integer("0xZZ"), None);
        assert_eq!(parse_integer(""), None);
    }
}
