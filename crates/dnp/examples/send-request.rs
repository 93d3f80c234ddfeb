//! Send one request to resource 257 of the demo server and print the reply.
//!
//! Run with:
//!   cargo run --example send-request

use dnp::frame::{Address, Flags, Packet};
use dnp::transport::{Endpoint, UdpClient};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let packet = Packet::builder()
        .id(1)
        .flags(Flags::request())
        .request_address(Address::new(0, 0, 257))
        .payload(b"hello from the example".to_vec())
        .build()?;

    let client = UdpClient::new()?;
    let (sent, reply) = client.send_packet(&packet, &Endpoint::new("127.0.0.1", 12345)?)?;
    eprintln!("Sent {sent} bytes");
    println!("{}", String::from_utf8_lossy(&reply));
    Ok(())
}
