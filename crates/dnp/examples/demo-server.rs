//! Demo server: resource 257 prints its payload and answers `success`.
//!
//! Run with:
//!   cargo run --example demo-server
//!
//! In another terminal:
//!   cargo run --example send-request

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dnp::manager::{EntityKind, HandlerCatalog, HandlerRegistry, Manager};
use dnp::transport::{Endpoint, UdpServer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(HandlerRegistry::new());
    registry.add(
        EntityKind::Resource,
        257,
        HandlerCatalog::builtin().resolve("print")?,
    );

    let server = UdpServer::bind(&Endpoint::new("127.0.0.1", 12345)?)?;
    eprintln!("Listening on {}", server.local_addr());

    // Runs until the process is killed.
    let running = AtomicBool::new(true);
    server.serve(Arc::new(Manager::new(registry)), &running)?;
    Ok(())
}
