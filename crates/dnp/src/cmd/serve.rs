use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dnp_config::ServiceConfiguration;
use dnp_frame::CodecPolicy;
use dnp_manager::{populate, EntityKind, HandlerCatalog, HandlerRegistry, Manager, ManagerConfig};
use dnp_transport::{Endpoint, UdpServer};
use tracing::{info, warn};

use crate::cmd::ServeArgs;
use crate::exit::{
    config_error, manager_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS,
};
use crate::output::OutputFormat;

/// Resource bound to the `print` handler by `--demo`.
pub const DEMO_RESOURCE: u16 = 257;

pub fn run(args: ServeArgs, _format: OutputFormat) -> CliResult<i32> {
    let endpoint = Endpoint::new(&args.host, args.port)
        .map_err(|err| transport_error("invalid bind address", err))?;
    let registry = Arc::new(build_registry(&args)?);
    if registry.is_empty() {
        warn!("no handlers registered, every request will be answered with a server error");
    }

    let config = ManagerConfig {
        policy: if args.strict {
            CodecPolicy::Strict
        } else {
            CodecPolicy::Lenient
        },
    };
    let manager = Arc::new(Manager::with_config(registry, config));

    #[cfg(feature = "async")]
    if args.use_async {
        return serve_async(&endpoint, manager);
    }

    let server = UdpServer::bind(&endpoint).map_err(|err| transport_error("bind failed", err))?;
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    info!(local_addr = %server.local_addr(), "serving");
    server
        .serve(manager, &running)
        .map_err(|err| transport_error("server failed", err))?;
    Ok(SUCCESS)
}

fn build_registry(args: &ServeArgs) -> CliResult<HandlerRegistry> {
    let registry = HandlerRegistry::new();
    let catalog = HandlerCatalog::builtin();

    if let Some(path) = &args.config {
        let service = ServiceConfiguration::load(path)
            .map_err(|err| config_error("config load failed", err))?;
        let count = populate(&registry, &service, &catalog)
            .map_err(|err| manager_error("config rejected", err))?;
        info!(count, path = %path.display(), "handlers loaded");
    }

    if args.demo {
        let print = catalog
            .resolve("print")
            .map_err(|err| manager_error("demo setup failed", err))?;
        registry.add(EntityKind::Resource, DEMO_RESOURCE, print);
    }

    Ok(registry)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(feature = "async")]
fn serve_async(endpoint: &Endpoint, manager: Arc<Manager>) -> CliResult<i32> {
    use dnp_transport::AsyncUdpServer;
    use tokio_util::sync::CancellationToken;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| crate::exit::io_error("runtime start failed", err))?;

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    ctrlc::set_handler(move || token.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;

    runtime
        .block_on(async {
            let server = AsyncUdpServer::bind(endpoint).await?;
            info!(local_addr = %server.local_addr(), "serving on tokio runtime");
            server.serve(manager, shutdown).await
        })
        .map_err(|err| transport_error("server failed", err))?;
    Ok(SUCCESS)
}
