use dnp_config::ServiceConfiguration;
use tracing::{debug, info};

use crate::entity::EntityKind;
use crate::error::Result;
use crate::handler::HandlerCatalog;
use crate::registry::HandlerRegistry;

/// Register the handlers a service configuration names.
///
/// Components bind their `init_function`. Resources bind their
/// `read_function`, or their `write_function` when no read function is set.
/// Rows naming no function are skipped. Every name is resolved before
/// anything is registered, so an unknown name leaves the registry untouched.
///
/// Returns the number of handlers registered.
pub fn populate(
    registry: &HandlerRegistry,
    config: &ServiceConfiguration,
    catalog: &HandlerCatalog,
) -> Result<usize> {
    let mut resolved = Vec::new();
    for entry in config.entries() {
        let Some(name) = entry.handler else {
            debug!(kind = entry.kind.name(), id = entry.id, "no handler configured");
            continue;
        };
        resolved.push((EntityKind::from(entry.kind), entry.id, catalog.resolve(name)?));
    }

    let count = resolved.len();
    for (kind, id, handler) in resolved {
        registry.add(kind, id, handler);
    }
    info!(count, "registry populated from configuration");
    Ok(count)
}
