use dnp_config::ServiceConfiguration;
use dnp_manager::HandlerCatalog;
use serde::Serialize;

use crate::cmd::ConfigArgs;
use crate::exit::{config_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_rows, OutputFormat};

#[derive(Serialize)]
struct EntryOutput<'a> {
    kind: &'static str,
    id: u16,
    name: &'a str,
    handler: Option<&'a str>,
    known: bool,
}

/// List configured entities and check their handler names against the
/// built-in catalog. Unknown names exit with 60.
pub fn run(args: ConfigArgs, format: OutputFormat) -> CliResult<i32> {
    let service = ServiceConfiguration::load(&args.path)
        .map_err(|err| config_error("config load failed", err))?;
    let catalog = HandlerCatalog::builtin();

    let entries: Vec<EntryOutput<'_>> = service
        .entries()
        .map(|entry| EntryOutput {
            kind: entry.kind.name(),
            id: entry.id,
            name: entry.name,
            handler: entry.handler,
            known: entry
                .handler
                .is_none_or(|name| catalog.resolve(name).is_ok()),
        })
        .collect();

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.kind.to_string(),
                entry.id.to_string(),
                entry.name.to_string(),
                entry.handler.unwrap_or("-").to_string(),
                if entry.known { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_rows(
        &entries,
        &["KIND", "ID", "NAME", "HANDLER", "KNOWN"],
        &rows,
        format,
    );

    if entries.iter().all(|entry| entry.known) {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}
