use dnp_frame::Address;
use dnp_manager::select_target;
use serde::Serialize;

use crate::cmd::RouteArgs;
use crate::exit::{route_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct TargetOutput {
    kind: &'static str,
    id: u16,
}

#[derive(Serialize)]
struct RouteOutput {
    raw: u64,
    service: u16,
    component: u16,
    resource: u16,
    target: Option<TargetOutput>,
}

pub fn run(args: RouteArgs, format: OutputFormat) -> CliResult<i32> {
    let address: Address = args
        .address
        .parse()
        .map_err(|err| route_error("invalid address", err))?;
    let target = select_target(address)
        .ok()
        .map(|(kind, id)| TargetOutput {
            kind: kind.name(),
            id,
        });

    let target_text = match &target {
        Some(target) => format!("{} {}", target.kind, target.id),
        None => "none".to_string(),
    };
    let found = target.is_some();
    let out = RouteOutput {
        raw: address.to_raw(),
        service: address.service,
        component: address.component,
        resource: address.resource,
        target,
    };
    let fields = [
        ("raw", format!("{:#014x}", out.raw)),
        ("service", out.service.to_string()),
        ("component", out.component.to_string()),
        ("resource", out.resource.to_string()),
        ("target", target_text.clone()),
    ];
    print_record(&out, &fields, format!("{target_text}\n").as_bytes(), format);

    Ok(if found { SUCCESS } else { FAILURE })
}
