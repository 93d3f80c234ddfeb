use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use dnp_frame::{decode_packet, Address, CodecPolicy, Packet};
use dnp_transport::{DatagramHandler, ReplySink};
use serde_json::Value;
use tracing::{debug, warn};

use crate::entity::EntityKind;
use crate::error::{ManagerError, Result};
use crate::handler::HandlerError;
use crate::registry::HandlerRegistry;

/// Reply when the request address selects nothing.
pub const NOT_FOUND_REPLY: &[u8] = b"404 Not found";
/// Reply when the handler is missing or fails.
pub const SERVER_ERROR_REPLY: &[u8] = b"500 Server error";
/// Reply when the handler answers `true`.
pub const SUCCESS_REPLY: &[u8] = b"success";
/// Reply for any other handler answer.
pub const FAILURE_REPLY: &[u8] = b"failure";

/// Whether a reply of `sent` bytes confirms success.
///
/// Success is reported by transmitting exactly as many bytes as
/// [`SUCCESS_REPLY`] holds.
pub fn reply_confirms_success(sent: usize) -> bool {
    sent == SUCCESS_REPLY.len()
}

/// Result of managing one datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handler answered `true` and the full success reply went out.
    Success,
    /// Handler answered anything else, or the success reply was cut short.
    Failure,
    /// Routing failed; `404 Not found` was sent.
    NotFound,
    /// Lookup or handler failed; `500 Server error` was sent.
    ServerError,
    /// The datagram could not be decoded; nothing was sent.
    Dropped,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }

    pub fn name(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::NotFound => "not_found",
            Outcome::ServerError => "server_error",
            Outcome::Dropped => "dropped",
        }
    }
}

/// Configuration for [`Manager`].
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    /// Decoding policy for inbound datagrams. Default: lenient.
    pub policy: CodecPolicy,
}

/// The entity a datagram is addressed to, with the payload to hand over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: EntityKind,
    pub id: u16,
    pub payload: Bytes,
}

/// Pick the most specific non-zero level of an address.
///
/// Resource wins over component, component over service. A fully zero
/// address selects nothing.
pub fn select_target(address: Address) -> Result<(EntityKind, u16)> {
    if address.resource != 0 {
        Ok((EntityKind::Resource, address.resource))
    } else if address.component != 0 {
        Ok((EntityKind::Component, address.component))
    } else if address.service != 0 {
        Ok((EntityKind::Service, address.service))
    } else {
        Err(ManagerError::NoTarget(address))
    }
}

/// Turns inbound datagrams into handler invocations and replies.
#[derive(Debug, Clone)]
pub struct Manager {
    registry: Arc<HandlerRegistry>,
    config: ManagerConfig,
}

impl Manager {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self::with_config(registry, ManagerConfig::default())
    }

    pub fn with_config(registry: Arc<HandlerRegistry>, config: ManagerConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Decode a datagram and select its target.
    pub fn route(&self, datagram: &[u8]) -> Result<Target> {
        let packet = decode_packet(datagram, self.config.policy)?;
        target_of(&packet)
    }

    /// Run the handler registered for `(kind, id)`.
    ///
    /// A handler that panics is reported as [`ManagerError::HandlerFailed`].
    pub fn dispatch(&self, kind: EntityKind, id: u16, payload: &[u8]) -> Result<Value> {
        let handler = self.registry.get(kind, id)?;
        panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(payload)))
            .unwrap_or_else(|panic| Err(panic_error(panic)))
            .map_err(|source| ManagerError::HandlerFailed { kind, id, source })
    }

    /// Process one datagram end to end and send the reply through `sink`.
    pub fn manage(&self, datagram: &[u8], sink: &dyn ReplySink) -> Outcome {
        let peer = sink.peer();
        let packet = match decode_packet(datagram, self.config.policy) {
            Ok(packet) => packet,
            Err(err) => {
                warn!(error = %err, ?peer, len = datagram.len(), "undecodable datagram dropped");
                return Outcome::Dropped;
            }
        };

        let target = match target_of(&packet) {
            Ok(target) => target,
            Err(err) => {
                debug!(error = %err, ?peer, id = packet.id(), "routing failed");
                send(sink, NOT_FOUND_REPLY);
                return Outcome::NotFound;
            }
        };

        let result = match self.dispatch(target.kind, target.id, &target.payload) {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, ?peer, id = packet.id(), "dispatch failed");
                send(sink, SERVER_ERROR_REPLY);
                return Outcome::ServerError;
            }
        };

        let outcome = if result == Value::Bool(true) {
            match send(sink, SUCCESS_REPLY) {
                Some(sent) if reply_confirms_success(sent) => Outcome::Success,
                _ => Outcome::Failure,
            }
        } else {
            send(sink, FAILURE_REPLY);
            Outcome::Failure
        };
        debug!(
            kind = %target.kind,
            target = target.id,
            id = packet.id(),
            outcome = outcome.name(),
            "datagram managed"
        );
        outcome
    }
}

impl DatagramHandler for Manager {
    fn handle(&self, datagram: &[u8], reply: &dyn ReplySink) {
        self.manage(datagram, reply);
    }
}

fn target_of(packet: &Packet) -> Result<Target> {
    let (kind, id) = select_target(packet.request_target()?)?;
    Ok(Target {
        kind,
        id,
        payload: packet.payload().clone(),
    })
}

fn panic_error(panic: Box<dyn Any + Send>) -> HandlerError {
    let message = match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    };
    format!("handler panicked: {message}").into()
}

fn send(sink: &dyn ReplySink, message: &[u8]) -> Option<usize> {
    match sink.send_reply(message) {
        Ok(sent) => Some(sent),
        Err(err) => {
            warn!(error = %err, peer = ?sink.peer(), "reply failed");
            None
        }
    }
}
