//! Hierarchical 48-bit addresses.
//!
//! An address is three concatenated 16-bit identifiers, most significant first:
//! service (bits 47-32), component (bits 31-16), resource (bits 15-0).

use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// Width of an address on the wire, in bits.
pub const ADDRESS_BITS: u32 = 48;

/// Largest representable address.
pub const MAX_ADDRESS: u64 = (1 << ADDRESS_BITS) - 1;

const LEVEL_BITS: u32 = 16;
const LEVEL_MASK: u64 = 0xFFFF;

/// A decomposed address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address {
    pub service: u16,
    pub component: u16,
    pub resource: u16,
}

impl Address {
    pub fn new(service: u16, component: u16, resource: u16) -> Self {
        Self {
            service,
            component,
            resource,
        }
    }

    /// Recompose into the raw 48-bit value.
    pub fn to_raw(self) -> u64 {
        (u64::from(self.service) << (2 * LEVEL_BITS))
            | (u64::from(self.component) << LEVEL_BITS)
            | u64::from(self.resource)
    }

    /// True for the all-zero address, which names nothing.
    pub fn is_empty(self) -> bool {
        self == Self::default()
    }
}

/// Split a raw address into its service, component and resource ids.
///
/// Zero is a legal input here; callers decide what an empty address means.
pub fn route(address: u64) -> Result<Address, RouteError> {
    if address > MAX_ADDRESS {
        return Err(RouteError::NotAddressable(address));
    }
    Ok(Address {
        service: ((address >> (2 * LEVEL_BITS)) & LEVEL_MASK) as u16,
        component: ((address >> LEVEL_BITS) & LEVEL_MASK) as u16,
        resource: (address & LEVEL_MASK) as u16,
    })
}

impl TryFrom<u64> for Address {
    type Error = RouteError;

    fn try_from(address: u64) -> Result<Self, Self::Error> {
        route(address)
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.to_raw()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.service, self.component, self.resource)
    }
}

/// Accepts `service.component.resource`, a decimal integer or `0x`-prefixed hex.
impl FromStr for Address {
    type Err = RouteError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let unparseable = || RouteError::Unparseable(input.to_string());

        if input.contains('.') {
            let parts: Vec<&str> = input.split('.').collect();
            let [service, component, resource] = parts.as_slice() else {
                return Err(unparseable());
            };
            let level = |part: &str| part.parse::<u16>().map_err(|_| unparseable());
            return Ok(Address::new(
                level(*service)?,
                level(*component)?,
                level(*resource)?,
            ));
        }

        let digits = input.replace('_', "");
        let raw = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => digits.parse::<u64>(),
        }
        .map_err(|_| unparseable())?;
        route(raw)
    }
}
