//! Per-frame flag bitfield.
//!
//! Eight semantic bits are packed MSB-first into the high byte of the 16-bit
//! flags word. The low byte is reserved: written as zero, ignored on read.
//!
//! | bit | field               | 0             | 1          |
//! |-----|---------------------|---------------|------------|
//! | 15  | `type`              | request       | response   |
//! | 14  | `flow_control`      | off           | on         |
//! | 13  | `target`            | service       | device     |
//! | 12  | `action`            | read          | write      |
//! | 11  | `response_required` | not required  | required   |
//! | 10  | `window`            | not supported | supported  |
//! | 9   | `config`            | config        | message    |
//! | 8   | `init`              | false         | true       |

use std::fmt;

use crate::error::{FrameError, Result};

/// Width of the flags word on the wire, in bits.
pub const FLAGS_WIDTH: u32 = 16;

/// Number of semantic bits carried in the flags word.
pub const FIELD_COUNT: u32 = 8;

/// One semantic bit of the flags word, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagField {
    Type,
    FlowControl,
    Target,
    Action,
    ResponseRequired,
    Window,
    Config,
    Init,
}

impl FlagField {
    /// All fields, most significant bit first.
    pub const ALL: [FlagField; FIELD_COUNT as usize] = [
        FlagField::Type,
        FlagField::FlowControl,
        FlagField::Target,
        FlagField::Action,
        FlagField::ResponseRequired,
        FlagField::Window,
        FlagField::Config,
        FlagField::Init,
    ];

    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            FlagField::Type => "type",
            FlagField::FlowControl => "flow_control",
            FlagField::Target => "target",
            FlagField::Action => "action",
            FlagField::ResponseRequired => "response_required",
            FlagField::Window => "window",
            FlagField::Config => "config",
            FlagField::Init => "init",
        }
    }

    /// Bit position of this field inside the 16-bit word.
    pub fn bit(self) -> u32 {
        FLAGS_WIDTH - 1 - self as u32
    }
}

impl fmt::Display for FlagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded flags word.
///
/// Any combination of bits is legal here; cross-field rules belong to handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    /// `type` bit: request (false) or response (true).
    pub kind: bool,
    pub flow_control: bool,
    /// Service (false) or device (true).
    pub target: bool,
    /// Read (false) or write (true).
    pub action: bool,
    pub response_required: bool,
    pub window: bool,
    /// Config (false) or message (true).
    pub config: bool,
    pub init: bool,
}

impl Flags {
    /// Flags of a plain request: every bit cleared.
    pub fn request() -> Self {
        Self::default()
    }

    /// Flags of a plain response.
    pub fn response() -> Self {
        Self {
            kind: true,
            ..Self::default()
        }
    }

    /// Read a single field.
    pub fn get(&self, field: FlagField) -> bool {
        match field {
            FlagField::Type => self.kind,
            FlagField::FlowControl => self.flow_control,
            FlagField::Target => self.target,
            FlagField::Action => self.action,
            FlagField::ResponseRequired => self.response_required,
            FlagField::Window => self.window,
            FlagField::Config => self.config,
            FlagField::Init => self.init,
        }
    }

    /// Set a single field.
    pub fn set(&mut self, field: FlagField, value: bool) {
        let slot = match field {
            FlagField::Type => &mut self.kind,
            FlagField::FlowControl => &mut self.flow_control,
            FlagField::Target => &mut self.target,
            FlagField::Action => &mut self.action,
            FlagField::ResponseRequired => &mut self.response_required,
            FlagField::Window => &mut self.window,
            FlagField::Config => &mut self.config,
            FlagField::Init => &mut self.init,
        };
        *slot = value;
    }

    /// Builder-style variant of [`Flags::set`].
    pub fn with(mut self, field: FlagField, value: bool) -> Self {
        self.set(field, value);
        self
    }

    /// Pack into the 16-bit wire word. The reserved low byte is always zero.
    pub fn pack(&self) -> u16 {
        let packed = FlagField::ALL
            .iter()
            .fold(0u16, |acc, field| (acc << 1) | u16::from(self.get(*field)));
        packed << (FLAGS_WIDTH - FIELD_COUNT)
    }

    /// Unpack a 16-bit wire word. Reserved bits are dropped.
    pub fn unpack(word: u16) -> Self {
        let mut flags = Self::default();
        for field in FlagField::ALL {
            flags.set(field, (word >> field.bit()) & 1 == 1);
        }
        flags
    }

    /// Unpack a wider integer, rejecting anything outside `0..=65535`.
    pub fn try_unpack(word: i64) -> Result<Self> {
        u16::try_from(word)
            .map(Self::unpack)
            .map_err(|_| FrameError::FlagsOutOfRange(word))
    }

    /// All fields with their values, in wire order.
    pub fn fields(&self) -> [(FlagField, bool); FIELD_COUNT as usize] {
        FlagField::ALL.map(|field| (field, self.get(field)))
    }

    pub fn is_response(&self) -> bool {
        self.kind
    }

    pub fn targets_device(&self) -> bool {
        self.target
    }

    pub fn is_write(&self) -> bool {
        self.action
    }

    pub fn supports_window(&self) -> bool {
        self.window
    }

    pub fn is_message(&self) -> bool {
        self.config
    }
}

impl From<u16> for Flags {
    fn from(word: u16) -> Self {
        Self::unpack(word)
    }
}

impl From<Flags> for u16 {
    fn from(flags: Flags) -> Self {
        flags.pack()
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (_, value)) in self.fields().iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", u8::from(*value))?;
        }
        Ok(())
    }
}
