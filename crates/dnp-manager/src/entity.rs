use std::fmt;
use std::str::FromStr;

use dnp_config::RowKind;

use crate::error::ManagerError;

/// Level of the address hierarchy a handler is registered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Service,
    Component,
    Resource,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Service,
        EntityKind::Component,
        EntityKind::Resource,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Service => "service",
            EntityKind::Component => "component",
            EntityKind::Resource => "resource",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = ManagerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == input)
            .ok_or_else(|| ManagerError::UnsupportedEntity(input.to_string()))
    }
}

impl From<RowKind> for EntityKind {
    fn from(kind: RowKind) -> Self {
        match kind {
            RowKind::Component => EntityKind::Component,
            RowKind::Resource => EntityKind::Resource,
        }
    }
}
