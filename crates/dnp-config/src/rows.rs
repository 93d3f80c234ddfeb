use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Longest accepted text field, in bytes.
pub const MAX_TEXT_LEN: usize = 255;

/// Which table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKind {
    Component,
    Resource,
}

impl RowKind {
    pub fn name(self) -> &'static str {
        match self {
            RowKind::Component => "component",
            RowKind::Resource => "resource",
        }
    }

    /// Key of the table in a persisted service document.
    pub fn table(self) -> &'static str {
        match self {
            RowKind::Component => "components",
            RowKind::Resource => "resources",
        }
    }
}

/// Common behaviour of configuration rows.
pub trait Row {
    const KIND: RowKind;

    fn id(&self) -> u16;

    /// Name of the handler function this row binds, if any.
    fn handler_reference(&self) -> Option<&str>;

    /// Check id and text-field bounds.
    fn validate(&self) -> Result<()>;
}

/// A component: a named group of resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRow {
    pub id: u16,
    #[serde(default)]
    pub status: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resource_table: Option<String>,
    #[serde(default)]
    pub init_function: Option<String>,
    #[serde(default)]
    pub config: Option<String>,
}

impl Row for ComponentRow {
    const KIND: RowKind = RowKind::Component;

    fn id(&self) -> u16 {
        self.id
    }

    fn handler_reference(&self) -> Option<&str> {
        self.init_function.as_deref()
    }

    fn validate(&self) -> Result<()> {
        check_id(Self::KIND, self.id)?;
        let texts = [
            ("name", Some(self.name.as_str())),
            ("description", Some(self.description.as_str())),
            ("resource_table", self.resource_table.as_deref()),
            ("init_function", self.init_function.as_deref()),
            ("config", self.config.as_deref()),
        ];
        check_texts(Self::KIND, self.id, &texts)
    }
}

/// A resource: one addressable endpoint inside a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub id: u16,
    #[serde(default)]
    pub status: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub read_function: Option<String>,
    #[serde(default)]
    pub write_function: Option<String>,
    #[serde(default)]
    pub init_function: Option<String>,
    #[serde(default)]
    pub config: Option<String>,
}

impl Row for ResourceRow {
    const KIND: RowKind = RowKind::Resource;

    fn id(&self) -> u16 {
        self.id
    }

    /// The read function, falling back to the write function.
    fn handler_reference(&self) -> Option<&str> {
        self.read_function
            .as_deref()
            .or(self.write_function.as_deref())
    }

    fn validate(&self) -> Result<()> {
        check_id(Self::KIND, self.id)?;
        let texts = [
            ("name", Some(self.name.as_str())),
            ("description", Some(self.description.as_str())),
            ("read_function", self.read_function.as_deref()),
            ("write_function", self.write_function.as_deref()),
            ("init_function", self.init_function.as_deref()),
            ("config", self.config.as_deref()),
        ];
        check_texts(Self::KIND, self.id, &texts)
    }
}

fn check_id(kind: RowKind, id: u16) -> Result<()> {
    if id == 0 {
        return Err(ConfigError::Validation {
            entity: kind.name(),
            id,
            field: "id",
            message: "must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

fn check_texts(kind: RowKind, id: u16, texts: &[(&'static str, Option<&str>)]) -> Result<()> {
    for &(field, text) in texts {
        if let Some(text) = text {
            if text.len() > MAX_TEXT_LEN {
                return Err(ConfigError::Validation {
                    entity: kind.name(),
                    id,
                    field,
                    message: format!("is {} bytes, limit is {MAX_TEXT_LEN}", text.len()),
                });
            }
        }
    }
    Ok(())
}
