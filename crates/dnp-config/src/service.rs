use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use crate::rows::{ComponentRow, ResourceRow, Row, RowKind};

/// A configured entity that may bind a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityEntry<'a> {
    pub kind: RowKind,
    pub id: u16,
    pub name: &'a str,
    pub handler: Option<&'a str>,
}

/// Components and resources of one service, keyed by id.
///
/// Persisted as `{"components": {...}, "resources": {...}}` where each table
/// maps the decimal id to its row. Tables written as arrays are accepted on
/// load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfiguration {
    pub components: BTreeMap<u16, ComponentRow>,
    pub resources: BTreeMap<u16, ResourceRow>,
}

impl ServiceConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a decoded document, validating every row.
    ///
    /// A root that is not an object yields an empty configuration.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Ok(Self::default());
        };
        let config = Self {
            components: load_table(root)?,
            resources: load_table(root)?,
        };
        debug!(
            components = config.components.len(),
            resources = config.resources.len(),
            "service configuration loaded"
        );
        Ok(config)
    }

    pub fn to_value(&self) -> Result<Value> {
        let mut root = Map::new();
        root.insert(
            RowKind::Component.table().to_string(),
            dump_table(&self.components)?,
        );
        root.insert(
            RowKind::Resource.table().to_string(),
            dump_table(&self.resources)?,
        );
        Ok(Value::Object(root))
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut document = ConfigDocument::open(path)?;
        Self::from_value(document.document()?)
    }

    /// Write to a JSON file, creating it if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        ConfigDocument::create(path)?.write(self.to_value()?)
    }

    /// Insert or replace a component after validating it.
    pub fn add_component(&mut self, row: ComponentRow) -> Result<()> {
        row.validate()?;
        self.components.insert(row.id, row);
        Ok(())
    }

    /// Insert or replace a resource after validating it.
    pub fn add_resource(&mut self, row: ResourceRow) -> Result<()> {
        row.validate()?;
        self.resources.insert(row.id, row);
        Ok(())
    }

    pub fn component(&self, id: u16) -> Option<&ComponentRow> {
        self.components.get(&id)
    }

    pub fn resource(&self, id: u16) -> Option<&ResourceRow> {
        self.resources.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.resources.is_empty()
    }

    /// Components first, then resources, each in id order.
    pub fn entries(&self) -> impl Iterator<Item = EntityEntry<'_>> {
        let components = self.components.values().map(entry);
        let resources = self.resources.values().map(entry);
        components.chain(resources)
    }
}

impl fmt::Display for ServiceConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = |keys: Vec<String>| {
            if keys.is_empty() {
                "none".to_string()
            } else {
                keys.join(", ")
            }
        };
        write!(
            f,
            "components: {}; resources: {}",
            ids(self.components.keys().map(u16::to_string).collect()),
            ids(self.resources.keys().map(u16::to_string).collect()),
        )
    }
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for ComponentRow {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ResourceRow {
    fn name(&self) -> &str {
        &self.name
    }
}

fn entry<R: Row + Named>(row: &R) -> EntityEntry<'_> {
    EntityEntry {
        kind: R::KIND,
        id: row.id(),
        name: row.name(),
        handler: row.handler_reference(),
    }
}

fn load_table<R>(root: &Map<String, Value>) -> Result<BTreeMap<u16, R>>
where
    R: Row + DeserializeOwned,
{
    let items: Vec<(Option<&str>, &Value)> = match root.get(R::KIND.table()) {
        Some(Value::Array(items)) => items.iter().map(|item| (None, item)).collect(),
        Some(Value::Object(map)) => map.iter().map(|(key, item)| (Some(key.as_str()), item)).collect(),
        _ => Vec::new(),
    };

    let mut table = BTreeMap::new();
    for (key, item) in items {
        let row: R = serde_json::from_value(item.clone())?;
        row.validate()?;
        let id = row.id();
        if let Some(key) = key {
            if key.parse::<u16>().ok() != Some(id) {
                return Err(ConfigError::Validation {
                    entity: R::KIND.name(),
                    id,
                    field: "id",
                    message: format!("does not match its table key {key:?}"),
                });
            }
        }
        if table.insert(id, row).is_some() {
            return Err(ConfigError::Validation {
                entity: R::KIND.name(),
                id,
                field: "id",
                message: "appears more than once".to_string(),
            });
        }
    }
    Ok(table)
}

fn dump_table<R: Serialize>(table: &BTreeMap<u16, R>) -> Result<Value> {
    let mut map = Map::new();
    for (id, row) in table {
        map.insert(id.to_string(), serde_json::to_value(row)?);
    }
    Ok(Value::Object(map))
}
