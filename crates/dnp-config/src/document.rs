use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::format::ConfigFormat;

/// One step of a nested lookup path.
///
/// An index applied to an object is treated as the key of the same spelling,
/// which is how numeric ids are keyed in persisted documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn step<'a>(&self, node: &'a Value) -> Option<&'a Value> {
        match (self, node) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        }
    }

    fn step_mut<'a>(&self, node: &'a mut Value) -> Result<&'a mut Value> {
        match (self, node) {
            (PathSegment::Key(key), Value::Object(map)) => Ok(map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()))),
            (PathSegment::Index(index), Value::Object(map)) => Ok(map
                .entry(index.to_string())
                .or_insert_with(|| Value::Object(Map::new()))),
            (PathSegment::Index(index), Value::Array(items)) => {
                while items.len() <= *index {
                    items.push(Value::Object(Map::new()));
                }
                Ok(&mut items[*index])
            }
            _ => Err(ConfigError::KeyNotFound(self.to_string())),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A configuration document bound to one file on disk.
///
/// The document is loaded lazily on first access and cached until the next
/// explicit [`read`](Self::read).
#[derive(Debug)]
pub struct ConfigDocument {
    path: PathBuf,
    format: ConfigFormat,
    document: Option<Value>,
}

impl ConfigDocument {
    /// Open an existing JSON document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_format(path, ConfigFormat::Json)
    }

    /// Open an existing document.
    ///
    /// The file must exist and be a regular file. An empty file is initialised
    /// with the format's empty document.
    pub fn open_with_format(path: impl AsRef<Path>, format: ConfigFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path).map_err(|_| ConfigError::NotFound(path.clone()))?;
        if !metadata.is_file() {
            return Err(ConfigError::NotAFile(path));
        }

        let content = read_text(&path)?;
        if content.trim().is_empty() {
            debug!(path = %path.display(), "initialising empty configuration file");
            write_text(&path, format.empty_document())?;
        }

        Ok(Self {
            path,
            format,
            document: None,
        })
    }

    /// Open a JSON document, creating an empty one when the file is missing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            write_text(path, ConfigFormat::Json.empty_document())?;
        }
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Re-read the document from disk, replacing any cached copy.
    pub fn read(&mut self) -> Result<&Value> {
        let value = self.load()?;
        Ok(self.document.insert(value))
    }

    /// The cached document, loading it first if needed.
    pub fn document(&mut self) -> Result<&mut Value> {
        let value = match self.document.take() {
            Some(value) => value,
            None => self.load()?,
        };
        Ok(self.document.insert(value))
    }

    /// Replace the document and persist it.
    pub fn write(&mut self, value: Value) -> Result<()> {
        self.document = Some(value);
        self.save()
    }

    /// Persist the cached document. Does nothing when it was never loaded.
    pub fn save(&self) -> Result<()> {
        let Some(value) = &self.document else {
            return Ok(());
        };
        let text = self.format.encode(value)?;
        write_text(&self.path, &text)
    }

    /// Look up `key` after walking `path` from the document root.
    pub fn get(&mut self, key: &str, path: &[PathSegment]) -> Result<Value> {
        let mut node: &Value = self.document()?;
        for segment in path {
            node = segment
                .step(node)
                .ok_or_else(|| ConfigError::KeyNotFound(segment.to_string()))?;
        }
        node.get(key)
            .cloned()
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Store `value` under `key` after walking `path`, creating missing objects.
    ///
    /// Arrays along the path are padded with empty objects up to the index.
    /// The change stays in memory until [`save`](Self::save).
    pub fn set(&mut self, key: &str, value: Value, path: &[PathSegment]) -> Result<()> {
        let mut node = self.document()?;
        for segment in path {
            node = segment.step_mut(node)?;
        }
        let Value::Object(map) = node else {
            return Err(ConfigError::SetFailed {
                key: key.to_string(),
                reason: "parent is not an object",
            });
        };
        map.insert(key.to_string(), value);
        Ok(())
    }

    fn load(&self) -> Result<Value> {
        let text = read_text(&self.path)?;
        self.format.decode(&text)
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "dnp-config-{name}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn path(segments: &[&str]) -> Vec<PathSegment> {
        segments.iter().map(|s| PathSegment::from(*s)).collect()
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = temp_dir("missing");
        let result = ConfigDocument::open(dir.join("absent.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn open_directory_fails() {
        let dir = temp_dir("directory");
        assert!(matches!(
            ConfigDocument::open(&dir),
            Err(ConfigError::NotAFile(_))
        ));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn open_initialises_empty_file() {
        let dir = temp_dir("empty");
        let file = dir.join("config.json");
        fs::write(&file, "").unwrap();

        let mut doc = ConfigDocument::open(&file).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "{}");
        assert_eq!(doc.document().unwrap(), &json!({}));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn get_walks_nested_path() {
        let dir = temp_dir("get");
        let file = dir.join("config.json");
        fs::write(&file, r#"{"version":"1.1.7","path":{"test":{"value":3}},"list":[{"a":1}]}"#)
            .unwrap();
        let mut doc = ConfigDocument::open(&file).unwrap();

        assert_eq!(doc.get("version", &[]).unwrap(), json!("1.1.7"));
        assert_eq!(doc.get("value", &path(&["path", "test"])).unwrap(), json!(3));
        assert_eq!(
            doc.get("a", &[PathSegment::from("list"), PathSegment::from(0)])
                .unwrap(),
            json!(1)
        );
        assert!(matches!(
            doc.get("value", &path(&["path", "nope"])),
            Err(ConfigError::KeyNotFound(segment)) if segment == "nope"
        ));
        assert!(matches!(
            doc.get("missing", &path(&["path"])),
            Err(ConfigError::MissingKey(key)) if key == "missing"
        ));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn set_creates_missing_objects_and_pads_arrays() {
        let dir = temp_dir("set");
        let file = dir.join("config.json");
        fs::write(&file, r#"{"list":[]}"#).unwrap();
        let mut doc = ConfigDocument::open(&file).unwrap();

        doc.set("value", json!(true), &path(&["a", "b"])).unwrap();
        doc.set("x", json!(1), &[PathSegment::from("list"), PathSegment::from(2)])
            .unwrap();
        doc.save().unwrap();

        let mut reread = ConfigDocument::open(&file).unwrap();
        assert_eq!(
            reread.read().unwrap(),
            &json!({"a": {"b": {"value": true}}, "list": [{}, {}, {"x": 1}]})
        );
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn set_through_scalar_fails() {
        let dir = temp_dir("scalar");
        let file = dir.join("config.json");
        fs::write(&file, r#"{"version":"1"}"#).unwrap();
        let mut doc = ConfigDocument::open(&file).unwrap();

        assert!(matches!(
            doc.set("x", json!(1), &path(&["version"])),
            Err(ConfigError::SetFailed { .. })
        ));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn write_rejects_scalar_document() {
        let dir = temp_dir("write");
        let mut doc = ConfigDocument::create(dir.join("config.json")).unwrap();
        assert!(matches!(
            doc.write(json!("text")),
            Err(ConfigError::NotStructured("string"))
        ));
        fs::remove_dir_all(dir).ok();
    }
}
