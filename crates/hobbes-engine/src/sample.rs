//! Sample data access
//!
//! The engine reads sample data through the [`Sample`] trait only. Hosts with
//! their own storage implement it directly; [`SampleRecord`] is a plain
//! in-memory implementation that can be loaded from JSON or TOML.

use crate::error::LoadError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Read-only view of one sample
pub trait Sample {
    /// Named attribute, e.g. a measured series such as `depth`
    fn get(&self, name: &str) -> Option<Value>;

    /// Descriptive metadata, e.g. `core site`
    fn metadata(&self, key: &str) -> Option<Value> {
        self.get(key)
    }

    /// Tabular lookup: `field` of the first row in `table` whose columns
    /// match every `(column, value)` key
    fn db(&self, _table: &str, _field: &str, _keys: &[(String, Value)]) -> Option<Value> {
        None
    }
}

/// In-memory sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Measured attributes
    #[serde(default)]
    pub attributes: HashMap<String, Value>,

    /// Descriptive metadata
    #[serde(default)]
    pub metadata: HashMap<String, Value>,

    /// Reference tables, each a list of rows
    #[serde(default)]
    pub tables: HashMap<String, Vec<HashMap<String, Value>>>,
}

impl SampleRecord {
    /// Empty sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Builder-style table row
    pub fn with_row(mut self, table: impl Into<String>, row: HashMap<String, Value>) -> Self {
        self.tables.entry(table.into()).or_default().push(row);
        self
    }

    /// Parse a JSON sample
    pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a TOML sample
    pub fn from_toml_str(s: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a sample file; `.toml` files are read as TOML, anything else as JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }
}

impl Sample for SampleRecord {
    fn get(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn metadata(&self, key: &str) -> Option<Value> {
        self.metadata.get(key).cloned()
    }

    fn db(&self, table: &str, field: &str, keys: &[(String, Value)]) -> Option<Value> {
        self.tables
            .get(table)?
            .iter()
            .find(|row| keys.iter().all(|(col, val)| row.get(col) == Some(val)))
            .and_then(|row| row.get(field).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_attribute_and_metadata_are_separate() {
        let sample = SampleRecord::new()
            .with_attribute("depth", vec![0.0, 1.0])
            .with_metadata("core site", "Atlantic");

        assert_eq!(sample.get("depth"), Some(Value::Series(vec![0.0, 1.0])));
        assert_eq!(sample.get("core site"), None);
        assert_eq!(sample.metadata("core site"), Some(Value::from("Atlantic")));
    }

    #[test]
    fn test_db_matches_all_keys() {
        let sample = SampleRecord::new()
            .with_row("temps", row(&[("lat", 10.into()), ("lon", 20.into()), ("avg", 4.5.into())]))
            .with_row("temps", row(&[("lat", 10.into()), ("lon", 30.into()), ("avg", 7.0.into())]));

        let keys = vec![("lat".to_string(), Value::from(10)), ("lon".to_string(), Value::from(30))];
        assert_eq!(sample.db("temps", "avg", &keys), Some(Value::Number(7.0)));

        let keys = vec![("lat".to_string(), Value::from(11))];
        assert_eq!(sample.db("temps", "avg", &keys), None);
        assert_eq!(sample.db("missing", "avg", &[]), None);
    }

    #[test]
    fn test_parse_json_and_toml() {
        let json = r#"{"name": "core 7", "attributes": {"depth": [0, 1, 2]}, "metadata": {"in ocean": true}}"#;
        let sample = SampleRecord::from_json_str(json).unwrap();
        assert_eq!(sample.name.as_deref(), Some("core 7"));
        assert_eq!(sample.metadata("in ocean"), Some(Value::Bool(true)));

        let toml = "[attributes]\ndepth = [0.0, 1.0]\n\n[metadata]\n\"in ocean\" = false\n";
        let sample = SampleRecord::from_toml_str(toml).unwrap();
        assert_eq!(sample.get("depth"), Some(Value::Series(vec![0.0, 1.0])));
        assert_eq!(sample.metadata("in ocean"), Some(Value::Bool(false)));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "name = \"x\"\n[attributes]\nage = 12\n").unwrap();

        let sample = SampleRecord::from_file(&path).unwrap();
        assert_eq!(sample.get("age"), Some(Value::Number(12.0)));
    }
}
