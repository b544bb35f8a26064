//! Tabular data sources
//!
//! Parsing CSV/XLSX bytes happens outside this crate; callers hand over
//! headers and rows of strings.

use crate::{Result, TemplateError};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// One data row: column name to value, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    entries: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `column`, if the row has one
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Set `column`, replacing an existing value in place
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of column names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Row, A::Error> {
        let mut row = Row::new();
        while let Some((k, v)) = access.next_entry::<String, String>()? {
            row.insert(k, v);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

/// Headers plus rows of a tabular data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl DataSource {
    /// Create a data source, validating the headers
    ///
    /// Headers must be non-empty and unique. Zero rows is accepted here;
    /// batch generation rejects it.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if headers.is_empty() {
            return Err(TemplateError::InputError(
                "Data source has no headers".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(TemplateError::InputError(format!(
                    "Duplicate header '{header}'"
                )));
            }
        }

        Ok(Self { headers, rows })
    }

    /// Create a data source from positional records
    ///
    /// Cell `i` of each record belongs to header `i`. Short records leave the
    /// trailing columns absent; extra cells are dropped.
    pub fn from_records(headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        let rows: Vec<Row> = records
            .into_iter()
            .map(|record| headers.iter().cloned().zip(record).collect::<Row>())
            .collect();
        Self::new(headers, rows)
    }

    /// Validate a data source deserialized from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: DataSource = serde_json::from_str(json)?;
        Self::new(raw.headers, raw.rows)
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
