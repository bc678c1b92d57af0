//! Input records: dotted names with cross references

use serde::{Deserialize, Serialize};

/// One named entry of the flat input list.
///
/// `name` is a delimiter-separated path (e.g. `data.DataSet`). `references`
/// lists the full names of other records this one points at; record files in
/// the wild call this field `imports`, so both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(default, alias = "imports")]
    pub references: Vec<String>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            references: Vec::new(),
        }
    }

    pub fn with_references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }
}
