use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetadataValue>,
}

impl DocumentMetadata {
    #[must_use]
    pub fn new(source: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content_type: content_type.into(),
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Non-empty `title` entry, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self.extra.get("title") {
            Some(MetadataValue::Text(t)) if !t.trim().is_empty() => Some(t.as_str()),
            _ => None,
        }
    }
}

/// A loaded source document. Immutable once produced by a loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source_id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// A contiguous span of a [`Document`]'s content.
///
/// `start` is the offset of the span in the parent content, counted in chars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub source_id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub chunk_index: usize,
    pub start: usize,
}

impl Chunk {
    /// Display label: metadata `title`, else metadata `source`.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.metadata
            .title()
            .or_else(|| Some(self.metadata.source.as_str()).filter(|s| !s.trim().is_empty()))
    }

    /// First `max_chars` characters of the content.
    #[must_use]
    pub fn snippet(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}
