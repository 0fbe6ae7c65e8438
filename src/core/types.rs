//! Core types shared by the storage backends and the memory layer

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata attached to indexed documents (and used as search filters)
pub type Metadata = HashMap<String, serde_json::Value>;

/// Metadata key carrying the source document a fragment belongs to
pub const SCOPE_METADATA_KEY: &str = "fileName";

/// A fragment returned from the long-term semantic index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticDocument {
    /// Original text of the fragment
    pub page_content: String,
    /// Remaining metadata (includes the `fileName` scope tag)
    #[serde(default)]
    pub metadata: Metadata,
    /// Similarity reported by the index, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl SemanticDocument {
    /// Create a document with no metadata
    pub fn new(page_content: impl Into<String>) -> Self {
        SemanticDocument {
            page_content: page_content.into(),
            metadata: Metadata::new(),
            score: None,
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set the similarity score
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// The `fileName` scope tag, if present
    pub fn scope(&self) -> Option<&str> {
        self.metadata.get(SCOPE_METADATA_KEY).and_then(|v| v.as_str())
    }
}

/// Build the metadata filter restricting a search to one source document
pub fn scope_filter(scope_tag: &str) -> Metadata {
    let mut filter = Metadata::new();
    filter.insert(
        SCOPE_METADATA_KEY.to_string(),
        serde_json::Value::String(scope_tag.to_string()),
    );
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_builder() {
        let doc = SemanticDocument::new("Elon was born in Pretoria")
            .with_metadata(SCOPE_METADATA_KEY, json!("Elon.txt"))
            .with_score(0.87);

        assert_eq!(doc.scope(), Some("Elon.txt"));
        assert_eq!(doc.score, Some(0.87));
    }

    #[test]
    fn test_scope_filter() {
        let filter = scope_filter("Elon.txt");
        assert_eq!(filter.len(), 1);
        assert_eq!(filter["fileName"], json!("Elon.txt"));
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let value = serde_json::to_value(SemanticDocument::new("hi")).unwrap();
        assert_eq!(value["pageContent"], json!("hi"));
        assert!(value.get("score").is_none());
    }
}
