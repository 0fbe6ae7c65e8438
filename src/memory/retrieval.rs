//! Long-term semantic retrieval
//!
//! Searches are best-effort: whatever goes wrong in the index or the embedding
//! provider is logged here and turned into an empty result, so prompt building
//! never fails because long-term memory is unavailable.

use crate::core::{scope_filter, SemanticDocument, VectorStore};
use crate::error::Error;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// How a search ended, for logs and operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// The index returned at least one document
    Matched,
    /// The index answered but nothing matched
    NoMatches,
    /// The search failed and was degraded to an empty result
    Degraded {
        /// Error description
        reason: String,
    },
}

/// Documents returned by a search plus how the search went
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Matched documents in index ranking order
    pub documents: Vec<SemanticDocument>,
    /// Search outcome
    pub outcome: RetrievalOutcome,
}

impl Retrieval {
    /// Whether the search failed
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, RetrievalOutcome::Degraded { .. })
    }

    /// Drop the outcome and keep the documents
    pub fn into_documents(self) -> Vec<SemanticDocument> {
        self.documents
    }
}

/// Scoped similarity search over the long-term vector store
#[derive(Clone)]
pub struct SemanticRetriever {
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl SemanticRetriever {
    /// Create a new retriever returning at most `top_k` documents per search
    pub fn new(store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        SemanticRetriever { store, top_k }
    }

    /// Maximum documents per search
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Check that the underlying index is usable
    pub async fn health_check(&self) -> crate::Result<()> {
        self.store.health_check().await
    }

    /// Find documents similar to `query` within the `scope_tag` source
    pub async fn search(&self, query: &str, scope_tag: &str) -> Retrieval {
        let filter = scope_filter(scope_tag);

        match self
            .store
            .similarity_search(query, self.top_k, &filter)
            .await
        {
            Ok(documents) if documents.is_empty() => {
                debug!("No long-term matches for scope {}", scope_tag);
                Retrieval {
                    documents,
                    outcome: RetrievalOutcome::NoMatches,
                }
            }
            Ok(mut documents) => {
                documents.truncate(self.top_k);
                debug!(
                    "Found {} long-term matches for scope {}",
                    documents.len(),
                    scope_tag
                );
                Retrieval {
                    documents,
                    outcome: RetrievalOutcome::Matched,
                }
            }
            Err(e) => {
                log_failure(self.store.id(), &e);
                Retrieval {
                    documents: Vec::new(),
                    outcome: RetrievalOutcome::Degraded {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}

fn log_failure(backend: &str, err: &Error) {
    match err {
        Error::VectorIndex(_) | Error::Embedding(_) | Error::Http(_) | Error::Json(_) => {
            warn!(backend, "failed to get vector search results: {}", err);
        }
        other => {
            error!(backend, "unknown error during vector search: {:?}", other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Metadata, SCOPE_METADATA_KEY};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Vector store returning canned documents and recording calls
    struct ScriptedStore {
        documents: Vec<SemanticDocument>,
        calls: Mutex<Vec<(String, usize, Metadata)>>,
    }

    impl ScriptedStore {
        fn new(documents: Vec<SemanticDocument>) -> Self {
            ScriptedStore {
                documents,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VectorStore for ScriptedStore {
        fn id(&self) -> &str {
            "scripted"
        }

        async fn similarity_search(
            &self,
            query: &str,
            k: usize,
            filter: &Metadata,
        ) -> crate::Result<Vec<SemanticDocument>> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), k, filter.clone()));
            Ok(self.documents.clone())
        }

        async fn health_check(&self) -> crate::Result<()> {
            Ok(())
        }
    }

    struct FailingStore(fn() -> Error);

    #[async_trait]
    impl VectorStore for FailingStore {
        fn id(&self) -> &str {
            "failing"
        }

        async fn similarity_search(
            &self,
            _query: &str,
            _k: usize,
            _filter: &Metadata,
        ) -> crate::Result<Vec<SemanticDocument>> {
            Err((self.0)())
        }

        async fn health_check(&self) -> crate::Result<()> {
            Err((self.0)())
        }
    }

    fn doc(text: &str) -> SemanticDocument {
        SemanticDocument::new(text).with_metadata(SCOPE_METADATA_KEY, json!("Elon.txt"))
    }

    #[tokio::test]
    async fn test_search_passes_scope_filter_and_top_k() {
        let store = Arc::new(ScriptedStore::new(vec![doc("Tesla"), doc("SpaceX")]));
        let retriever = SemanticRetriever::new(store.clone(), 3);

        let retrieval = retriever.search("rockets", "Elon.txt").await;

        assert_eq!(retrieval.outcome, RetrievalOutcome::Matched);
        assert_eq!(retrieval.documents.len(), 2);
        assert_eq!(retrieval.documents[0].page_content, "Tesla");

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "rockets");
        assert_eq!(calls[0].1, 3);
        assert_eq!(calls[0].2[SCOPE_METADATA_KEY], json!("Elon.txt"));
    }

    #[tokio::test]
    async fn test_search_keeps_index_order_and_caps_at_top_k() {
        let store = Arc::new(ScriptedStore::new(vec![
            doc("first").with_score(0.2),
            doc("second").with_score(0.9),
            doc("third"),
            doc("fourth"),
        ]));
        let retriever = SemanticRetriever::new(store, 3);

        let documents = retriever.search("q", "Elon.txt").await.into_documents();
        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_empty_result_is_no_matches() {
        let retriever = SemanticRetriever::new(Arc::new(ScriptedStore::new(vec![])), 3);
        let retrieval = retriever.search("q", "Elon.txt").await;
        assert_eq!(retrieval.outcome, RetrievalOutcome::NoMatches);
        assert!(!retrieval.is_degraded());
    }

    #[tokio::test]
    async fn test_known_error_degrades_to_empty() {
        let store = FailingStore(|| Error::VectorIndex("index unavailable".into()));
        let retriever = SemanticRetriever::new(Arc::new(store), 3);

        let retrieval = retriever.search("q", "Elon.txt").await;
        assert!(retrieval.is_degraded());
        assert!(retrieval.documents.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_error_degrades_to_empty() {
        let store = FailingStore(|| Error::Internal("something odd".into()));
        let retriever = SemanticRetriever::new(Arc::new(store), 3);

        let retrieval = retriever.search("q", "Elon.txt").await;
        match retrieval.outcome {
            RetrievalOutcome::Degraded { reason } => assert!(reason.contains("something odd")),
            other => panic!("expected degraded outcome, got {:?}", other),
        }
    }
}
