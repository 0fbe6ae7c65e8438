//! In-process sorted-set store
//!
//! Mirrors Redis sorted-set semantics closely enough for local development
//! and tests: members are unique per key (re-adding a member re-scores it),
//! and ranges come back ascending by score, then lexicographically.

use crate::core::SortedSetStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Sorted-set store held in process memory
#[derive(Default)]
pub struct InMemorySortedSet {
    sets: RwLock<HashMap<String, HashMap<String, i64>>>,
    operations: AtomicUsize,
}

impl InMemorySortedSet {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members stored under `key`
    pub async fn len(&self, key: &str) -> usize {
        self.sets.read().await.get(key).map_or(0, HashMap::len)
    }

    /// Total commands served so far
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::Relaxed)
    }

    fn record(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl SortedSetStore for InMemorySortedSet {
    fn id(&self) -> &str {
        "in-memory"
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<i64> {
        self.record();
        let mut sets = self.sets.write().await;
        let added = sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score)
            .is_none();
        Ok(i64::from(added))
    }

    async fn zrange_by_score(&self, key: &str, min: i64, max: i64) -> Result<Vec<String>> {
        self.record();
        let sets = self.sets.read().await;
        let Some(set) = sets.get(key) else {
            return Ok(Vec::new());
        };

        let mut members: Vec<(i64, &String)> = set
            .iter()
            .filter(|(_, score)| (min..=max).contains(*score))
            .map(|(member, score)| (*score, member))
            .collect();
        members.sort();

        Ok(members.into_iter().map(|(_, m)| m.clone()).collect())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.record();
        Ok(self.sets.read().await.get(key).is_some_and(|set| !set.is_empty()))
    }
}
