//! Preferred-tag store abstraction.
//!
//! The durable table holding the curated vocabulary is an external
//! collaborator; this module defines its boundary and an in-memory backend
//! for tests and debug-mode serving.
//!
//! The store is the sole arbiter of concurrent add/remove semantics; the
//! governance layer never serializes promote/demote calls itself.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Persisted set of preferred tags.
///
/// All collections are sets: adding an already-present tag and removing an
/// absent one are both no-ops that still succeed.
#[async_trait]
pub trait PreferredTagStore: Send + Sync + 'static {
    /// Adds every tag in `tags` to the preferred set.
    async fn add_tags(&self, tags: &BTreeSet<String>) -> Result<()>;

    /// Removes every tag in `tags` from the preferred set.
    async fn remove_tags(&self, tags: &BTreeSet<String>) -> Result<()>;

    /// Removes a single tag. Returns `false` if it was not present.
    async fn delete_tag(&self, tag: &str) -> Result<bool>;

    /// Returns true when `tag` is currently preferred.
    async fn contains(&self, tag: &str) -> Result<bool>;

    /// Returns the full preferred set.
    async fn list(&self) -> Result<BTreeSet<String>>;
}

/// In-memory preferred-tag store.
///
/// Thread-safe via `RwLock`. Not suitable for production.
#[derive(Debug, Default, Clone)]
pub struct MemoryTagStore {
    tags: Arc<RwLock<BTreeSet<String>>>,
}

impl MemoryTagStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `tags`.
    #[must_use]
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: Arc::new(RwLock::new(
                tags.into_iter().map(Into::into).collect::<BTreeSet<_>>(),
            )),
        }
    }
}

#[async_trait]
impl PreferredTagStore for MemoryTagStore {
    async fn add_tags(&self, tags: &BTreeSet<String>) -> Result<()> {
        let mut guard = self.tags.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        guard.extend(tags.iter().cloned());
        Ok(())
    }

    async fn remove_tags(&self, tags: &BTreeSet<String>) -> Result<()> {
        let mut guard = self.tags.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        for tag in tags {
            guard.remove(tag);
        }
        Ok(())
    }

    async fn delete_tag(&self, tag: &str) -> Result<bool> {
        let mut guard = self.tags.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        Ok(guard.remove(tag))
    }

    async fn contains(&self, tag: &str) -> Result<bool> {
        let guard = self.tags.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        Ok(guard.contains(tag))
    }

    async fn list(&self) -> Result<BTreeSet<String>> {
        let guard = self.tags.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let store = MemoryTagStore::new();
        store.add_tags(&set(&["pii"])).await.unwrap();
        store.add_tags(&set(&["pii"])).await.unwrap();
        assert_eq!(store.list().await.unwrap(), set(&["pii"]));
    }

    #[tokio::test]
    async fn remove_absent_tag_is_noop() {
        let store = MemoryTagStore::with_tags(["pii"]);
        store.remove_tags(&set(&["finance"])).await.unwrap();
        assert_eq!(store.list().await.unwrap(), set(&["pii"]));
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = MemoryTagStore::with_tags(["pii"]);
        assert!(store.delete_tag("pii").await.unwrap());
        assert!(!store.delete_tag("pii").await.unwrap());
        assert!(!store.contains("pii").await.unwrap());
    }
}
