//! The tag-governance service.
//!
//! Applies business rules on top of the metadata index and the persisted
//! preferred set. "Preferred" membership is what the store says; "user" tags
//! are whatever the index carries that is not preferred; classification is
//! filtering, not storage.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;

use tracing::Instrument;

use curator_core::observability::governance_span;
use curator_core::{EntityType, PreferredTagStore, TagClassification, is_valid_tag};
use curator_metadata::MetadataIndex;

use crate::error::{GovernanceError, Result};

/// Stateless governance service over the store and the metadata index.
#[derive(Clone)]
pub struct TagGovernanceService {
    store: Arc<dyn PreferredTagStore>,
    index: Arc<dyn MetadataIndex>,
}

impl TagGovernanceService {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn PreferredTagStore>, index: Arc<dyn MetadataIndex>) -> Self {
        Self { store, index }
    }

    /// Promotes `tags` into the preferred set and returns the resulting set.
    ///
    /// Idempotent: re-promoting an already-preferred tag is a no-op that
    /// still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidTag`] when the input is empty or
    /// any tag fails the syntactic rule; nothing is persisted in that case.
    pub async fn promote(&self, tags: &BTreeSet<String>) -> Result<BTreeSet<String>> {
        Self::require_tags(tags)?;
        if let Some(bad) = tags.iter().find(|t| !is_valid_tag(t)) {
            return Err(GovernanceError::invalid_tag(format!(
                "tag {bad:?} is not a valid tag"
            )));
        }

        self.store.add_tags(tags).await?;
        tracing::info!(count = tags.len(), "promoted tags");
        Ok(self.store.list().await?)
    }

    /// Demotes `tags` from the preferred set and returns the remaining set.
    ///
    /// Demoting a tag that is not currently preferred is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidTag`] when the input is empty.
    pub async fn demote(&self, tags: &BTreeSet<String>) -> Result<BTreeSet<String>> {
        Self::require_tags(tags)?;
        self.store.remove_tags(tags).await?;
        tracing::info!(count = tags.len(), "demoted tags");
        Ok(self.store.list().await?)
    }

    /// Reports, for each input tag, whether it is syntactically acceptable.
    ///
    /// Performs no network I/O; the rule is the one `promote` enforces.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidTag`] when the input is empty.
    pub fn validate(&self, tags: &BTreeSet<String>) -> Result<BTreeMap<String, bool>> {
        Self::require_tags(tags)?;
        Ok(tags
            .iter()
            .map(|tag| (tag.clone(), is_valid_tag(tag)))
            .collect())
    }

    /// Deletes `tag` from the preferred set, provided no dataset or stream
    /// still carries it.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::TagInUse`] while entities are attached,
    /// [`GovernanceError::NotFound`] when the tag is not preferred, and
    /// [`GovernanceError::InvalidTag`] for a blank tag.
    pub async fn delete_if_unused(&self, tag: &str, namespace: &str) -> Result<()> {
        if tag.trim().is_empty() {
            return Err(GovernanceError::invalid_tag("no tag received"));
        }

        async {
            let entities = self.index.entity_num(tag, namespace).await?;
            if entities > 0 {
                return Err(GovernanceError::TagInUse {
                    tag: tag.to_string(),
                    entities,
                });
            }

            if self.store.delete_tag(tag).await? {
                tracing::info!(tag = tag, "deleted preferred tag");
                Ok(())
            } else {
                Err(GovernanceError::NotFound {
                    tag: tag.to_string(),
                })
            }
        }
        .instrument(governance_span("delete_if_unused", namespace))
        .await
    }

    /// Lists tags of the given classification, optionally restricted to a
    /// prefix.
    ///
    /// `User` is the discovered tags minus the preferred set, `Preferred`
    /// is the preferred set restricted to discovered tags, `All` is the
    /// union.
    ///
    /// # Errors
    ///
    /// Propagates store and metadata access failures.
    pub async fn list_tags(
        &self,
        classification: TagClassification,
        prefix: &str,
        namespace: &str,
    ) -> Result<BTreeSet<String>> {
        async {
            let discovered = self.index.discovered_tags(namespace).await?;
            let preferred = self.store.list().await?;

            let tags: BTreeSet<String> = match classification {
                TagClassification::User => discovered.difference(&preferred).cloned().collect(),
                TagClassification::Preferred => {
                    preferred.intersection(&discovered).cloned().collect()
                }
                TagClassification::All => discovered.union(&preferred).cloned().collect(),
            };

            if prefix.is_empty() {
                return Ok(tags);
            }
            Ok(tags
                .into_iter()
                .filter(|tag| tag.starts_with(prefix))
                .collect())
        }
        .instrument(governance_span("list_tags", namespace))
        .await
    }

    /// Returns the USER-scope tags attached to a single entity.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidParameter`] unless `entity_type`
    /// is case-insensitively `dataset` or `stream`; propagates metadata
    /// access failures.
    pub async fn entity_tags(
        &self,
        entity_type: &str,
        entity_name: &str,
        namespace: &str,
    ) -> Result<BTreeSet<String>> {
        let entity_type = EntityType::from_str(entity_type).map_err(|_| {
            GovernanceError::invalid_parameter(format!(
                "invalid parameter for 'type': {entity_type}"
            ))
        })?;

        Ok(self
            .index
            .entity_tags(namespace, entity_type, entity_name)
            .instrument(governance_span("entity_tags", namespace))
            .await?)
    }

    fn require_tags(tags: &BTreeSet<String>) -> Result<()> {
        if tags.is_empty() {
            return Err(GovernanceError::invalid_tag("no tags received"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use curator_core::MemoryTagStore;
    use curator_metadata::{MetadataError, Result as MetadataResult};
    use std::collections::BTreeMap;

    /// Fixed-content index: entity id -> USER tags.
    #[derive(Default)]
    struct StubIndex {
        entities: BTreeMap<(EntityType, String), BTreeSet<String>>,
    }

    impl StubIndex {
        fn with_entity(mut self, entity_type: EntityType, name: &str, tags: &[&str]) -> Self {
            self.entities.insert(
                (entity_type, name.to_string()),
                tags.iter().map(ToString::to_string).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl MetadataIndex for StubIndex {
        async fn entity_num(&self, tag: &str, _namespace: &str) -> MetadataResult<usize> {
            Ok(self
                .entities
                .values()
                .filter(|tags| tags.contains(tag))
                .count())
        }

        async fn discovered_tags(&self, _namespace: &str) -> MetadataResult<BTreeSet<String>> {
            Ok(self.entities.values().flatten().cloned().collect())
        }

        async fn entity_tags(
            &self,
            _namespace: &str,
            entity_type: EntityType,
            entity_name: &str,
        ) -> MetadataResult<BTreeSet<String>> {
            self.entities
                .get(&(entity_type, entity_name.to_string()))
                .cloned()
                .ok_or_else(|| MetadataError::NotFound {
                    message: format!("no such entity: {entity_name}"),
                })
        }
    }

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(ToString::to_string).collect()
    }

    fn service(store: MemoryTagStore, index: StubIndex) -> TagGovernanceService {
        TagGovernanceService::new(Arc::new(store), Arc::new(index))
    }

    fn orders_index() -> StubIndex {
        StubIndex::default().with_entity(EntityType::Dataset, "orders", &["pii", "finance"])
    }

    #[tokio::test]
    async fn promote_then_demote_round_trips() {
        let svc = service(MemoryTagStore::with_tags(["existing"]), StubIndex::default());

        svc.promote(&set(&["pii"])).await.unwrap();
        let after = svc.demote(&set(&["pii"])).await.unwrap();
        assert_eq!(after, set(&["existing"]));
    }

    #[tokio::test]
    async fn promote_is_idempotent() {
        let svc = service(MemoryTagStore::new(), StubIndex::default());

        let once = svc.promote(&set(&["pii"])).await.unwrap();
        let twice = svc.promote(&set(&["pii"])).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice, set(&["pii"]));
    }

    #[tokio::test]
    async fn promote_rejects_invalid_tags() {
        let svc = service(MemoryTagStore::new(), StubIndex::default());

        let err = svc.promote(&set(&["ok", "not ok"])).await.unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidTag { .. }));
        // Nothing was persisted.
        assert!(svc.demote(&set(&["ok"])).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn promote_rejects_empty_input() {
        let svc = service(MemoryTagStore::new(), StubIndex::default());
        let err = svc.promote(&BTreeSet::new()).await.unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidTag { .. }));
    }

    #[tokio::test]
    async fn demote_of_absent_tag_is_noop() {
        let svc = service(MemoryTagStore::with_tags(["pii"]), StubIndex::default());
        let after = svc.demote(&set(&["finance"])).await.unwrap();
        assert_eq!(after, set(&["pii"]));
    }

    #[tokio::test]
    async fn validate_reports_each_tag() {
        let svc = service(MemoryTagStore::new(), StubIndex::default());

        let report = svc.validate(&set(&["fine", "not fine"])).unwrap();
        assert_eq!(report.get("fine"), Some(&true));
        assert_eq!(report.get("not fine"), Some(&false));
    }

    #[tokio::test]
    async fn delete_is_blocked_while_entities_attached() {
        let svc = service(MemoryTagStore::with_tags(["pii"]), orders_index());

        let err = svc.delete_if_unused("pii", "default").await.unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::TagInUse { entities: 1, .. }
        ));
    }

    #[tokio::test]
    async fn delete_succeeds_once_detached() {
        let svc = service(MemoryTagStore::with_tags(["archived"]), orders_index());

        svc.delete_if_unused("archived", "default").await.unwrap();
        let listed = svc
            .list_tags(TagClassification::Preferred, "", "default")
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_tag_is_not_found() {
        let svc = service(MemoryTagStore::new(), StubIndex::default());

        let err = svc.delete_if_unused("ghost", "default").await.unwrap_err();
        assert!(matches!(err, GovernanceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn classification_scenario() {
        // Preferred = {pii}; index has dataset `orders` tagged {pii, finance}.
        let svc = service(MemoryTagStore::with_tags(["pii"]), orders_index());

        let preferred = svc
            .list_tags(TagClassification::Preferred, "", "default")
            .await
            .unwrap();
        assert_eq!(preferred, set(&["pii"]));

        let user = svc
            .list_tags(TagClassification::User, "", "default")
            .await
            .unwrap();
        assert_eq!(user, set(&["finance"]));

        let all = svc
            .list_tags(TagClassification::All, "", "default")
            .await
            .unwrap();
        assert_eq!(all, set(&["pii", "finance"]));
    }

    #[tokio::test]
    async fn preferred_listing_is_subset_of_store() {
        // `stale` is preferred but attached to nothing, so it is filtered
        // from the preferred listing but still counted under `all`.
        let svc = service(MemoryTagStore::with_tags(["pii", "stale"]), orders_index());

        let preferred = svc
            .list_tags(TagClassification::Preferred, "", "default")
            .await
            .unwrap();
        assert_eq!(preferred, set(&["pii"]));

        let all = svc
            .list_tags(TagClassification::All, "", "default")
            .await
            .unwrap();
        assert_eq!(all, set(&["pii", "finance", "stale"]));
    }

    #[tokio::test]
    async fn prefix_restricts_listings() {
        let svc = service(MemoryTagStore::with_tags(["pii"]), orders_index());

        let filtered = svc
            .list_tags(TagClassification::All, "fin", "default")
            .await
            .unwrap();
        assert_eq!(filtered, set(&["finance"]));
    }

    #[tokio::test]
    async fn entity_tags_validates_entity_type() {
        let svc = service(MemoryTagStore::new(), orders_index());

        let err = svc.entity_tags("table", "orders", "default").await.unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidParameter { .. }));

        let tags = svc.entity_tags("DATASET", "orders", "default").await.unwrap();
        assert_eq!(tags, set(&["pii", "finance"]));
    }
}
