//! Tag model: validated tag strings, classifications, and entity references.
//!
//! Tags are plain case-sensitive strings; a collection of tags is always a
//! set, never a multiset. "Preferred" membership is tracked by the persisted
//! store, not by the tag value itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Error;

/// Returns true when `tag` is a syntactically acceptable tag.
///
/// A tag is valid iff it is non-empty after trimming and every character is
/// alphanumeric, `_`, or `-`.
#[must_use]
pub fn is_valid_tag(tag: &str) -> bool {
    let trimmed = tag.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Which subset of discovered tags a query returns.
///
/// Derived, not stored: "preferred" tags live in the persisted set, "user"
/// tags are whatever the metadata index carries that is not preferred, "all"
/// is the union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TagClassification {
    /// Tags present in the metadata index but not promoted.
    User,
    /// Tags promoted into the curated vocabulary.
    Preferred,
    /// Union of user and preferred tags.
    All,
}

impl FromStr for TagClassification {
    type Err = Error;

    // Exact lowercase match; `Type=USER` is a caller error, not a synonym.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "preferred" => Ok(Self::Preferred),
            "all" => Ok(Self::All),
            other => Err(Error::InvalidInput(format!(
                "invalid tag classification: {other}"
            ))),
        }
    }
}

impl fmt::Display for TagClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Preferred => write!(f, "preferred"),
            Self::All => write!(f, "all"),
        }
    }
}

/// The kind of catalog entity a tag can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A dataset in the catalog.
    Dataset,
    /// A stream in the catalog.
    Stream,
}

impl EntityType {
    /// Returns the URL path segment for this entity type (`datasets`,
    /// `streams`).
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Dataset => "datasets",
            Self::Stream => "streams",
        }
    }

    /// Returns the search target name for this entity type.
    #[must_use]
    pub fn target(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Stream => "stream",
        }
    }
}

impl FromStr for EntityType {
    type Err = Error;

    // Case-insensitive: the public API accepts `Dataset`, `STREAM`, etc.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dataset" => Ok(Self::Dataset),
            "stream" => Ok(Self::Stream),
            other => Err(Error::InvalidInput(format!(
                "invalid entity type: {other}"
            ))),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target())
    }
}

/// Reference to a catalog entity, scoped to a namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    /// Namespace the entity lives in.
    pub namespace: String,
    /// Entity kind.
    pub entity_type: EntityType,
    /// Entity name within the namespace.
    pub name: String,
}

impl EntityRef {
    /// Creates a new entity reference.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        entity_type: EntityType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            entity_type,
            name: name.into(),
        }
    }

    /// Returns the stable string id `<namespace>.<type>.<name>`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}.{}.{}", self.namespace, self.entity_type, self.name)
    }
}

/// Network location of a live metadata-service instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl ServiceEndpoint {
    /// Creates a new endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// How the metadata client reaches the metadata service.
///
/// Fixed per client instance at construction; never mutated after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Through the gateway/router, which handles auth and URL resolution.
    Routed,
    /// Resolving the service address directly via the registry.
    Direct,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Routed => write!(f, "routed"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_tags() {
        assert!(is_valid_tag("pii"));
        assert!(is_valid_tag("finance-q3"));
        assert!(is_valid_tag("snake_case"));
        assert!(is_valid_tag("UPPER"));
        assert!(is_valid_tag("  padded  "));
    }

    #[test]
    fn invalid_tags() {
        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag("   "));
        assert!(!is_valid_tag("has space"));
        assert!(!is_valid_tag("semi;colon"));
        assert!(!is_valid_tag("sla/sh"));
    }

    #[test]
    fn classification_parses_exact_lowercase_only() {
        assert_eq!(
            "user".parse::<TagClassification>().unwrap(),
            TagClassification::User
        );
        assert_eq!(
            "preferred".parse::<TagClassification>().unwrap(),
            TagClassification::Preferred
        );
        assert_eq!(
            "all".parse::<TagClassification>().unwrap(),
            TagClassification::All
        );
        assert!("User".parse::<TagClassification>().is_err());
        assert!("ALL".parse::<TagClassification>().is_err());
        assert!("table".parse::<TagClassification>().is_err());
    }

    #[test]
    fn entity_type_parses_case_insensitively() {
        assert_eq!("dataset".parse::<EntityType>().unwrap(), EntityType::Dataset);
        assert_eq!("Dataset".parse::<EntityType>().unwrap(), EntityType::Dataset);
        assert_eq!("STREAM".parse::<EntityType>().unwrap(), EntityType::Stream);
        assert!("table".parse::<EntityType>().is_err());
    }

    #[test]
    fn entity_ref_id_is_stable() {
        let entity = EntityRef::new("default", EntityType::Stream, "clicks");
        assert_eq!(entity.id(), "default.stream.clicks");
    }
}
