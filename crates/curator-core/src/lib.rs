//! # curator-core
//!
//! Core abstractions for the Curator tag-governance service.
//!
//! This crate provides the foundational types and traits used across all
//! Curator components:
//!
//! - **Tag Model**: Validated tag strings, classifications, and entity
//!   references
//! - **Store Trait**: Abstract interface over the persisted preferred-tag set
//! - **Error Types**: Shared error definitions and result types
//! - **Observability**: Logging initialization and span helpers
//!
//! ## Crate Boundary
//!
//! `curator-core` is the only crate allowed to define shared primitives.
//! The metadata access layer, governance rules, and HTTP surface all build
//! on the contracts defined here.
//!
//! ## Example
//!
//! ```rust
//! use curator_core::prelude::*;
//!
//! let entity = EntityRef::new("default", EntityType::Dataset, "orders");
//! assert_eq!(entity.id(), "default.dataset.orders");
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod observability;
pub mod store;
pub mod tag;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use curator_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::store::{MemoryTagStore, PreferredTagStore};
    pub use crate::tag::{
        AccessMode, EntityRef, EntityType, ServiceEndpoint, TagClassification, is_valid_tag,
    };
}

pub use error::{Error, Result};
pub use store::{MemoryTagStore, PreferredTagStore};
pub use tag::{AccessMode, EntityRef, EntityType, ServiceEndpoint, TagClassification, is_valid_tag};
