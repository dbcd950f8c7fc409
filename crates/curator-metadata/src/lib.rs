//! # curator-metadata
//!
//! Metadata-service access layer for Curator.
//!
//! The metadata index lives in an external catalog service. This crate
//! locates and talks to it through two mutually exclusive strategies:
//!
//! - **Routed mode**: requests go through the gateway/router, which handles
//!   auth and URL resolution centrally.
//! - **Direct-discovery mode**: the service address is resolved through the
//!   service registry and called directly over plain HTTP.
//!
//! [`FallbackMetadataClient`] prefers routed mode and falls back to direct
//! discovery exactly once per process, pinning whichever client it decided
//! on. Both modes expose the same tag-search contract, [`MetadataIndex`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use curator_metadata::{FallbackMetadataClient, MetadataIndex, RouterConfig};
//!
//! let client = FallbackMetadataClient::new(
//!     RouterConfig::new("http://router:11015"),
//!     "registry-1:2181/kafka",
//! );
//! let tags = client.discovered_tags("default").await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod selector;

pub use client::{MetadataClient, MetadataIndex, MetadataScope, RouterConfig, SearchResultRecord};
pub use error::{MetadataError, Result};
pub use registry::{HttpServiceRegistry, ServiceRegistry, registry_base_url};
pub use resolver::{EndpointResolver, METADATA_SERVICE, RandomEndpointStrategy};
pub use selector::FallbackMetadataClient;
