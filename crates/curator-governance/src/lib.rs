//! # curator-governance
//!
//! Tag-governance business rules for Curator.
//!
//! This crate implements the governance domain on top of the persisted
//! preferred-tag set and the metadata access layer:
//!
//! - **Promote / Demote**: move tags in and out of the curated vocabulary
//! - **Validate**: syntactic tag checks, no network I/O
//! - **Delete Guard**: a preferred tag cannot be deleted while any
//!   dataset/stream still carries it
//! - **Classification Queries**: user / preferred / all tag listings and
//!   per-entity tag lookups
//!
//! The service is stateless per call; the store and the metadata index are
//! the only collaborators.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod service;

pub use error::{GovernanceError, Result};
pub use service::TagGovernanceService;
