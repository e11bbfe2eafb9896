//! Core domain types and shared logic for the drydock build-and-host platform.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Project identities and their derivation from request hostnames
//! - The artifact-key scheme binding the builder and the edge proxy
//! - Content-type lookup for published files
//! - Configuration types for both binaries

pub mod config;
pub mod error;
pub mod key;
pub mod media_type;
pub mod project;

pub use error::{Error, Result};
pub use key::{artifact_key, request_key};
pub use media_type::content_type_for;
pub use project::ProjectId;

/// Key prefix under which every published deployment lives.
pub const BUILDS_PREFIX: &str = "builds";

/// Object looked up when a request path is exactly `/`.
pub const INDEX_DOCUMENT: &str = "index.html";
