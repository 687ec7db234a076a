//! Hive directory access.
//!
//! This module provides:
//! - `Directory`: the operations the reconciliation engine needs
//! - `HiveClient`: the HTTP implementation with retries
//! - Wire models for assets, notes, projects and attachments

mod client;
mod directory;
mod models;

// Re-export public API
pub use client::HiveClient;
pub use directory::Directory;
pub use models::{
    AssetNode, AttachmentRef, EntityId, HostnameEntity, NoteEntity, ProjectSummary,
};
