//! Hierarchical directory view over a flat object store bucket.
//!
//! A [`DirectoryService`] keeps a periodically rebuilt tree of
//! `root -> folder -> entries` so that listing a folder never waits on a
//! full bucket listing.

pub mod api;
pub mod core;
pub mod models;
pub mod services;

pub use crate::core::errors::{Error, Result};
pub use crate::models::{Entry, EntryKind, ObjectRecord};
pub use crate::services::directory::DirectoryService;
