//! Flat store keys to a per-root folder tree.

pub mod builder;
pub mod parser;

pub use builder::{BuildStats, Snapshot, SnapshotBuilder, ROOT_FOLDER};
pub use parser::{join_path, normalize_path, object_key, parse_key, ParsedKey};
