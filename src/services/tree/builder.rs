use super::parser::{parse_key, ParsedKey};
use crate::models::{Entry, ObjectRecord};
use std::collections::HashMap;

pub const ROOT_FOLDER: &str = "/";

type Folders = HashMap<String, Vec<Entry>>;

/// Immutable directory tree produced by one refresh: root -> folder -> entries.
#[derive(Debug, Default)]
pub struct Snapshot {
    roots: HashMap<String, Folders>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries of one folder in arrival order, `None` when root or folder is unknown.
    pub fn folder(&self, root: &str, path: &str) -> Option<&[Entry]> {
        self.roots
            .get(root)
            .and_then(|folders| folders.get(path))
            .map(Vec::as_slice)
    }

    pub fn contains_root(&self, root: &str) -> bool {
        self.roots.contains_key(root)
    }

    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn folder_count(&self) -> usize {
        self.roots.values().map(HashMap::len).sum()
    }

    pub fn entry_count(&self) -> usize {
        self.roots
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Counters of one build, reported by the refresh loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub keys: usize,
    pub entries: usize,
    pub discarded: usize,
}

/// Groups parsed keys into a [`Snapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    roots: HashMap<String, Folders>,
    stats: BuildStats,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and builds a whole store listing.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ObjectRecord>) -> (Snapshot, BuildStats) {
        let mut builder = Self::new();
        for record in records {
            builder.push_record(record);
        }
        builder.finish()
    }

    pub fn push_record(&mut self, record: &ObjectRecord) {
        self.stats.keys += 1;
        match parse_key(&record.key, record.size, record.modified_at) {
            Some(parsed) => self.push(parsed),
            None => {
                self.stats.discarded += 1;
                tracing::debug!("discarding key without folder: {:?}", record.key);
            }
        }
    }

    pub fn push(&mut self, parsed: ParsedKey) {
        match parsed {
            ParsedKey::Root(root) => {
                self.roots
                    .entry(root)
                    .or_default()
                    .entry(ROOT_FOLDER.to_string())
                    .or_default();
            }
            ParsedKey::Entry(entry) => {
                self.stats.entries += 1;
                self.roots
                    .entry(entry.root.clone())
                    .or_default()
                    .entry(entry.path.clone())
                    .or_default()
                    .push(entry);
            }
        }
    }

    pub fn finish(self) -> (Snapshot, BuildStats) {
        (Snapshot { roots: self.roots }, self.stats)
    }
}
