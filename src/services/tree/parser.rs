use crate::models::{Entry, EntryKind};
use time::OffsetDateTime;

pub const SEPARATOR: char = '/';

/// Outcome of parsing one store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKey {
    Entry(Entry),
    /// `root/` marker: makes the root known without listing anything.
    Root(String),
}

/// Turns a flat store key into a folder entry.
///
/// `root/a/b/name` becomes a file `name` in folder `/a/b` of `root`.
/// `root/a/b/` becomes a directory `b` listed in its parent folder `/a`.
/// Keys with fewer than two segments or an empty root carry no folder and
/// yield `None`.
pub fn parse_key(key: &str, size: u64, modified_at: Option<OffsetDateTime>) -> Option<ParsedKey> {
    let mut segments = key.split(SEPARATOR);
    let root = segments.next().filter(|root| !root.is_empty())?;
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        return None;
    }

    let (kind, name, parents) = if key.ends_with(SEPARATOR) {
        let named: Vec<&str> = rest.into_iter().filter(|s| !s.is_empty()).collect();
        match named.split_last() {
            Some((name, parents)) => (EntryKind::Directory, *name, join_path(parents.iter().copied())),
            None => return Some(ParsedKey::Root(root.to_string())),
        }
    } else {
        let (name, parents) = rest.split_last()?;
        (EntryKind::File, *name, join_path(parents.iter().copied()))
    };

    let size = match kind {
        EntryKind::File => size,
        EntryKind::Directory => 0,
    };

    Some(ParsedKey::Entry(Entry {
        root: root.to_string(),
        path: parents,
        name: name.to_string(),
        kind,
        size,
        modified_at,
    }))
}

/// Joins folder segments into a `/`-prefixed path, dropping empty segments.
pub fn join_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for segment in segments.into_iter().filter(|s| !s.is_empty()) {
        path.push(SEPARATOR);
        path.push_str(segment);
    }
    if path.is_empty() {
        path.push(SEPARATOR);
    }
    path
}

/// Normalizes a caller supplied folder path: `docs//sub/` -> `/docs/sub`.
pub fn normalize_path(path: &str) -> String {
    join_path(path.split(SEPARATOR))
}

/// Store key addressing `path` inside `root`.
pub fn object_key(root: &str, path: &str) -> String {
    let path = normalize_path(path);
    format!("{root}{path}")
}
