use serde::Serialize;
use std::cmp::Ordering;
use time::OffsetDateTime;

/// One file or directory visible inside a folder of a tenant root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub root: String,
    /// Folder the entry is listed in, `/`-prefixed.
    pub path: String,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub modified_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "dir",
        }
    }
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Path of the entry itself inside its root, e.g. `/docs/readme.txt`.
    pub fn object_path(&self) -> String {
        if self.path == "/" {
            format!("/{}", self.name)
        } else {
            format!("{}/{}", self.path, self.name)
        }
    }

    /// Full store key of the entry. Directories keep their trailing `/`.
    pub fn key(&self) -> String {
        let key = format!("{}{}", self.root, self.object_path());
        match self.kind {
            EntryKind::File => key,
            EntryKind::Directory => key + "/",
        }
    }
}

/// Listing order: directories first, then by name, then by folder.
pub fn listing_order(a: &Entry, b: &Entry) -> Ordering {
    match b.is_dir().cmp(&a.is_dir()) {
        Ordering::Equal => a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)),
        kind_order => kind_order,
    }
}

pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(listing_order);
}

/// One object as reported by a full store listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    pub modified_at: Option<OffsetDateTime>,
}

impl ObjectRecord {
    pub fn new(key: impl Into<String>, size: u64, modified_at: Option<OffsetDateTime>) -> Self {
        Self {
            key: key.into(),
            size,
            modified_at,
        }
    }
}
