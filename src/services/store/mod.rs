//! Access to the backing object store.

pub mod remote;

pub use remote::ObjectStoreGateway;

use crate::core::errors::Result;
use crate::models::ObjectRecord;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;
use url::Url;

/// Operations the directory tree needs from the bucket.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Every key in the bucket, directory markers included as `prefix/`.
    async fn list_all_keys(&self) -> Result<Vec<ObjectRecord>>;

    async fn get_object(&self, key: &str) -> Result<ObjectStream>;

    async fn put_object(&self, key: &str, data: Bytes) -> Result<()>;

    /// Pre-signed download URL, `None` when the store cannot sign.
    async fn signed_url(&self, _key: &str, _ttl: Duration) -> Result<Option<Url>> {
        Ok(None)
    }
}

/// Object metadata plus its body as a byte stream.
pub struct ObjectStream {
    pub key: String,
    pub size: u64,
    pub modified_at: Option<OffsetDateTime>,
    pub content_type: String,
    pub body: BoxStream<'static, Result<Bytes>>,
}

impl ObjectStream {
    /// Buffers the whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.size as usize);
        let mut body = self.body;
        while let Some(chunk) = body.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    /// Last segment of the key.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStream")
            .field("key", &self.key)
            .field("size", &self.size)
            .field("modified_at", &self.modified_at)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// How a caller should transfer an object's bytes.
#[derive(Debug)]
pub enum FetchHandle {
    Url(Url),
    Stream(ObjectStream),
}

/// Content type from the key's extension, for stores that keep none.
pub fn guess_content_type(key: &str) -> &'static str {
    let ext = key
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt" | "log" | "md") => "text/plain; charset=utf-8",
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}
