use super::{guess_content_type, ObjectStream, StoreGateway};
use crate::core::config::Config;
use crate::core::errors::{Error, Result};
use crate::models::ObjectRecord;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, ObjectStore, PutPayload};
use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use url::Url;

const DEFAULT_REGION: &str = "us-east-1";

/// [`StoreGateway`] over any `object_store` backend (S3-compatible, local, memory).
pub struct ObjectStoreGateway {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    list_requests: AtomicU64,
}

impl ObjectStoreGateway {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            signer: None,
            list_requests: AtomicU64::new(0),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    pub fn local(root: impl AsRef<std::path::Path>) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let store = LocalFileSystem::new_with_prefix(root)
            .map_err(|e| Error::Config(format!("local store '{}': {}", root.display(), e)))?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Builds the gateway named by `storeUrl`, or the S3-compatible bucket
    /// described by the `oss*` settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(url) = config.store_url.as_deref() else {
            return Self::s3(config, &config.oss_bucket);
        };
        if url == "memory://" {
            return Ok(Self::in_memory());
        }
        if let Some(dir) = url.strip_prefix("file://") {
            return Self::local(dir);
        }
        if let Some(rest) = url.strip_prefix("s3://") {
            let bucket = rest.split('/').next().unwrap_or_default();
            return Self::s3(config, bucket);
        }
        Err(Error::Config(format!("unsupported storeUrl '{url}'")))
    }

    fn s3(config: &Config, bucket: &str) -> Result<Self> {
        if bucket.is_empty() {
            return Err(Error::Config("bucket name is empty".into()));
        }
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(config.oss_region.as_deref().unwrap_or(DEFAULT_REGION));
        if !config.oss_endpoint.is_empty() {
            builder = builder.with_endpoint(&config.oss_endpoint);
        }
        if !config.oss_access_key_id.is_empty() {
            builder = builder.with_access_key_id(&config.oss_access_key_id);
        }
        if !config.oss_access_key_secret.is_empty() {
            builder = builder.with_secret_access_key(&config.oss_access_key_secret);
        }
        let s3 = Arc::new(
            builder
                .build()
                .map_err(|e| Error::Config(format!("s3 store: {e}")))?,
        );
        tracing::info!(bucket, endpoint = %config.oss_endpoint, "using s3-compatible store");
        Ok(Self::new(s3.clone()).with_signer(s3))
    }

    /// Listing calls sent to the store since creation, one per walked folder.
    pub fn list_requests(&self) -> u64 {
        self.list_requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StoreGateway for ObjectStoreGateway {
    /// Walks the bucket one delimiter level at a time.
    ///
    /// `object_store` strips trailing delimiters from object paths, so a
    /// `docs/` marker would come back as an empty file `docs`. Walking with
    /// a delimiter reports folders as common prefixes instead; they are
    /// emitted as `prefix/` records. A marker object found inside its own
    /// prefix only contributes its modification time.
    ///
    /// The walk costs one sequential listing call per folder, so a refresh
    /// of a deep bucket is much slower than a single flat listing. The call
    /// count is logged with every walk.
    async fn list_all_keys(&self) -> Result<Vec<ObjectRecord>> {
        let started = Instant::now();
        let mut requests = 0u64;
        let mut records = Vec::new();
        let mut pending: VecDeque<(Option<Path>, Option<usize>)> = VecDeque::from([(None, None)]);

        while let Some((prefix, marker)) = pending.pop_front() {
            requests += 1;
            self.list_requests.fetch_add(1, Ordering::Relaxed);
            let listing = self.store.list_with_delimiter(prefix.as_ref()).await?;

            for dir in listing.common_prefixes {
                records.push(ObjectRecord::new(format!("{dir}/"), 0, None));
                pending.push_back((Some(dir), Some(records.len() - 1)));
            }

            for meta in listing.objects {
                let modified_at = to_offset_date_time(
                    meta.last_modified.timestamp(),
                    meta.last_modified.timestamp_subsec_nanos(),
                );
                if prefix.as_ref() == Some(&meta.location) {
                    if let Some(index) = marker {
                        records[index].modified_at = modified_at;
                    }
                    continue;
                }
                records.push(ObjectRecord::new(meta.location.to_string(), meta.size, modified_at));
            }
        }

        tracing::debug!(
            count = records.len(),
            requests,
            listed_ms = started.elapsed().as_millis() as u64,
            "listed store keys"
        );
        Ok(records)
    }

    async fn get_object(&self, key: &str) -> Result<ObjectStream> {
        let path = parse_path(key)?;
        let result = self.store.get(&path).await?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| {
                let value: &str = value.as_ref();
                value.to_string()
            })
            .unwrap_or_else(|| guess_content_type(key).to_string());
        let size = result.meta.size;
        let modified_at = to_offset_date_time(
            result.meta.last_modified.timestamp(),
            result.meta.last_modified.timestamp_subsec_nanos(),
        );
        let body = result.into_stream().map_err(Error::from).boxed();

        Ok(ObjectStream {
            key: key.to_string(),
            size,
            modified_at,
            content_type,
            body,
        })
    }

    async fn put_object(&self, key: &str, data: Bytes) -> Result<()> {
        let path = parse_path(key)?;
        let size = data.len();
        self.store.put(&path, PutPayload::from(data)).await?;
        tracing::debug!(key, size, "stored object");
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<Option<Url>> {
        let Some(signer) = &self.signer else {
            return Ok(None);
        };
        let path = parse_path(key)?;
        let url = signer.signed_url(http::Method::GET, &path, ttl).await?;
        Ok(Some(url))
    }
}

fn parse_path(key: &str) -> Result<Path> {
    Path::parse(key).map_err(|e| Error::InvalidPath(format!("{key}: {e}")))
}

fn to_offset_date_time(unix_seconds: i64, nanos: u32) -> Option<OffsetDateTime> {
    let at = OffsetDateTime::from_unix_timestamp(unix_seconds).ok()?;
    Some(at.replace_nanosecond(nanos).unwrap_or(at))
}
