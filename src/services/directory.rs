use crate::core::config::{Config, DEFAULT_SIGN_URL_SECS};
use crate::core::errors::{Error, Result};
use crate::models::Entry;
use crate::services::cache::{DirectoryCache, FreshnessPolicy, RefreshOutcome, Refresher};
use crate::services::store::{FetchHandle, ObjectStream, StoreGateway};
use crate::services::tree::{object_key, ROOT_FOLDER};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Folder listings, downloads and uploads for one bucket, shared by all handlers.
pub struct DirectoryService {
    cache: Arc<DirectoryCache>,
    refresher: Refresher,
    gateway: Arc<dyn StoreGateway>,
    sign_url_ttl: Duration,
}

impl DirectoryService {
    pub fn new(gateway: Arc<dyn StoreGateway>, policy: FreshnessPolicy) -> Self {
        let cache = Arc::new(DirectoryCache::new(policy));
        let refresher = Refresher::new(Arc::clone(&cache), Arc::clone(&gateway));
        Self {
            cache,
            refresher,
            gateway,
            sign_url_ttl: Duration::from_secs(DEFAULT_SIGN_URL_SECS),
        }
    }

    pub fn from_config(gateway: Arc<dyn StoreGateway>, config: &Config) -> Self {
        Self::new(gateway, FreshnessPolicy::new(config.staleness())).with_sign_url_ttl(config.sign_url_ttl())
    }

    pub fn with_sign_url_ttl(mut self, ttl: Duration) -> Self {
        self.sign_url_ttl = ttl;
        self
    }

    pub fn cache(&self) -> &Arc<DirectoryCache> {
        &self.cache
    }

    pub fn refresher(&self) -> &Refresher {
        &self.refresher
    }

    /// Blocking first population, run once before serving.
    pub async fn initialize(&self) -> Result<RefreshOutcome> {
        let outcome = self.refresher.refresh_now().await?;
        if let RefreshOutcome::Installed(stats) = outcome {
            tracing::info!(
                roots = self.cache.roots().len(),
                entries = stats.entries,
                "directory cache populated"
            );
        }
        Ok(outcome)
    }

    /// Entries of a folder from the cached tree, directories first.
    ///
    /// Unknown roots and folders list as empty. A stale or unknown root
    /// schedules a background refresh; this call still answers from the
    /// snapshot installed right now.
    pub fn list(&self, root: &str, path: &str) -> Vec<Entry> {
        if self.refresher.trigger_if_stale(root) {
            tracing::debug!(root, "scheduled background refresh");
        }
        self.cache.lookup(root, path)
    }

    /// A signed URL when the store can sign, otherwise a byte stream.
    pub async fn fetch(&self, root: &str, path: &str) -> Result<FetchHandle> {
        let key = file_key(root, path)?;
        match self.gateway.signed_url(&key, self.sign_url_ttl).await? {
            Some(url) => Ok(FetchHandle::Url(url)),
            None => Ok(FetchHandle::Stream(self.gateway.get_object(&key).await?)),
        }
    }

    pub async fn open(&self, root: &str, path: &str) -> Result<ObjectStream> {
        let key = file_key(root, path)?;
        self.gateway.get_object(&key).await
    }

    pub async fn signed_url(&self, root: &str, path: &str) -> Result<Url> {
        let key = file_key(root, path)?;
        self.gateway
            .signed_url(&key, self.sign_url_ttl)
            .await?
            .ok_or(Error::Unsupported("signed urls"))
    }

    /// Uploads `data` and schedules a refresh so the file shows up in listings.
    pub async fn store(&self, root: &str, path: &str, data: Bytes) -> Result<()> {
        let key = file_key(root, path)?;
        self.gateway.put_object(&key, data).await?;
        self.refresher.trigger();
        Ok(())
    }
}

/// Store key of a file, rejecting paths that do not name one.
fn file_key(root: &str, path: &str) -> Result<String> {
    if root.is_empty() || root.contains('/') {
        return Err(Error::InvalidPath(format!("invalid root '{root}'")));
    }
    if path
        .split('/')
        .any(|segment| segment == "." || segment == "..")
    {
        return Err(Error::InvalidPath(format!("relative segments in '{path}'")));
    }
    let key = object_key(root, path);
    if key.len() == root.len() + ROOT_FOLDER.len() {
        return Err(Error::InvalidPath(format!("'{path}' does not name a file")));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_keys_join_root_and_path() {
        assert_eq!(file_key("alice", "/docs/a.txt").unwrap(), "alice/docs/a.txt");
        assert_eq!(file_key("alice", "docs//a.txt").unwrap(), "alice/docs/a.txt");
    }

    #[test]
    fn file_keys_reject_folders_and_escapes() {
        assert!(matches!(file_key("alice", "/"), Err(Error::InvalidPath(_))));
        assert!(matches!(file_key("alice", ""), Err(Error::InvalidPath(_))));
        assert!(matches!(file_key("alice", "../bob/x"), Err(Error::InvalidPath(_))));
        assert!(matches!(file_key("", "x"), Err(Error::InvalidPath(_))));
        assert!(matches!(file_key("a/b", "x"), Err(Error::InvalidPath(_))));
    }
}
