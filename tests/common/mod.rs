#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use ossdir::services::store::{ObjectStream, StoreGateway};
use ossdir::{Error, ObjectRecord, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

pub fn records(keys: &[(&str, u64)]) -> Vec<ObjectRecord> {
    keys.iter()
        .map(|(key, size)| ObjectRecord::new(*key, *size, None))
        .collect()
}

/// Gateway whose listing is set by the test, with optional failures and a
/// gate that parks `list_all_keys` until the test releases it.
pub struct ScriptedGateway {
    listing: Mutex<std::result::Result<Vec<ObjectRecord>, String>>,
    list_calls: AtomicUsize,
    hold: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl ScriptedGateway {
    pub fn new(listing: Vec<ObjectRecord>) -> Self {
        Self {
            listing: Mutex::new(Ok(listing)),
            list_calls: AtomicUsize::new(0),
            hold: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn set_listing(&self, listing: Vec<ObjectRecord>) {
        *self.listing.lock().unwrap() = Ok(listing);
    }

    pub fn fail_with(&self, message: &str) {
        *self.listing.lock().unwrap() = Err(message.to_string());
    }

    /// Parks every following listing until `release` is notified.
    pub fn hold_listings(&self, hold: bool) {
        self.hold.store(hold, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreGateway for ScriptedGateway {
    async fn list_all_keys(&self) -> Result<Vec<ObjectRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        let listing = self.listing.lock().unwrap().clone();
        listing.map_err(Error::BackendUnavailable)
    }

    async fn get_object(&self, key: &str) -> Result<ObjectStream> {
        Err(Error::NotFound(key.to_string()))
    }

    async fn put_object(&self, _key: &str, _data: Bytes) -> Result<()> {
        Ok(())
    }
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
