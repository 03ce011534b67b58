use anyhow::Result;
use bytes::Bytes;
use ossdir::services::cache::FreshnessPolicy;
use ossdir::services::store::{FetchHandle, ObjectStoreGateway, StoreGateway};
use ossdir::services::tree::SnapshotBuilder;
use ossdir::{DirectoryService, EntryKind, Error};
use std::sync::Arc;
use tempfile::tempdir;

mod common;
use common::wait_until;

async fn seeded(gateway: &ObjectStoreGateway) -> Result<()> {
    gateway
        .put_object("a/docs/readme.txt", Bytes::from(vec![b'x'; 120]))
        .await?;
    gateway
        .put_object("a/docs/sub/deep.txt", Bytes::from_static(b"deep"))
        .await?;
    gateway.put_object("a/top.txt", Bytes::from_static(b"top")).await?;
    Ok(())
}

#[tokio::test]
async fn listing_reports_prefixes_as_directories() -> Result<()> {
    let gateway = ObjectStoreGateway::in_memory();
    seeded(&gateway).await?;

    let mut keys: Vec<String> = gateway
        .list_all_keys()
        .await?
        .into_iter()
        .map(|r| r.key)
        .collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "a/",
            "a/docs/",
            "a/docs/readme.txt",
            "a/docs/sub/",
            "a/docs/sub/deep.txt",
            "a/top.txt",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn listing_builds_a_browsable_tree() -> Result<()> {
    let gateway = ObjectStoreGateway::in_memory();
    seeded(&gateway).await?;

    let records = gateway.list_all_keys().await?;
    let (snapshot, stats) = SnapshotBuilder::from_records(&records);
    assert_eq!(stats.discarded, 0);

    let top = snapshot.folder("a", "/").unwrap();
    assert_eq!(top.len(), 2);

    let docs = snapshot.folder("a", "/docs").unwrap();
    let readme = docs.iter().find(|e| e.name == "readme.txt").unwrap();
    assert_eq!(readme.kind, EntryKind::File);
    assert_eq!(readme.size, 120);
    assert!(readme.modified_at.is_some());
    assert!(docs
        .iter()
        .any(|e| e.name == "sub" && e.kind == EntryKind::Directory));
    Ok(())
}

#[tokio::test]
async fn get_returns_stored_bytes() -> Result<()> {
    let gateway = ObjectStoreGateway::in_memory();
    seeded(&gateway).await?;

    let object = gateway.get_object("a/docs/sub/deep.txt").await?;
    assert_eq!(object.size, 4);
    assert_eq!(object.file_name(), "deep.txt");
    assert_eq!(object.content_type, "text/plain; charset=utf-8");
    assert_eq!(object.bytes().await?, Bytes::from_static(b"deep"));
    Ok(())
}

#[tokio::test]
async fn missing_object_is_not_found() -> Result<()> {
    let gateway = ObjectStoreGateway::in_memory();
    let err = gateway.get_object("a/none.txt").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{err:?}");
    assert!(!err.is_transient());
    Ok(())
}

#[tokio::test]
async fn unsigned_store_falls_back_to_streaming() -> Result<()> {
    let gateway = Arc::new(ObjectStoreGateway::in_memory());
    seeded(&gateway).await?;
    assert!(gateway
        .signed_url("a/top.txt", std::time::Duration::from_secs(60))
        .await?
        .is_none());

    let service = DirectoryService::new(gateway, FreshnessPolicy::default());
    let err = service.signed_url("a", "/top.txt").await.unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));

    match service.fetch("a", "/top.txt").await? {
        FetchHandle::Stream(object) => assert_eq!(object.bytes().await?, Bytes::from_static(b"top")),
        FetchHandle::Url(url) => panic!("unexpected signed url {url}"),
    }
    Ok(())
}

#[tokio::test]
async fn local_store_round_trips_through_the_service() -> Result<()> {
    let dir = tempdir()?;
    let gateway = Arc::new(ObjectStoreGateway::local(dir.path())?);
    let service = DirectoryService::new(gateway, FreshnessPolicy::default());

    service
        .store("alice", "/reports/2024/q1.csv", Bytes::from_static(b"a,b\n1,2\n"))
        .await?;
    assert!(dir.path().join("alice/reports/2024/q1.csv").is_file());

    // The upload schedules its own refresh.
    wait_until(|| !service.cache().is_refreshing()).await;
    let reports = service.cache().lookup("alice", "/reports");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "2024");
    assert!(reports[0].is_dir());

    let files = service.cache().lookup("alice", "/reports/2024");
    assert_eq!(files[0].name, "q1.csv");
    assert_eq!(files[0].size, 8);

    let object = service.open("alice", "reports/2024/q1.csv").await?;
    assert_eq!(object.content_type, "text/csv");
    assert_eq!(object.bytes().await?, Bytes::from_static(b"a,b\n1,2\n"));
    Ok(())
}

#[tokio::test]
async fn store_rejects_paths_that_escape_the_root() -> Result<()> {
    let gateway = Arc::new(ObjectStoreGateway::in_memory());
    let service = DirectoryService::new(gateway.clone(), FreshnessPolicy::default());

    for path in ["../bob/x.txt", "/", "docs/./x.txt"] {
        let err = service
            .store("alice", path, Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)), "{path}: {err:?}");
    }
    assert!(gateway.list_all_keys().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_costs_one_request_per_folder() -> Result<()> {
    let gateway = ObjectStoreGateway::in_memory();
    seeded(&gateway).await?;
    assert_eq!(gateway.list_requests(), 0);

    // Bucket root, a, a/docs and a/docs/sub.
    gateway.list_all_keys().await?;
    assert_eq!(gateway.list_requests(), 4);

    gateway.list_all_keys().await?;
    assert_eq!(gateway.list_requests(), 8);
    Ok(())
}
