/// Write coordinator tests: partial-upload compensation, persist-failure
/// compensation, and the replace-then-cleanup ordering.
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::error::AppError;
use crate::services::coordinator::{AssetSource, WriteCoordinator};
use crate::services::storage::{AssetKind, ObjectStore, StoredAsset};
use crate::tests::fixtures::InMemoryObjectStore;

/// Stand-in for a metadata record referencing staged assets
#[derive(Debug, Clone, PartialEq)]
struct FakeRecord {
    video_key: String,
    thumbnail_key: String,
}

fn video_source() -> AssetSource {
    AssetSource::new(
        "video file",
        Bytes::from_static(b"fake video bytes"),
        AssetKind::Video,
        "video/mp4".to_string(),
    )
}

fn thumbnail_source() -> AssetSource {
    AssetSource::new(
        "thumbnail",
        Bytes::from_static(b"fake thumbnail bytes"),
        AssetKind::Image,
        "image/png".to_string(),
    )
}

/// Seed the store with one committed thumbnail and return its asset
async fn seed_thumbnail(coordinator: &WriteCoordinator) -> StoredAsset {
    coordinator
        .create_with_assets(vec![thumbnail_source()], |assets| async move {
            Ok(assets[0].clone())
        })
        .await
        .expect("seed upload should succeed")
}

#[tokio::test]
async fn create_persists_a_record_referencing_uploaded_assets() {
    let store = Arc::new(InMemoryObjectStore::new());
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let record = coordinator
        .create_with_assets(vec![video_source(), thumbnail_source()], |assets| async move {
            Ok(FakeRecord {
                video_key: assets[0].key.clone(),
                thumbnail_key: assets[1].key.clone(),
            })
        })
        .await
        .expect("create should succeed");

    assert_eq!(store.object_count(), 2);
    assert!(store.contains(&record.video_key));
    assert!(store.contains(&record.thumbnail_key));
}

#[tokio::test]
async fn failed_second_upload_removes_the_first_and_never_persists() {
    // GIVEN: A store where the second upload fails (valid video, broken thumbnail)
    let store = Arc::new(InMemoryObjectStore::failing_from(1));
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let persisted = Arc::new(Mutex::new(None));
    let persisted_in = Arc::clone(&persisted);

    // WHEN: Publishing with two required assets
    let result = coordinator
        .create_with_assets(vec![video_source(), thumbnail_source()], move |assets| async move {
            *persisted_in.lock().unwrap() = Some(FakeRecord {
                video_key: assets[0].key.clone(),
                thumbnail_key: assets[1].key.clone(),
            });
            Ok(())
        })
        .await;

    // THEN: The operation fails as an upload failure, the already-uploaded
    // video blob is gone, and no record was written
    assert!(matches!(result, Err(AppError::AssetUploadFailed(_))));
    assert_eq!(store.object_count(), 0);
    assert!(persisted.lock().unwrap().is_none());
    // Both uploads were attempted, in order
    assert_eq!(store.uploads_attempted(), 2);
}

#[tokio::test]
async fn failed_first_upload_fails_without_compensation() {
    let store = Arc::new(InMemoryObjectStore::failing_from(0));
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let result = coordinator
        .create_with_assets(vec![video_source(), thumbnail_source()], |_| async {
            Ok(())
        })
        .await;

    assert!(matches!(result, Err(AppError::AssetUploadFailed(_))));
    assert_eq!(store.object_count(), 0);
    // The second source was never attempted
    assert_eq!(store.uploads_attempted(), 1);
}

#[tokio::test]
async fn failed_persist_removes_every_staged_asset() {
    let store = Arc::new(InMemoryObjectStore::new());
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let result: Result<(), AppError> = coordinator
        .create_with_assets(vec![video_source(), thumbnail_source()], |_| async {
            Err(AppError::Database("insert failed".to_string()))
        })
        .await;

    assert!(matches!(result, Err(AppError::PersistFailed(_))));
    assert_eq!(store.object_count(), 0);
}

#[tokio::test]
async fn replace_swaps_then_deletes_the_old_asset() {
    let store = Arc::new(InMemoryObjectStore::new());
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    // Seed the current state: a record pointing at an existing thumbnail
    let original = seed_thumbnail(&coordinator).await;
    let record = Arc::new(Mutex::new(original.clone()));
    let record_in = Arc::clone(&record);

    // Replace it
    coordinator
        .replace_asset(
            thumbnail_source(),
            Some(original.key.clone()),
            move |replacement| async move {
                *record_in.lock().unwrap() = replacement;
                Ok(())
            },
        )
        .await
        .expect("replace should succeed");

    // Old asset deleted only after the swap committed; record points at the
    // replacement, which is the only object left
    let current = record.lock().unwrap().clone();
    assert_ne!(current.key, original.key);
    assert!(!store.contains(&original.key));
    assert!(store.contains(&current.key));
    assert_eq!(store.object_count(), 1);
}

#[tokio::test]
async fn failed_swap_removes_the_replacement_and_keeps_the_old_state() {
    let store = Arc::new(InMemoryObjectStore::new());
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let original = seed_thumbnail(&coordinator).await;
    let record = Arc::new(Mutex::new(original.clone()));

    let result: Result<(), AppError> = coordinator
        .replace_asset(
            thumbnail_source(),
            Some(original.key.clone()),
            |_| async { Err(AppError::Database("swap failed".to_string())) },
        )
        .await;

    // The operation failed as a persist failure, the new blob is gone, and
    // both the record and the old blob are untouched
    assert!(matches!(result, Err(AppError::PersistFailed(_))));
    assert_eq!(*record.lock().unwrap(), original);
    assert!(store.contains(&original.key));
    assert_eq!(store.object_count(), 1);
}

#[tokio::test]
async fn failed_replacement_upload_leaves_everything_untouched() {
    let store = Arc::new(InMemoryObjectStore::new());
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);
    let original = seed_thumbnail(&coordinator).await;

    // Every upload through this coordinator fails
    let failing = Arc::new(InMemoryObjectStore::failing_from(0));
    let failing_coordinator = WriteCoordinator::new(Arc::clone(&failing) as Arc<dyn ObjectStore>);

    let swap_ran = Arc::new(Mutex::new(false));
    let swap_ran_in = Arc::clone(&swap_ran);
    let result: Result<(), AppError> = failing_coordinator
        .replace_asset(
            thumbnail_source(),
            Some(original.key.clone()),
            move |_| async move {
                *swap_ran_in.lock().unwrap() = true;
                Ok(())
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::AssetUploadFailed(_))));
    assert!(!*swap_ran.lock().unwrap());
    assert!(store.contains(&original.key));
}

#[tokio::test]
async fn replace_without_a_previous_asset_skips_cleanup() {
    let store = Arc::new(InMemoryObjectStore::new());
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let stored = Arc::new(Mutex::new(None));
    let stored_in = Arc::clone(&stored);
    coordinator
        .replace_asset(thumbnail_source(), None, move |replacement| async move {
            *stored_in.lock().unwrap() = Some(replacement);
            Ok(())
        })
        .await
        .expect("first cover image set");

    let current = stored.lock().unwrap().clone().expect("swap ran");
    assert!(store.contains(&current.key));
    assert_eq!(store.object_count(), 1);
}

#[tokio::test]
async fn discard_removes_committed_assets_best_effort() {
    let store = Arc::new(InMemoryObjectStore::new());
    let coordinator = WriteCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let record = coordinator
        .create_with_assets(vec![video_source(), thumbnail_source()], |assets| async move {
            Ok(FakeRecord {
                video_key: assets[0].key.clone(),
                thumbnail_key: assets[1].key.clone(),
            })
        })
        .await
        .expect("create should succeed");

    // Record deleted first by the caller, then blobs are discarded
    coordinator
        .discard(vec![record.video_key.clone(), record.thumbnail_key.clone()])
        .await;

    assert_eq!(store.object_count(), 0);
}
