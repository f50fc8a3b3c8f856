/// Cross-store write coordination
///
/// Every mutation that stores a blob in the object store and a record in
/// PostgreSQL goes through this coordinator. The two stores fail
/// independently; the coordinator guarantees they end in a consistent joint
/// state: a record never references a blob that was not uploaded, and a
/// successfully persisted record never loses its blobs to a cleanup.
///
/// Each operation moves through an explicit phase sequence,
/// `Staging -> Persisting -> Committed`, or drops into `Compensating` and
/// ends `Failed`. Compensation deletes run on a detached task that is
/// awaited, so a caller disconnecting mid-operation cannot leave staged
/// blobs orphaned.
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{AppError, Result};
use crate::services::storage::{AssetKind, ObjectStore, StoredAsset};

/// One binary input to a coordinated write
pub struct AssetSource {
    /// Name used in logs and error messages, e.g. "avatar", "thumbnail"
    pub label: &'static str,
    pub data: Bytes,
    pub kind: AssetKind,
    pub content_type: String,
}

impl AssetSource {
    pub fn new(label: &'static str, data: Bytes, kind: AssetKind, content_type: String) -> Self {
        Self {
            label,
            data,
            kind,
            content_type,
        }
    }
}

/// Progress of a coordinated write, carried in log records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePhase {
    Staging,
    Persisting,
    Committed,
    Compensating,
    Failed,
}

impl WritePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Persisting => "persisting",
            Self::Committed => "committed",
            Self::Compensating => "compensating",
            Self::Failed => "failed",
        }
    }
}

pub struct WriteCoordinator {
    store: Arc<dyn ObjectStore>,
}

impl WriteCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Create-with-assets: upload every source in order, then run the
    /// metadata persist step with the staged assets (in source order).
    ///
    /// A failed upload removes every asset already staged by this operation
    /// before `AssetUploadFailed` returns. A failed persist removes all
    /// staged assets before `PersistFailed` returns. The caller never
    /// observes partial success.
    pub async fn create_with_assets<T, F, Fut>(
        &self,
        sources: Vec<AssetSource>,
        persist: F,
    ) -> Result<T>
    where
        F: FnOnce(Vec<StoredAsset>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let staged = self.stage(sources).await?;

        tracing::debug!(
            phase = WritePhase::Persisting.as_str(),
            assets = staged.len(),
            "persisting metadata record"
        );

        match persist(staged.clone()).await {
            Ok(value) => {
                tracing::debug!(phase = WritePhase::Committed.as_str(), "write committed");
                Ok(value)
            }
            Err(err) => {
                tracing::error!(
                    phase = WritePhase::Failed.as_str(),
                    %err,
                    "metadata persist failed after upload"
                );
                self.compensate(staged).await;
                Err(AppError::PersistFailed(err.to_string()))
            }
        }
    }

    /// Update-with-asset: upload the replacement, run the single metadata
    /// swap, and only after the swap commits delete the previous asset.
    ///
    /// A failed swap removes the replacement and returns `PersistFailed`;
    /// the old asset and old metadata are untouched. The post-commit delete
    /// of the previous asset is best-effort: a failure leaks an unreferenced
    /// blob, which is logged and never surfaced.
    pub async fn replace_asset<T, F, Fut>(
        &self,
        source: AssetSource,
        previous_key: Option<String>,
        swap: F,
    ) -> Result<T>
    where
        F: FnOnce(StoredAsset) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let label = source.label;

        tracing::debug!(phase = WritePhase::Staging.as_str(), asset = label, "uploading replacement asset");
        let replacement = self
            .store
            .upload(source.data, source.kind, &source.content_type)
            .await
            .map_err(|err| {
                tracing::error!(asset = label, %err, "replacement upload failed");
                AppError::AssetUploadFailed(format!("failed to upload {label}"))
            })?;

        tracing::debug!(phase = WritePhase::Persisting.as_str(), asset = label, "swapping metadata reference");
        match swap(replacement.clone()).await {
            Ok(value) => {
                tracing::debug!(phase = WritePhase::Committed.as_str(), asset = label, "swap committed");
                if let Some(old_key) = previous_key {
                    self.discard(vec![old_key]).await;
                }
                Ok(value)
            }
            Err(err) => {
                tracing::error!(
                    phase = WritePhase::Failed.as_str(),
                    asset = label,
                    %err,
                    "metadata swap failed after upload"
                );
                self.compensate(vec![replacement]).await;
                Err(AppError::PersistFailed(err.to_string()))
            }
        }
    }

    /// Best-effort removal of blobs whose records have already been removed
    /// or repointed. Failures leak a blob; they are logged and swallowed.
    pub async fn discard(&self, keys: Vec<String>) {
        if keys.is_empty() {
            return;
        }

        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move {
            for key in keys {
                if let Err(err) = store.delete(&key).await {
                    tracing::warn!(%key, %err, "post-commit cleanup failed, blob leaked");
                }
            }
        });

        // The task owns its Arc to the store, so it finishes even if the
        // request future is dropped first.
        if task.await.is_err() {
            tracing::warn!("cleanup task aborted before completion");
        }
    }

    /// Upload sources one at a time; compensate staged uploads on failure
    async fn stage(&self, sources: Vec<AssetSource>) -> Result<Vec<StoredAsset>> {
        let mut staged = Vec::with_capacity(sources.len());

        for source in sources {
            let label = source.label;
            tracing::debug!(phase = WritePhase::Staging.as_str(), asset = label, "uploading asset");

            match self
                .store
                .upload(source.data, source.kind, &source.content_type)
                .await
            {
                Ok(asset) => staged.push(asset),
                Err(err) => {
                    tracing::error!(
                        phase = WritePhase::Failed.as_str(),
                        asset = label,
                        %err,
                        "asset upload failed"
                    );
                    self.compensate(staged).await;
                    return Err(AppError::AssetUploadFailed(format!(
                        "failed to upload {label}"
                    )));
                }
            }
        }

        Ok(staged)
    }

    /// Remove staged assets after a failed step.
    ///
    /// Runs detached from the caller and is awaited, so the error returns
    /// only once the object store is consistent again, and a dropped request
    /// future cannot interrupt the deletes. A delete failure here orphans a
    /// blob; it is logged at error level with the key for later repair.
    async fn compensate(&self, staged: Vec<StoredAsset>) {
        if staged.is_empty() {
            return;
        }

        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move {
            for asset in staged {
                match store.delete(&asset.key).await {
                    Ok(()) => tracing::info!(
                        phase = WritePhase::Compensating.as_str(),
                        key = %asset.key,
                        "removed staged asset"
                    ),
                    Err(err) => tracing::error!(
                        key = %asset.key,
                        %err,
                        "compensation delete failed, asset orphaned"
                    ),
                }
            }
        });

        if task.await.is_err() {
            tracing::error!("compensation task aborted before completion");
        }
    }
}
