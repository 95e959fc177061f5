//! Evidence store implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;

use planbot_core::traits::EvidenceStore;

/// Archives artifacts under a local directory, grouped by day, and hands
/// back a `file://` URL. Stands in for an object-storage backend when one
/// is not wired up.
pub struct FileEvidence {
    dir: PathBuf,
}

impl FileEvidence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl EvidenceStore for FileEvidence {
    async fn upload(&self, local: &Path) -> Option<String> {
        let day = Local::now().format("%Y%m%d").to_string();
        let target_dir = self.dir.join("daily_reports").join(day);
        if let Err(e) = tokio::fs::create_dir_all(&target_dir).await {
            tracing::warn!("evidence dir create failed: {e}");
            return None;
        }
        let target = target_dir.join(local.file_name()?);
        match tokio::fs::copy(local, &target).await {
            Ok(_) => Some(format!("file://{}", target.display())),
            Err(e) => {
                tracing::warn!("evidence archive failed for {}: {e}", local.display());
                None
            }
        }
    }
}

/// Evidence archiving disabled.
pub struct NullEvidence;

#[async_trait]
impl EvidenceStore for NullEvidence {
    async fn upload(&self, _local: &Path) -> Option<String> {
        None
    }
}
