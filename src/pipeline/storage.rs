//! Filesystem helpers shared by the storage areas.

use std::path::Path;

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Idempotent directory creation; safe when several callers race.
pub async fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await
}

/// Write `data` to `target` through a sibling temp file and a rename, so the
/// target either holds the complete bytes or is left untouched.
pub async fn write_atomically(target: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        ensure_dir(parent).await?;
    }

    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let temp_path = target.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

    let result = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp_path, target).await
    }
    .await;

    if let Err(e) = &result {
        tracing::warn!(target = %target.display(), error = %e, "Atomic write failed");
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result
}
