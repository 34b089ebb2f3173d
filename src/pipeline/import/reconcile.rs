use std::collections::HashSet;
use std::ffi::OsString;
use std::path::Path;

use super::ImportError;
use crate::db::RecordStore;

/// Remove files in the uploads area that no document record references.
///
/// An upload whose record write never landed (crash between the two writes)
/// leaves such a file behind. Run at start-up, before requests are served.
/// Files are matched to records by stored file name, which embeds the
/// document id, so the same directory reached through another path spelling
/// keeps its uploads. Returns the number of files removed.
pub fn sweep_orphaned_uploads(
    store: &dyn RecordStore,
    uploads_dir: &Path,
) -> Result<usize, ImportError> {
    let entries = match std::fs::read_dir(uploads_dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let known: HashSet<OsString> = store
        .storage_paths()?
        .iter()
        .filter_map(|p| Path::new(p).file_name().map(OsString::from))
        .collect();

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || known.contains(&entry.file_name()) {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned upload");
            }
        }
    }

    if removed > 0 {
        tracing::info!(files_removed = removed, "Swept orphaned uploads");
    }
    Ok(removed)
}
