use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::format::{sanitize_filename, MediaKind};
use super::hash::content_checksum;
use super::ImportError;
use crate::db::RecordStore;
use crate::models::DocumentRecord;
use crate::pipeline::storage;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// A raw upload as received from the transport.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Upload result returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub message: String,
    pub document_id: Uuid,
}

/// Validates raw uploads, writes them to the uploads area and records them.
pub struct DocumentIngestor {
    store: Arc<dyn RecordStore>,
    uploads_dir: PathBuf,
    max_upload_bytes: u64,
}

impl DocumentIngestor {
    pub fn new(store: Arc<dyn RecordStore>, uploads_dir: PathBuf, max_upload_bytes: u64) -> Self {
        Self {
            store,
            uploads_dir,
            max_upload_bytes,
        }
    }

    pub fn uploads_dir(&self) -> &PathBuf {
        &self.uploads_dir
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Validate and persist one upload. Every rejection happens before the
    /// file is written.
    pub async fn upload_document(
        &self,
        owner_id: &str,
        file: Option<UploadFile>,
    ) -> Result<UploadReceipt, ImportError> {
        let file = file.ok_or(ImportError::MissingFile)?;
        let owner_id = Uuid::parse_str(owner_id.trim())
            .map_err(|_| ImportError::InvalidOwnerId(owner_id.to_string()))?;

        let kind = MediaKind::from_declared(&file.media_type)
            .ok_or_else(|| ImportError::UnsupportedMediaType(file.media_type.clone()))?;

        if file.bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        let size = file.bytes.len() as u64;
        if size > self.max_upload_bytes {
            return Err(ImportError::FileTooLarge {
                size_mb: size as f64 / (1024.0 * 1024.0),
                max_mb: self.max_upload_bytes / (1024 * 1024),
            });
        }
        if MediaKind::sniff(&file.bytes) != Some(kind) {
            return Err(ImportError::ContentMismatch {
                declared: kind.as_mime().to_string(),
            });
        }

        let document_id = Uuid::new_v4();
        if document_id.get_version() != Some(uuid::Version::Random) {
            return Err(ImportError::InvalidGeneratedId(document_id));
        }

        storage::ensure_dir(&self.uploads_dir).await?;

        let file_name = sanitize_filename(&file.name);
        let stored_name = format!(
            "{}-{}-{}",
            document_id,
            chrono::Utc::now().timestamp_millis(),
            file_name
        );
        let storage_path = self.uploads_dir.join(stored_name);
        storage::write_atomically(&storage_path, &file.bytes).await?;

        let record = DocumentRecord::pending(
            document_id,
            owner_id,
            file_name,
            kind.as_mime().to_string(),
            storage_path.to_string_lossy().to_string(),
            content_checksum(&file.bytes),
        );

        if let Err(e) = self.store.insert_document(&record) {
            tracing::error!(document_id = %document_id, error = %e, "Record write failed after file write");
            if let Err(rm) = tokio::fs::remove_file(&storage_path).await {
                tracing::warn!(path = %storage_path.display(), error = %rm, "Could not remove unrecorded upload");
            }
            return Err(e.into());
        }

        tracing::info!(
            document_id = %document_id,
            owner_id = %owner_id,
            media_type = kind.as_mime(),
            size,
            "Document uploaded"
        );

        Ok(UploadReceipt {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            document_id,
        })
    }

    pub fn get_document(&self, document_id: &Uuid) -> Result<DocumentRecord, ImportError> {
        self.store
            .get_document(document_id)?
            .ok_or(ImportError::DocumentNotFound(*document_id))
    }
}
