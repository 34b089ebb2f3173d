//! Record persistence port used by the pipeline.
//!
//! The pipeline never touches a `Connection` directly; it goes through
//! `RecordStore` so tests and alternative backends can be injected.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use uuid::Uuid;

use super::{repository, sqlite, DatabaseError};
use crate::models::{DocumentRecord, DocumentStatus, GeneratedArtifact};

/// A gated fraud verdict ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudVerdictUpdate {
    pub fraud_detected: bool,
    pub confidence: u8,
    pub fraud_reasons: Vec<String>,
    pub missing_fields: Vec<String>,
    pub recommendations: String,
}

pub trait RecordStore: Send + Sync {
    fn insert_document(&self, doc: &DocumentRecord) -> Result<(), DatabaseError>;
    fn get_document(&self, id: &Uuid) -> Result<Option<DocumentRecord>, DatabaseError>;
    fn set_status(&self, id: &Uuid, status: DocumentStatus) -> Result<(), DatabaseError>;
    fn set_extracted_text(
        &self,
        id: &Uuid,
        text: Option<&str>,
        status: DocumentStatus,
    ) -> Result<(), DatabaseError>;
    fn set_fraud_verdict(&self, id: &Uuid, verdict: &FraudVerdictUpdate) -> Result<(), DatabaseError>;
    fn set_predicted_type(&self, id: &Uuid, predicted_type: &str) -> Result<(), DatabaseError>;
    fn storage_paths(&self) -> Result<Vec<String>, DatabaseError>;

    fn insert_artifact(&self, artifact: &GeneratedArtifact) -> Result<(), DatabaseError>;
    fn get_artifact(&self, id: &Uuid) -> Result<Option<GeneratedArtifact>, DatabaseError>;
    fn list_artifacts(&self, owner_id: &Uuid) -> Result<Vec<GeneratedArtifact>, DatabaseError>;
}

/// SQLite-backed store holding one serialized connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_database(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_memory_database()?),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl RecordStore for SqliteStore {
    fn insert_document(&self, doc: &DocumentRecord) -> Result<(), DatabaseError> {
        repository::insert_document(&*self.conn()?, doc)
    }

    fn get_document(&self, id: &Uuid) -> Result<Option<DocumentRecord>, DatabaseError> {
        repository::get_document(&*self.conn()?, id)
    }

    fn set_status(&self, id: &Uuid, status: DocumentStatus) -> Result<(), DatabaseError> {
        repository::update_document_status(&*self.conn()?, id, status)
    }

    fn set_extracted_text(
        &self,
        id: &Uuid,
        text: Option<&str>,
        status: DocumentStatus,
    ) -> Result<(), DatabaseError> {
        repository::update_extracted_text(&*self.conn()?, id, text, status)
    }

    fn set_fraud_verdict(&self, id: &Uuid, verdict: &FraudVerdictUpdate) -> Result<(), DatabaseError> {
        repository::update_fraud_verdict(
            &*self.conn()?,
            id,
            verdict.fraud_detected,
            verdict.confidence,
            &verdict.fraud_reasons,
            &verdict.missing_fields,
            &verdict.recommendations,
        )
    }

    fn set_predicted_type(&self, id: &Uuid, predicted_type: &str) -> Result<(), DatabaseError> {
        repository::update_predicted_type(&*self.conn()?, id, predicted_type)
    }

    fn storage_paths(&self) -> Result<Vec<String>, DatabaseError> {
        repository::list_storage_paths(&*self.conn()?)
    }

    fn insert_artifact(&self, artifact: &GeneratedArtifact) -> Result<(), DatabaseError> {
        repository::insert_artifact(&*self.conn()?, artifact)
    }

    fn get_artifact(&self, id: &Uuid) -> Result<Option<GeneratedArtifact>, DatabaseError> {
        repository::get_artifact(&*self.conn()?, id)
    }

    fn list_artifacts(&self, owner_id: &Uuid) -> Result<Vec<GeneratedArtifact>, DatabaseError> {
        repository::list_artifacts_for_owner(&*self.conn()?, owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_delegates_to_repository() {
        let store = SqliteStore::open_in_memory().unwrap();
        let doc = DocumentRecord::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "scan.png".into(),
            "image/png".into(),
            "/u/scan.png".into(),
            "ff".into(),
        );
        store.insert_document(&doc).unwrap();
        store.set_status(&doc.id, DocumentStatus::Processing).unwrap();
        let loaded = store.get_document(&doc.id).unwrap().unwrap();
        assert_eq!(loaded.status, DocumentStatus::Processing);
        assert_eq!(store.storage_paths().unwrap(), vec!["/u/scan.png".to_string()]);
    }

    #[test]
    fn duplicate_insert_is_sqlite_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let doc = DocumentRecord::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "a.pdf".into(),
            "application/pdf".into(),
            "/u/a.pdf".into(),
            "00".into(),
        );
        store.insert_document(&doc).unwrap();
        assert!(matches!(
            store.insert_document(&doc),
            Err(DatabaseError::Sqlite(_))
        ));
    }
}
