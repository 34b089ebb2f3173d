//! Transport-agnostic application state.
//!
//! `CoreState` owns every pipeline component, wired once at start-up from
//! `AppConfig`. The HTTP layer holds it behind an `Arc` and only calls
//! through to the components.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, LlmProvider, LlmSettings, StorageLayout};
use crate::db::{DatabaseError, RecordStore, SqliteStore};
use crate::pipeline::analysis::AnalysisEngine;
use crate::pipeline::extraction::{default_ocr_engine, OcrEngine, PdfTextExtractor, TextExtractor};
use crate::pipeline::generation::DocumentGenerator;
use crate::pipeline::import::{sweep_orphaned_uploads, DocumentIngestor, ImportError};
use crate::pipeline::llm::{LlmClient, LlmError, OllamaClient, OpenAiClient};
use crate::pipeline::recommendation::VisaAdvisor;
use crate::pipeline::render::{BundleMerger, PdfRenderer};
use crate::pipeline::requirements::RequirementCatalog;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Model client error: {0}")]
    Llm(#[from] LlmError),

    #[error("Upload reconciliation failed: {0}")]
    Reconcile(#[from] ImportError),
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub storage: StorageLayout,
    pub store: Arc<dyn RecordStore>,
    pub ingestor: DocumentIngestor,
    pub analysis: AnalysisEngine,
    pub catalog: Arc<RequirementCatalog>,
    pub generator: DocumentGenerator,
    pub merger: Arc<BundleMerger>,
    pub advisor: VisaAdvisor,
    model_name: String,
}

impl CoreState {
    /// Open the record store and build the configured model and OCR clients.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        if let Some(parent) = config.storage.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&config.storage.database_path)?);
        let llm = build_llm_client(&config.llm)?;
        let ocr: Arc<dyn OcrEngine + Send + Sync> =
            Arc::from(default_ocr_engine(&config.tessdata_dir, &config.ocr_lang));

        tracing::info!(
            provider = config.llm.provider.as_str(),
            model = %config.llm.model,
            database = %config.storage.database_path.display(),
            "Core state configured"
        );

        Ok(Self::with_components(
            config.storage.clone(),
            store,
            llm,
            ocr,
            config.fraud_threshold,
            config.max_upload_bytes,
        ))
    }

    /// Wire components around explicit collaborators.
    pub fn with_components(
        storage: StorageLayout,
        store: Arc<dyn RecordStore>,
        llm: Arc<dyn LlmClient>,
        ocr: Arc<dyn OcrEngine + Send + Sync>,
        fraud_threshold: u8,
        max_upload_bytes: u64,
    ) -> Self {
        let extractor = Arc::new(TextExtractor::new(ocr, Arc::new(PdfTextExtractor)));
        let catalog = Arc::new(RequirementCatalog::new(llm.clone()));
        let renderer = Arc::new(PdfRenderer::new(storage.generated_dir.clone()));
        let merger = Arc::new(BundleMerger::new(storage.merged_dir.clone()));

        Self {
            ingestor: DocumentIngestor::new(store.clone(), storage.uploads_dir.clone(), max_upload_bytes),
            analysis: AnalysisEngine::new(store.clone(), extractor, llm.clone(), fraud_threshold),
            generator: DocumentGenerator::new(
                store.clone(),
                catalog.clone(),
                llm.clone(),
                renderer,
                merger.clone(),
            ),
            advisor: VisaAdvisor::new(llm.clone()),
            model_name: llm.model_name().to_string(),
            catalog,
            merger,
            store,
            storage,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Remove uploads left behind by a crash between file and record writes.
    pub fn reconcile_uploads(&self) -> Result<usize, CoreError> {
        let removed = sweep_orphaned_uploads(self.store.as_ref(), &self.storage.uploads_dir)?;
        if removed > 0 {
            tracing::warn!(removed, "Orphaned uploads removed");
        }
        Ok(removed)
    }
}

fn build_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmError> {
    Ok(match settings.provider {
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            &settings.base_url,
            &settings.model,
            settings.timeout_secs,
        )?),
        LlmProvider::OpenAi => Arc::new(OpenAiClient::new(
            &settings.base_url,
            &settings.model,
            settings.api_key.as_deref().unwrap_or_default(),
            settings.timeout_secs,
        )?),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pipeline::extraction::MockOcrEngine;
    use crate::pipeline::llm::MockLlmClient;

    /// Core state over temp storage, an in-memory store and a scripted model.
    pub(crate) fn test_core(dir: &std::path::Path, llm: MockLlmClient) -> CoreState {
        CoreState::with_components(
            StorageLayout::under(dir.to_path_buf()),
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(llm),
            Arc::new(MockOcrEngine::new("")),
            85,
            10 * 1024 * 1024,
        )
    }

    #[test]
    fn components_share_storage_layout() {
        let dir = tempfile::tempdir().unwrap();
        let core = test_core(dir.path(), MockLlmClient::failing());
        assert_eq!(core.ingestor.uploads_dir(), &dir.path().join("uploads"));
        assert_eq!(core.model_name(), "mock");
    }

    #[test]
    fn reconcile_without_uploads_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let core = test_core(dir.path(), MockLlmClient::failing());
        assert_eq!(core.reconcile_uploads().unwrap(), 0);
    }

    #[test]
    fn from_config_opens_database_and_ollama_client() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_lookup(|key| {
            (key == "DOSSIER_DATA_DIR").then(|| dir.path().to_string_lossy().to_string())
        })
        .unwrap();
        let core = CoreState::from_config(&config).unwrap();
        assert_eq!(core.model_name(), config.llm.model);
    }
}
