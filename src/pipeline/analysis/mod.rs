//! Model-backed reading of uploaded documents: fraud screening and
//! type classification over extracted text.

pub mod classify;
pub mod fraud;

pub use classify::*;
pub use fraud::*;

use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use super::extraction::TextExtractor;
use super::llm::LlmClient;
use super::PipelineError;
use crate::db::{FraudVerdictUpdate, RecordStore};
use crate::models::{DocumentRecord, DocumentStatus};

pub struct AnalysisEngine {
    store: Arc<dyn RecordStore>,
    extractor: Arc<TextExtractor>,
    llm: Arc<dyn LlmClient>,
    fraud_threshold: u8,
}

impl AnalysisEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        extractor: Arc<TextExtractor>,
        llm: Arc<dyn LlmClient>,
        fraud_threshold: u8,
    ) -> Self {
        Self {
            store,
            extractor,
            llm,
            fraud_threshold: fraud_threshold.max(MIN_FRAUD_THRESHOLD),
        }
    }

    /// Run fraud analysis and persist the gated verdict.
    ///
    /// Status moves to `processing` once the source file is confirmed, then
    /// to `failed` if no text comes out, or `completed` once the verdict is
    /// stored. Model failures never fail the request.
    pub async fn analyze_document(&self, document_id: &Uuid) -> Result<DocumentRecord, PipelineError> {
        let record = self.load_record(document_id).await?;
        self.store.set_status(document_id, DocumentStatus::Processing)?;

        let text = match self.extract(&record).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                self.store.set_extracted_text(document_id, None, DocumentStatus::Failed)?;
                tracing::warn!(doc_id = %document_id, "No text extracted, analysis aborted");
                return Err(PipelineError::InvalidInput(
                    "No text could be extracted from the document".into(),
                ));
            }
            Err(e) => {
                self.store.set_status(document_id, DocumentStatus::Failed)?;
                return Err(e);
            }
        };
        self.store
            .set_extracted_text(document_id, Some(&text), DocumentStatus::Processing)?;

        let analysis = run_fraud_analysis(self.llm.as_ref(), &text, self.fraud_threshold).await;
        self.store.set_fraud_verdict(
            document_id,
            &FraudVerdictUpdate {
                fraud_detected: analysis.fraud_detected,
                confidence: analysis.confidence,
                fraud_reasons: analysis.fraud_reasons,
                missing_fields: analysis.missing_fields,
                recommendations: analysis.recommendations,
            },
        )?;

        tracing::info!(
            doc_id = %document_id,
            fraud_detected = analysis.fraud_detected,
            confidence = analysis.confidence,
            "Document analyzed"
        );

        self.store
            .get_document(document_id)?
            .ok_or_else(|| PipelineError::NotFound(format!("Document {document_id} not found")))
    }

    /// Classify a document and persist only its predicted type.
    pub async fn classify_document(
        &self,
        document_id: &Uuid,
    ) -> Result<ClassificationResult, PipelineError> {
        let record = self.load_record(document_id).await?;
        let text = self.extract(&record).await?.ok_or_else(|| {
            PipelineError::InvalidInput("No text could be extracted from the document".into())
        })?;

        let result = run_classification(self.llm.as_ref(), &text).await;
        self.store.set_predicted_type(document_id, &result.predicted_type)?;

        tracing::info!(
            doc_id = %document_id,
            predicted_type = %result.predicted_type,
            confidence = result.confidence,
            "Document classified"
        );
        Ok(result)
    }

    /// Record must exist and its stored file must still be on disk.
    async fn load_record(&self, document_id: &Uuid) -> Result<DocumentRecord, PipelineError> {
        let record = self
            .store
            .get_document(document_id)?
            .ok_or_else(|| PipelineError::NotFound(format!("Document {document_id} not found")))?;

        if !tokio::fs::try_exists(Path::new(&record.storage_path))
            .await
            .unwrap_or(false)
        {
            return Err(PipelineError::InvalidInput(format!(
                "Stored file for document {document_id} is missing"
            )));
        }
        Ok(record)
    }

    async fn extract(&self, record: &DocumentRecord) -> Result<Option<String>, PipelineError> {
        Ok(self
            .extractor
            .extract_text(Path::new(&record.storage_path), &record.media_type)
            .await?)
    }
}
