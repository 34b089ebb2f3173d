use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use super::types::{DraftDocument, MergedBundle};
use super::GENERATION_FAILED;
use crate::db::RecordStore;
use crate::models::GeneratedArtifact;
use crate::pipeline::llm::{parse_array, prompt, LlmClient};
use crate::pipeline::render::{BundleMerger, PdfRenderer};
use crate::pipeline::requirements::RequirementCatalog;
use crate::pipeline::{parse_identifier, PipelineError};

/// Composes, renders and records the applicant-authored documents a visa
/// category requires.
pub struct DocumentGenerator {
    store: Arc<dyn RecordStore>,
    catalog: Arc<RequirementCatalog>,
    llm: Arc<dyn LlmClient>,
    renderer: Arc<PdfRenderer>,
    merger: Arc<BundleMerger>,
}

impl DocumentGenerator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        catalog: Arc<RequirementCatalog>,
        llm: Arc<dyn LlmClient>,
        renderer: Arc<PdfRenderer>,
        merger: Arc<BundleMerger>,
    ) -> Self {
        Self {
            store,
            catalog,
            llm,
            renderer,
            merger,
        }
    }

    /// Generate every applicant-authored document, then publish them as the
    /// owner's bundle in generation order.
    pub async fn generate_and_merge_documents(
        &self,
        owner_id: &str,
        visa_category: &str,
        answers: &serde_json::Value,
        reference_uploads: &[String],
    ) -> Result<MergedBundle, PipelineError> {
        let owner = parse_identifier(owner_id, "ownerId")?;
        let artifacts = self
            .generate_documents(owner_id, visa_category, answers, reference_uploads)
            .await?;

        let paths: Vec<PathBuf> = artifacts.iter().map(|a| PathBuf::from(&a.pdf_path)).collect();
        let merged = self.merger.merge_pdf_files(&paths, &owner).await?;

        Ok(MergedBundle {
            merged_pdf_path: merged.to_string_lossy().to_string(),
        })
    }

    /// Generate, render and persist documents without merging them.
    /// Artifacts come back in generation order.
    pub async fn generate_documents(
        &self,
        owner_id: &str,
        visa_category: &str,
        answers: &serde_json::Value,
        reference_uploads: &[String],
    ) -> Result<Vec<GeneratedArtifact>, PipelineError> {
        let owner = parse_identifier(owner_id, "ownerId")?;
        if !answers.is_object() {
            return Err(PipelineError::InvalidInput(
                "answers must be a JSON object".into(),
            ));
        }

        let profile = self.catalog.get_required_documents(visa_category).await?;
        if profile.is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "No required documents found for visa category {}",
                profile.visa_category
            )));
        }

        let drafts = self
            .request_drafts(&profile.visa_category, &profile.required_documents, answers, reference_uploads)
            .await?;

        let mut artifacts = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let pdf_path = self
                .renderer
                .render_document(&draft.document_type, &draft.content)
                .await?;

            let artifact = GeneratedArtifact {
                id: Uuid::new_v4(),
                owner_id: owner,
                visa_category: profile.visa_category.clone(),
                document_type: draft.document_type,
                format: draft.format,
                page_count: draft.page_count,
                content: draft.content,
                pdf_path: pdf_path.to_string_lossy().to_string(),
                created_at: chrono::Local::now().naive_local(),
            };
            self.store.insert_artifact(&artifact)?;
            artifacts.push(artifact);
        }

        tracing::info!(
            owner_id = %owner,
            visa_category = %profile.visa_category,
            count = artifacts.len(),
            "Documents generated"
        );
        Ok(artifacts)
    }

    pub fn list_generated_documents(
        &self,
        owner_id: &str,
    ) -> Result<Vec<GeneratedArtifact>, PipelineError> {
        let owner = parse_identifier(owner_id, "ownerId")?;
        Ok(self.store.list_artifacts(&owner)?)
    }

    /// Path of a generated PDF that still exists on disk.
    pub async fn get_generated_document_path(
        &self,
        artifact_id: &Uuid,
    ) -> Result<PathBuf, PipelineError> {
        let artifact = self.store.get_artifact(artifact_id)?.ok_or_else(|| {
            PipelineError::NotFound(format!("Generated document {artifact_id} not found"))
        })?;

        let path = PathBuf::from(&artifact.pdf_path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::warn!(artifact_id = %artifact_id, "Generated PDF missing from disk");
            return Err(PipelineError::NotFound(format!(
                "Generated document {artifact_id} file is missing"
            )));
        }
        Ok(path)
    }

    async fn request_drafts(
        &self,
        visa_category: &str,
        required_documents: &[String],
        answers: &serde_json::Value,
        reference_uploads: &[String],
    ) -> Result<Vec<DraftDocument>, PipelineError> {
        let prompt = prompt::build_generation_prompt(
            visa_category,
            required_documents,
            answers,
            reference_uploads,
        );

        let reply = self.llm.generate(&prompt).await.map_err(|e| {
            tracing::error!(visa_category, error = %e, "Generation call failed");
            PipelineError::Internal(GENERATION_FAILED.into())
        })?;

        let drafts: Vec<DraftDocument> = parse_array(&reply).map_err(|e| {
            tracing::error!(visa_category, error = %e, "Generation reply unusable");
            tracing::debug!(reply = %reply, "Raw generation reply");
            PipelineError::Internal(GENERATION_FAILED.into())
        })?;

        if drafts.is_empty() {
            tracing::error!(visa_category, "Model returned an empty document batch");
            return Err(PipelineError::Internal(GENERATION_FAILED.into()));
        }
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::pipeline::llm::MockLlmClient;
    use crate::test_support::page_texts;
    use serde_json::json;

    struct Fixture {
        dir: tempfile::TempDir,
        store: Arc<SqliteStore>,
        llm: Arc<MockLlmClient>,
        generator: DocumentGenerator,
    }

    fn fixture(llm: MockLlmClient) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let llm = Arc::new(llm);
        let generator = DocumentGenerator::new(
            store.clone(),
            Arc::new(RequirementCatalog::new(llm.clone())),
            llm.clone(),
            Arc::new(PdfRenderer::new(dir.path().join("generated"))),
            Arc::new(BundleMerger::new(dir.path().join("merged"))),
        );
        Fixture {
            dir,
            store,
            llm,
            generator,
        }
    }

    const REQUIREMENTS: &str =
        r#"{"visaType":"Student","requiredDocuments":["Passport","Statement of Purpose","Study Plan"]}"#;
    const BATCH: &str = r#"[
        {"documentType":"Statement of Purpose","format":"Essay","pageCount":1,"content":"SOPBODY"},
        {"documentType":"Study Plan","format":"Plan","pageCount":1,"content":"PLANBODY"}
    ]"#;

    fn answers() -> serde_json::Value {
        json!({"name": "A. Applicant", "program": "MSc Physics"})
    }

    #[tokio::test]
    async fn generate_and_merge_keeps_generation_order() {
        let fx = fixture(MockLlmClient::sequence(&[REQUIREMENTS, BATCH]));
        let owner = Uuid::new_v4();

        let bundle = fx
            .generator
            .generate_and_merge_documents(&owner.to_string(), "Student", &answers(), &[])
            .await
            .unwrap();

        assert!(bundle.merged_pdf_path.ends_with(&format!("Merged_Documents_{owner}.pdf")));
        let stored = fx.store.list_artifacts(&owner).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].document_type, "Statement of Purpose");
        assert_eq!(stored[0].visa_category, "Student");

        let merged = page_texts(&std::fs::read(&bundle.merged_pdf_path).unwrap());
        let expected: Vec<String> = stored
            .iter()
            .flat_map(|a| page_texts(&std::fs::read(&a.pdf_path).unwrap()))
            .collect();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged, expected);
    }

    #[tokio::test]
    async fn prose_wrapped_batch_is_salvaged() {
        let wrapped = format!("Here are your documents:\n{BATCH}\nGood luck!");
        let fx = fixture(MockLlmClient::sequence(&[REQUIREMENTS, &wrapped]));
        let artifacts = fx
            .generator
            .generate_documents(&Uuid::new_v4().to_string(), "Student", &answers(), &[])
            .await
            .unwrap();
        assert_eq!(artifacts.len(), 2);
    }

    #[tokio::test]
    async fn invalid_owner_rejected_before_model_call() {
        let fx = fixture(MockLlmClient::sequence(&[REQUIREMENTS, BATCH]));
        let err = fx
            .generator
            .generate_and_merge_documents("not-a-uuid", "Student", &answers(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(fx.llm.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_requirements_is_invalid_input() {
        let fx = fixture(MockLlmClient::sequence(&[r#"{"requiredDocuments":[]}"#]));
        let owner = Uuid::new_v4();
        let err = fx
            .generator
            .generate_documents(&owner.to_string(), "Unknown", &answers(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(fx.llm.call_count(), 1);
        assert!(fx.store.list_artifacts(&owner).unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_requirements_publishes_no_bundle() {
        let fx = fixture(MockLlmClient::sequence(&[r#"{"requiredDocuments":[]}"#]));
        let owner = Uuid::new_v4();
        let err = fx
            .generator
            .generate_and_merge_documents(&owner.to_string(), "Unknown", &answers(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(fx.store.list_artifacts(&owner).unwrap().is_empty());

        let bundle = fx
            .dir
            .path()
            .join("merged")
            .join(format!("Merged_Documents_{owner}.pdf"));
        assert!(!bundle.exists());
    }

    #[tokio::test]
    async fn incomplete_element_fails_whole_batch() {
        let bad = r#"[
            {"documentType":"Statement of Purpose","format":"Essay","pageCount":1,"content":"x"},
            {"documentType":"Study Plan","pageCount":1,"content":"y"}
        ]"#;
        let fx = fixture(MockLlmClient::sequence(&[REQUIREMENTS, bad]));
        let owner = Uuid::new_v4();
        let err = fx
            .generator
            .generate_documents(&owner.to_string(), "Student", &answers(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Internal(ref m) if m == GENERATION_FAILED));
        assert!(fx.store.list_artifacts(&owner).unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_internal() {
        let fx = fixture(MockLlmClient::sequence(&[REQUIREMENTS, "[]"]));
        let err = fx
            .generator
            .generate_documents(&Uuid::new_v4().to_string(), "Student", &answers(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Internal(_)));
    }

    #[tokio::test]
    async fn requirement_failure_propagates() {
        let fx = fixture(MockLlmClient::failing());
        let err = fx
            .generator
            .generate_documents(&Uuid::new_v4().to_string(), "Student", &answers(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Internal(_)));
    }

    #[tokio::test]
    async fn reference_uploads_reach_prompt() {
        let fx = fixture(MockLlmClient::sequence(&[REQUIREMENTS, BATCH]));
        fx.generator
            .generate_documents(
                &Uuid::new_v4().to_string(),
                "Student",
                &answers(),
                &["admission_letter.pdf".to_string()],
            )
            .await
            .unwrap();
        let prompts = fx.llm.prompts();
        assert!(prompts[1].contains("admission_letter.pdf"));
        assert!(prompts[1].contains("MSc Physics"));
    }

    #[tokio::test]
    async fn generated_path_lookup() {
        let fx = fixture(MockLlmClient::sequence(&[REQUIREMENTS, BATCH]));
        let owner = Uuid::new_v4();
        let artifacts = fx
            .generator
            .generate_documents(&owner.to_string(), "Student", &answers(), &[])
            .await
            .unwrap();

        let path = fx
            .generator
            .get_generated_document_path(&artifacts[0].id)
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from(&artifacts[0].pdf_path));

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            fx.generator.get_generated_document_path(&artifacts[0].id).await,
            Err(PipelineError::NotFound(_))
        ));
        assert!(matches!(
            fx.generator.get_generated_document_path(&Uuid::new_v4()).await,
            Err(PipelineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_rejects_malformed_owner() {
        let fx = fixture(MockLlmClient::failing());
        assert!(matches!(
            fx.generator.list_generated_documents("42"),
            Err(PipelineError::InvalidInput(_))
        ));
        assert!(fx
            .generator
            .list_generated_documents(&Uuid::new_v4().to_string())
            .unwrap()
            .is_empty());
    }
}
