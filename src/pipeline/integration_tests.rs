//! End-to-end flows across ingestion, extraction, analysis and generation,
//! wired the way `CoreState` wires them but against mocks.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::analysis::AnalysisEngine;
use super::extraction::{MockOcrEngine, PdfTextExtractor, TextExtractor};
use super::generation::DocumentGenerator;
use super::import::{sweep_orphaned_uploads, DocumentIngestor, UploadFile};
use super::llm::MockLlmClient;
use super::render::{BundleMerger, PdfRenderer};
use super::requirements::RequirementCatalog;
use super::PipelineError;
use crate::db::{RecordStore, SqliteStore};
use crate::models::DocumentStatus;
use crate::test_support::{make_test_pdf, make_test_png};

struct Pipeline {
    dir: tempfile::TempDir,
    store: Arc<SqliteStore>,
    ingestor: DocumentIngestor,
    analysis: AnalysisEngine,
}

fn pipeline(llm: MockLlmClient, ocr_text: &str) -> Pipeline {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let ingestor = DocumentIngestor::new(store.clone(), dir.path().join("uploads"), 10 * 1024 * 1024);
    let extractor = Arc::new(TextExtractor::new(
        Arc::new(MockOcrEngine::new(ocr_text)),
        Arc::new(PdfTextExtractor),
    ));
    let analysis = AnalysisEngine::new(store.clone(), extractor, Arc::new(llm), 85);
    Pipeline {
        dir,
        store,
        ingestor,
        analysis,
    }
}

fn pdf_upload(name: &str, pages: &[&str]) -> UploadFile {
    UploadFile {
        name: name.into(),
        media_type: "application/pdf".into(),
        bytes: make_test_pdf(pages),
    }
}

#[tokio::test]
async fn upload_then_analyze_completes_with_verdict() {
    let p = pipeline(
        MockLlmClient::new(
            "```json\n{\"fraudDetected\":false,\"confidence\":12,\"fraudReasons\":[],\"missingFields\":[\"Issue date\"],\"recommendations\":\"Looks consistent\"}\n```",
        ),
        "",
    );
    let owner = Uuid::new_v4();

    let receipt = p
        .ingestor
        .upload_document(&owner.to_string(), Some(pdf_upload("bank statement.pdf", &["Balance 5000 EUR"])))
        .await
        .unwrap();
    let pending = p.store.get_document(&receipt.document_id).unwrap().unwrap();
    assert_eq!(pending.status, DocumentStatus::Pending);

    let record = p.analysis.analyze_document(&receipt.document_id).await.unwrap();
    assert_eq!(record.status, DocumentStatus::Completed);
    assert!(!record.fraud_detected);
    assert_eq!(record.confidence, 12);
    assert!(record.fraud_reasons.is_empty());
    assert_eq!(record.missing_fields, vec!["Issue date".to_string()]);
    assert_eq!(record.recommendations, "Looks consistent");
    assert!(record.extracted_text.unwrap_or_default().contains("Balance"));
}

#[tokio::test]
async fn low_confidence_fraud_claim_is_gated_end_to_end() {
    let p = pipeline(
        MockLlmClient::new(
            r#"{"fraudDetected":true,"confidence":60,"fraudReasons":["Font mismatch"],"missingFields":[],"recommendations":"Check"}"#,
        ),
        "",
    );
    let receipt = p
        .ingestor
        .upload_document(&Uuid::new_v4().to_string(), Some(pdf_upload("letter.pdf", &["Employment letter"])))
        .await
        .unwrap();

    let record = p.analysis.analyze_document(&receipt.document_id).await.unwrap();
    assert!(!record.fraud_detected);
    assert!(record.fraud_reasons.is_empty());
    assert_eq!(record.confidence, 60);
}

#[tokio::test]
async fn image_upload_goes_through_ocr() {
    let p = pipeline(
        MockLlmClient::new(r#"{"predictedType":"Passport","confidence":88,"summary":"Bio page"}"#),
        "P<UTOERIKSSON<<ANNA<MARIA",
    );
    let receipt = p
        .ingestor
        .upload_document(
            &Uuid::new_v4().to_string(),
            Some(UploadFile {
                name: "scan.png".into(),
                media_type: "image/png".into(),
                bytes: make_test_png(40, 20),
            }),
        )
        .await
        .unwrap();

    let result = p.analysis.classify_document(&receipt.document_id).await.unwrap();
    assert_eq!(result.predicted_type, "Passport");
    let record = p.store.get_document(&receipt.document_id).unwrap().unwrap();
    assert_eq!(record.predicted_type.as_deref(), Some("Passport"));
    assert_eq!(record.status, DocumentStatus::Pending);
}

#[tokio::test]
async fn sweep_keeps_recorded_uploads() {
    let p = pipeline(MockLlmClient::failing(), "");
    let receipt = p
        .ingestor
        .upload_document(&Uuid::new_v4().to_string(), Some(pdf_upload("a.pdf", &["A"])))
        .await
        .unwrap();
    let stray = p.ingestor.uploads_dir().join("stray.pdf");
    std::fs::write(&stray, b"%PDF-1.4").unwrap();

    let removed = sweep_orphaned_uploads(p.store.as_ref(), p.ingestor.uploads_dir()).unwrap();
    assert_eq!(removed, 1);
    assert!(!stray.exists());
    let kept = p.store.get_document(&receipt.document_id).unwrap().unwrap();
    assert!(std::path::Path::new(&kept.storage_path).exists());
}

#[tokio::test]
async fn generation_publishes_bundle_readable_via_merger() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let llm = Arc::new(MockLlmClient::sequence(&[
        r#"{"requiredDocuments":["Cover Letter"]}"#,
        r#"[{"documentType":"Cover Letter","format":"Letter","pageCount":1,"content":"Dear Officer"}]"#,
    ]));
    let merger = Arc::new(BundleMerger::new(dir.path().join("merged")));
    let generator = DocumentGenerator::new(
        store,
        Arc::new(RequirementCatalog::new(llm.clone())),
        llm,
        Arc::new(PdfRenderer::new(dir.path().join("generated"))),
        merger.clone(),
    );
    let owner = Uuid::new_v4();

    assert!(merger.get_latest_merged_pdf_path(&owner).await.is_err());
    let bundle = generator
        .generate_and_merge_documents(&owner.to_string(), "Tourist", &json!({"name": "A"}), &[])
        .await
        .unwrap();
    let latest = merger.get_latest_merged_pdf_path(&owner).await.unwrap();
    assert_eq!(latest.to_string_lossy(), bundle.merged_pdf_path);

    let doc = lopdf::Document::load(&latest).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn analysis_of_deleted_upload_is_invalid_input() {
    let p = pipeline(MockLlmClient::failing(), "");
    let receipt = p
        .ingestor
        .upload_document(&Uuid::new_v4().to_string(), Some(pdf_upload("gone.pdf", &["x"])))
        .await
        .unwrap();
    let record = p.store.get_document(&receipt.document_id).unwrap().unwrap();
    std::fs::remove_file(&record.storage_path).unwrap();

    let err = p.analysis.analyze_document(&receipt.document_id).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
    assert!(p.dir.path().exists());
}
