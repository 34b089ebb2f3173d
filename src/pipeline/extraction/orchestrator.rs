use std::path::Path;
use std::sync::Arc;

use super::preprocess::normalize_for_ocr;
use super::types::{ExtractionStrategy, OcrEngine, PdfExtractor};
use super::ExtractionError;

/// Dispatches a stored file to the strategy its media type selects.
/// Uses trait objects for OCR and PDF extraction, enabling dependency injection.
pub struct TextExtractor {
    ocr_engine: Arc<dyn OcrEngine + Send + Sync>,
    pdf_extractor: Arc<dyn PdfExtractor + Send + Sync>,
}

impl TextExtractor {
    pub fn new(
        ocr_engine: Arc<dyn OcrEngine + Send + Sync>,
        pdf_extractor: Arc<dyn PdfExtractor + Send + Sync>,
    ) -> Self {
        Self {
            ocr_engine,
            pdf_extractor,
        }
    }

    /// Extract text from `path`.
    ///
    /// A missing path or an unsupported media type is an error. Anything that
    /// goes wrong inside the chosen strategy yields `Ok(None)`: unreadable
    /// content means "no text", never an aborted pipeline.
    pub async fn extract_text(
        &self,
        path: &Path,
        media_type: &str,
    ) -> Result<Option<String>, ExtractionError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ExtractionError::SourceNotFound(path.to_path_buf()));
        }

        let strategy = ExtractionStrategy::for_media_type(media_type)
            .ok_or_else(|| ExtractionError::UnsupportedMediaType(media_type.to_string()))?;

        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read source file");
                return Ok(None);
            }
        };

        let ocr = Arc::clone(&self.ocr_engine);
        let pdf = Arc::clone(&self.pdf_extractor);
        let outcome = tokio::task::spawn_blocking(move || {
            run_strategy(strategy, &bytes, pdf.as_ref(), ocr.as_ref())
        })
        .await
        .map_err(|e| ExtractionError::TaskFailed(e.to_string()))
        .and_then(|r| r);

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!(
                    strategy = strategy.as_str(),
                    chars = text.len(),
                    "Text extracted"
                );
                Ok(Some(text.trim().to_string()))
            }
            Ok(_) => {
                tracing::info!(strategy = strategy.as_str(), "Extraction produced no text");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(strategy = strategy.as_str(), error = %e, "Extraction failed");
                Ok(None)
            }
        }
    }
}

/// Pure bytes-to-text step for one strategy.
pub fn run_strategy(
    strategy: ExtractionStrategy,
    bytes: &[u8],
    pdf: &(dyn PdfExtractor + Send + Sync),
    ocr: &(dyn OcrEngine + Send + Sync),
) -> Result<String, ExtractionError> {
    match strategy {
        ExtractionStrategy::NativeText => pdf.extract_text(bytes),
        ExtractionStrategy::OcrWithPreprocessing => {
            let prepared = normalize_for_ocr(bytes)?;
            ocr.recognize(&prepared)
        }
    }
}
