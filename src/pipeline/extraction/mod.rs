pub mod ocr;
pub mod orchestrator;
pub mod pdf;
pub mod preprocess;
pub mod types;

pub use ocr::*;
pub use orchestrator::*;
pub use pdf::*;
pub use preprocess::*;
pub use types::*;

use std::path::PathBuf;

use thiserror::Error;

use super::PipelineError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    #[error("Tesseract OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR support not compiled in (enable the `ocr` feature)")]
    OcrUnavailable,

    #[error("Tessdata not found at: {0}")]
    TessdataNotFound(PathBuf),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

impl From<ExtractionError> for PipelineError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::SourceNotFound(_) | ExtractionError::UnsupportedMediaType(_) => {
                Self::InvalidInput(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}
