use serde::{Deserialize, Serialize};

use super::ExtractionError;
use crate::pipeline::import::MediaKind;

/// How text is pulled out of a stored file, keyed by normalized media type.
/// Supporting a new media type means adding a variant here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Structural text layer of a digital PDF.
    NativeText,
    /// Size normalization, then OCR.
    OcrWithPreprocessing,
}

impl ExtractionStrategy {
    pub fn for_media_type(media_type: &str) -> Option<Self> {
        MediaKind::from_declared(media_type).map(|kind| {
            if kind.is_image() {
                Self::OcrWithPreprocessing
            } else {
                Self::NativeText
            }
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeText => "native_text",
            Self::OcrWithPreprocessing => "ocr_with_preprocessing",
        }
    }
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF text extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}
