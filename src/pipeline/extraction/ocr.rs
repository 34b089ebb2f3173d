use super::types::OcrEngine;
use super::ExtractionError;

/// Bundled Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct BundledTesseract {
    tessdata_dir: std::path::PathBuf,
    lang: String,
}

#[cfg(feature = "ocr")]
impl BundledTesseract {
    pub fn new(tessdata_dir: &std::path::Path, lang: &str) -> Result<Self, ExtractionError> {
        let primary = lang.split('+').next().unwrap_or("eng");
        if !tessdata_dir.join(format!("{primary}.traineddata")).exists() {
            return Err(ExtractionError::TessdataNotFound(tessdata_dir.to_path_buf()));
        }
        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            lang: lang.to_string(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for BundledTesseract {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let tessdata_str = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?;

        let tess = tesseract::Tesseract::new(Some(tessdata_str), Some(&self.lang))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))
    }
}

/// Stand-in used when the binary was built without the `ocr` feature, or
/// when tessdata is missing. Every call fails, which extraction treats as
/// "no text".
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        Err(ExtractionError::OcrUnavailable)
    }
}

/// Pick the best OCR engine this build supports.
pub fn default_ocr_engine(
    tessdata_dir: &std::path::Path,
    lang: &str,
) -> Box<dyn OcrEngine + Send + Sync> {
    #[cfg(feature = "ocr")]
    {
        match BundledTesseract::new(tessdata_dir, lang) {
            Ok(engine) => return Box::new(engine),
            Err(e) => tracing::warn!(error = %e, "Tesseract unavailable, image OCR disabled"),
        }
    }
    #[cfg(not(feature = "ocr"))]
    {
        tracing::info!(
            tessdata = %tessdata_dir.display(),
            lang,
            "Built without OCR support, image uploads will yield no text"
        );
    }
    Box::new(UnavailableOcr)
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_engine_always_fails() {
        assert!(matches!(
            UnavailableOcr.recognize(b"png"),
            Err(ExtractionError::OcrUnavailable)
        ));
    }

    #[test]
    fn mock_engine_counts_calls() {
        let mock = MockOcrEngine::new("PASSPORT");
        assert_eq!(mock.recognize(b"x").unwrap(), "PASSPORT");
        assert_eq!(mock.calls(), 1);
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn default_engine_without_feature_is_unavailable() {
        let engine = default_ocr_engine(std::path::Path::new("/nonexistent"), "eng");
        assert!(engine.recognize(b"x").is_err());
    }
}
