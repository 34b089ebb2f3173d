use std::io::BufWriter;
use std::path::PathBuf;

use printpdf::*;
use uuid::Uuid;

use super::RenderError;
use crate::pipeline::storage;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 12.0;
const TITLE_LINE_MM: f32 = 9.0;
const BODY_LINE_MM: f32 = 6.0;
const TITLE_WRAP_CHARS: usize = 40;
const BODY_WRAP_CHARS: usize = 85;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.55;
const PT_TO_MM: f32 = 0.3528;

/// Renders generated documents into the generated-PDF storage area.
pub struct PdfRenderer {
    generated_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(generated_dir: PathBuf) -> Self {
        Self { generated_dir }
    }

    /// Render `content` under a centered `document_type` title. The returned
    /// path names a fully written file.
    pub async fn render_document(
        &self,
        document_type: &str,
        content: &str,
    ) -> Result<PathBuf, RenderError> {
        let title = document_type.to_string();
        let body = content.to_string();
        let bytes = tokio::task::spawn_blocking(move || build_document_pdf(&title, &body))
            .await
            .map_err(|e| RenderError::TaskFailed(e.to_string()))??;

        let file_name = format!(
            "{}-{}-{}.pdf",
            file_stem_for(document_type),
            chrono::Utc::now().timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.generated_dir.join(file_name);
        storage::write_atomically(&path, &bytes).await?;

        tracing::info!(
            document_type,
            path = %path.display(),
            size = bytes.len(),
            "Document rendered"
        );
        Ok(path)
    }
}

/// Build PDF bytes: centered bold title, then wrapped body text with page
/// breaks as needed.
pub fn build_document_pdf(title: &str, content: &str) -> Result<Vec<u8>, RenderError> {
    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(format!("PDF font error: {e}")))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM - TITLE_LINE_MM;

    for line in wrap_text(title, TITLE_WRAP_CHARS) {
        layer.use_text(&line, TITLE_SIZE, Mm(centered_x(&line, TITLE_SIZE)), Mm(y), &bold);
        y -= TITLE_LINE_MM;
    }
    y -= BODY_LINE_MM;

    for paragraph in content.lines() {
        for line in wrap_text(paragraph, BODY_WRAP_CHARS) {
            if y < MARGIN_MM {
                let (page, layer_idx) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                layer = doc.get_page(page).get_layer(layer_idx);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            layer.use_text(&line, BODY_SIZE, Mm(MARGIN_MM), Mm(y), &font);
            y -= BODY_LINE_MM;
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| RenderError::Pdf(format!("PDF buffer error: {e}")))
}

fn centered_x(text: &str, size: f32) -> f32 {
    let width_mm = text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM;
    ((PAGE_WIDTH_MM - width_mm) / 2.0).max(MARGIN_MM)
}

/// `Cover Letter` -> `Cover_Letter`; anything outside [A-Za-z0-9_-] becomes `_`.
pub fn file_stem_for(document_type: &str) -> String {
    let stem: String = document_type
        .trim()
        .chars()
        .take(80)
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "Document".to_string()
    } else {
        stem
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
