use std::path::Path;

use serde::{Deserialize, Serialize};

/// Media types accepted at upload and understood by extraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Png,
    Jpeg,
}

impl MediaKind {
    /// Normalize a declared media type: case, surrounding whitespace and
    /// parameters (`; charset=...`) are ignored. `image/jpg` is accepted as
    /// an alias of `image/jpeg`.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Detect from magic bytes (NOT file extensions).
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            // PDF: starts with %PDF
            [0x25, 0x50, 0x44, 0x46, ..] => Some(Self::Pdf),
            // JPEG: starts with FF D8 FF
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            // PNG: starts with 89 50 4E 47
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }
}

/// Sanitize a filename: strip path components, replace whitespace, limit length.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(200)
        .collect();

    if clean.is_empty() || clean.chars().all(|c| c == '.') {
        "document".to_string()
    } else {
        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_types_normalized() {
        assert_eq!(MediaKind::from_declared("application/pdf"), Some(MediaKind::Pdf));
        assert_eq!(MediaKind::from_declared(" Image/PNG "), Some(MediaKind::Png));
        assert_eq!(MediaKind::from_declared("image/jpg"), Some(MediaKind::Jpeg));
        assert_eq!(
            MediaKind::from_declared("image/jpeg; quality=high"),
            Some(MediaKind::Jpeg)
        );
    }

    #[test]
    fn disallowed_types_rejected() {
        assert_eq!(MediaKind::from_declared("application/zip"), None);
        assert_eq!(MediaKind::from_declared("text/plain"), None);
        assert_eq!(MediaKind::from_declared(""), None);
    }

    #[test]
    fn sniff_magic_bytes() {
        assert_eq!(MediaKind::sniff(b"%PDF-1.7\n"), Some(MediaKind::Pdf));
        assert_eq!(
            MediaKind::sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some(MediaKind::Png)
        );
        assert_eq!(MediaKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MediaKind::Jpeg));
        assert_eq!(MediaKind::sniff(&[0x50, 0x4B, 0x03, 0x04]), None);
        assert_eq!(MediaKind::sniff(&[]), None);
    }

    #[test]
    fn image_kinds() {
        assert!(MediaKind::Png.is_image());
        assert!(MediaKind::Jpeg.is_image());
        assert!(!MediaKind::Pdf.is_image());
    }

    #[test]
    fn sanitize_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(""), "document");
        assert_eq!(sanitize_filename(".."), "document");
        assert_eq!(sanitize_filename("file\0name.pdf"), "filename.pdf");
    }

    #[test]
    fn sanitize_replaces_whitespace() {
        assert_eq!(sanitize_filename("bank statement (1).pdf"), "bank_statement_(1).pdf");
        assert_eq!(sanitize_filename("passport.pdf"), "passport.pdf");
    }
}
