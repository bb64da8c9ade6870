// 📷 OCR Collaborator
// Image bytes → raw text, via the tesseract command-line tool

use crate::error::ExtractionError;
use std::io::Write;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, error};

/// TextExtractor - the image → text collaborator
///
/// An empty string is a valid answer ("no text found"), not an error.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Tesseract OCR via command-line
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    /// Binary name or path
    binary: String,

    /// Tesseract language code (e.g. "eng")
    language: String,
}

impl TesseractExtractor {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        TesseractExtractor {
            binary: binary.into(),
            language: language.into(),
        }
    }

    /// Sniff the bytes and return the file extension tesseract should see
    fn image_extension(image_bytes: &[u8]) -> Result<&'static str, ExtractionError> {
        match infer::get(image_bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(kind.extension()),
            Some(kind) => Err(ExtractionError::UnsupportedFileType(kind.mime_type().to_string())),
            None => Err(ExtractionError::UnsupportedFileType(
                "unrecognized data".to_string(),
            )),
        }
    }

    fn run_tesseract(&self, image_path: &std::path::Path) -> Result<String, ExtractionError> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "tesseract failed: {}",
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                ExtractionError::ToolNotFound(format!("{} (install tesseract-ocr)", self.binary)),
            ),
            Err(e) => Err(ExtractionError::Io(e)),
        }
    }
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract_text(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let extension = Self::image_extension(image_bytes)?;

        let mut file = tempfile::Builder::new()
            .prefix("billsense-")
            .suffix(&format!(".{}", extension))
            .tempfile()?;
        file.write_all(image_bytes)?;
        file.flush()?;

        let start = Instant::now();
        let result = self.run_tesseract(file.path());
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => debug!(chars = text.len(), elapsed_ms, "OCR complete"),
            Err(e) => error!(elapsed_ms, "OCR extraction failed: {}", e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_png_is_recognized() {
        assert_eq!(TesseractExtractor::image_extension(TINY_PNG).unwrap(), "png");
    }

    #[test]
    fn test_non_image_rejected() {
        let extractor = TesseractExtractor::default();
        let err = extractor.extract_text(b"just some text, not an image").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_pdf_rejected_as_non_image() {
        let err = TesseractExtractor::image_extension(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(m) if m == "application/pdf"));
    }

    #[test]
    fn test_missing_binary() {
        let extractor = TesseractExtractor::new("billsense-no-such-tesseract", "eng");
        let err = extractor.extract_text(TINY_PNG).unwrap_err();
        assert!(matches!(err, ExtractionError::ToolNotFound(_)));
    }
}
