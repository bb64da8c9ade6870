// 🚨 Error Taxonomy
// Typed failures that cross a pipeline boundary

use thiserror::Error;

/// Failure inside the image → text collaborator.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request-scoped pipeline failure.
///
/// Out-of-range prices and linguistic engine hiccups never show up here:
/// the former are dropped as OCR noise, the latter are absorbed with
/// neutral defaults inside the feedback pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Empty or unusable input, rejected before any work is done
    #[error("{0}")]
    Input(String),

    /// The OCR collaborator could not produce text
    #[error("Failed to process image: {0}")]
    Collaborator(#[from] ExtractionError),
}

impl PipelineError {
    pub fn input(message: impl Into<String>) -> Self {
        PipelineError::Input(message.into())
    }

    /// True when the caller sent something unusable (HTTP 400 territory)
    pub fn is_input(&self) -> bool {
        matches!(self, PipelineError::Input(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = PipelineError::input("Feedback text cannot be empty");
        assert!(err.is_input());
        assert_eq!(err.to_string(), "Feedback text cannot be empty");
    }

    #[test]
    fn test_collaborator_error_wraps_extraction() {
        let err: PipelineError = ExtractionError::ToolNotFound("tesseract".to_string()).into();
        assert!(!err.is_input());
        assert_eq!(
            err.to_string(),
            "Failed to process image: External tool not found: tesseract"
        );
    }
}
