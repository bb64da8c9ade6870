// 🔄 Processing Pipelines
// Image → ParsedBill, and feedback text → sentiment + keywords + stored record

use crate::error::PipelineError;
use crate::keywords::{extract_keywords, DEFAULT_MAX_KEYWORDS};
use crate::normalizer::normalize;
use crate::ocr::TextExtractor;
use crate::parser::{parse_bill, ParsedBill};
use crate::sentiment::{analyze_sentiment, SentimentResult};
use crate::signals::SignalProvider;
use crate::store::{FeedbackRecord, FeedbackStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const NO_TEXT_MESSAGE: &str = "No text could be extracted from the image";
pub const BILL_SUCCESS_MESSAGE: &str = "OCR processing completed successfully";
pub const EMPTY_FEEDBACK_MESSAGE: &str = "Feedback text cannot be empty";
pub const NO_CONTENT_MESSAGE: &str = "Feedback text contains no valid content after preprocessing";

// ============================================================================
// BILL PIPELINE
// ============================================================================

/// Result of one bill upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillOutcome {
    #[serde(flatten)]
    pub bill: ParsedBill,
    pub success: bool,
    pub message: String,
}

/// BillProcessor - OCR collaborator + bill parser
#[derive(Clone)]
pub struct BillProcessor {
    extractor: Arc<dyn TextExtractor>,
}

impl BillProcessor {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        BillProcessor { extractor }
    }

    /// OCR the image and parse the text.
    ///
    /// Blank OCR output is not an error: it comes back as an outcome with
    /// `success = false` and an empty bill.
    pub fn process_image(&self, image_bytes: &[u8]) -> Result<BillOutcome, PipelineError> {
        if image_bytes.is_empty() {
            return Err(PipelineError::input("Empty file uploaded"));
        }

        let text = self.extractor.extract_text(image_bytes)?;
        let text = text.trim();

        if text.is_empty() {
            warn!(bytes = image_bytes.len(), "OCR produced no text");
            return Ok(BillOutcome {
                bill: ParsedBill {
                    raw_text: String::new(),
                    services: Vec::new(),
                    total_price: None,
                    date: None,
                },
                success: false,
                message: NO_TEXT_MESSAGE.to_string(),
            });
        }

        let bill = parse_bill(text);
        info!(
            services = bill.services.len(),
            total = ?bill.total_price,
            "Bill processed"
        );

        Ok(BillOutcome {
            bill,
            success: true,
            message: BILL_SUCCESS_MESSAGE.to_string(),
        })
    }
}

// ============================================================================
// FEEDBACK PIPELINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackAnalysis {
    pub sentiment: SentimentResult,
    pub keywords: Vec<String>,
}

/// FeedbackAnalyzer - classify, extract keywords, record
#[derive(Clone)]
pub struct FeedbackAnalyzer {
    provider: Arc<dyn SignalProvider>,
    store: Arc<FeedbackStore>,
    max_keywords: usize,
}

impl FeedbackAnalyzer {
    pub fn new(provider: Arc<dyn SignalProvider>, store: Arc<FeedbackStore>) -> Self {
        FeedbackAnalyzer {
            provider,
            store,
            max_keywords: DEFAULT_MAX_KEYWORDS,
        }
    }

    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords;
        self
    }

    pub fn store(&self) -> &Arc<FeedbackStore> {
        &self.store
    }

    /// Analyze one piece of feedback and append it to the store.
    ///
    /// The record keeps the text exactly as submitted; analysis runs on the
    /// normalized form.
    pub fn analyze(&self, raw: &str) -> Result<FeedbackAnalysis, PipelineError> {
        if raw.trim().is_empty() {
            return Err(PipelineError::input(EMPTY_FEEDBACK_MESSAGE));
        }

        let cleaned = normalize(raw);
        if cleaned.is_empty() {
            return Err(PipelineError::input(NO_CONTENT_MESSAGE));
        }

        let sentiment = analyze_sentiment(self.provider.as_ref(), &cleaned);
        let keywords = extract_keywords(self.provider.as_ref(), &cleaned, self.max_keywords);

        info!(
            label = %sentiment.label(),
            confidence = sentiment.confidence(),
            keywords = keywords.len(),
            "Feedback analyzed"
        );

        self.store
            .append(FeedbackRecord::new(raw, &sentiment, keywords.clone()));

        Ok(FeedbackAnalysis { sentiment, keywords })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::sentiment::SentimentLabel;
    use crate::signals::{LexiconProvider, LinguisticSignals};
    use anyhow::{anyhow, Result};

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract_text(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenOcr;

    impl TextExtractor for BrokenOcr {
        fn extract_text(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
            Err(ExtractionError::ExtractionFailed("engine crashed".to_string()))
        }
    }

    struct FailingProvider;

    impl SignalProvider for FailingProvider {
        fn signals(&self, _text: &str) -> Result<LinguisticSignals> {
            Err(anyhow!("engine unavailable"))
        }
    }

    fn analyzer() -> FeedbackAnalyzer {
        FeedbackAnalyzer::new(Arc::new(LexiconProvider::new()), Arc::new(FeedbackStore::new()))
    }

    #[test]
    fn test_bill_from_ocr_text() {
        let processor = BillProcessor::new(Arc::new(FixedText(
            "  Haircut $25.00\nShampoo - $10.00\nDate: 03/15/2024\n\n",
        )));

        let outcome = processor.process_image(b"fake image").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, BILL_SUCCESS_MESSAGE);
        assert_eq!(outcome.bill.raw_text, "Haircut $25.00\nShampoo - $10.00\nDate: 03/15/2024");
        assert_eq!(outcome.bill.services.len(), 2);
        assert_eq!(outcome.bill.total_price, Some(35.0));
        assert_eq!(outcome.bill.date.as_deref(), Some("03/15/2024"));
    }

    #[test]
    fn test_blank_ocr_is_unsuccessful_outcome() {
        let processor = BillProcessor::new(Arc::new(FixedText("  \n\t ")));

        let outcome = processor.process_image(b"fake image").unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, NO_TEXT_MESSAGE);
        assert!(outcome.bill.services.is_empty());
        assert_eq!(outcome.bill.total_price, None);
    }

    #[test]
    fn test_empty_image_rejected() {
        let processor = BillProcessor::new(Arc::new(FixedText("Haircut $25")));
        let err = processor.process_image(&[]).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn test_ocr_failure_propagates() {
        let processor = BillProcessor::new(Arc::new(BrokenOcr));
        let err = processor.process_image(b"fake image").unwrap_err();

        assert!(!err.is_input());
        assert!(err.to_string().starts_with("Failed to process image:"));
    }

    #[test]
    fn test_bill_outcome_json_is_flat() {
        let processor = BillProcessor::new(Arc::new(FixedText("Haircut $25.00")));
        let outcome = processor.process_image(b"fake image").unwrap();

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["services"][0]["name"], "Haircut");
        assert_eq!(json["total_price"], 25.0);
        assert_eq!(json["success"], true);
        assert!(json["date"].is_null());
    }

    #[test]
    fn test_feedback_analyzed_and_stored() {
        let analyzer = analyzer();
        let raw = "  I absolutely love this product! The quality is excellent.  ";

        let analysis = analyzer.analyze(raw).unwrap();
        assert_eq!(analysis.sentiment.label(), SentimentLabel::Positive);
        assert!(analysis.keywords.contains(&"product".to_string()));
        assert!(analysis.keywords.contains(&"quality".to_string()));

        let records = analyzer.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].feedback_text, raw);
        assert_eq!(records[0].keywords, analysis.keywords);
        assert_eq!(records[0].sentiment_label, SentimentLabel::Positive);
    }

    #[test]
    fn test_empty_feedback_rejected() {
        let analyzer = analyzer();
        let err = analyzer.analyze("   \n").unwrap_err();

        assert_eq!(err.to_string(), EMPTY_FEEDBACK_MESSAGE);
        assert_eq!(analyzer.store().total_count(), 0);
    }

    #[test]
    fn test_symbol_only_feedback_rejected() {
        let analyzer = analyzer();
        let err = analyzer.analyze("@#$%^&*").unwrap_err();

        assert_eq!(err.to_string(), NO_CONTENT_MESSAGE);
        assert_eq!(analyzer.store().total_count(), 0);
    }

    #[test]
    fn test_engine_failure_still_records_neutral() {
        let analyzer =
            FeedbackAnalyzer::new(Arc::new(FailingProvider), Arc::new(FeedbackStore::new()));

        let analysis = analyzer.analyze("Something happened.").unwrap();
        assert_eq!(analysis.sentiment.label(), SentimentLabel::Neutral);
        assert!((analysis.sentiment.confidence() - 0.15).abs() < 1e-9);
        assert!(analysis.keywords.is_empty());
        assert_eq!(analyzer.store().total_count(), 1);
    }

    #[test]
    fn test_max_keywords_applied() {
        let analyzer = analyzer().with_max_keywords(1);
        let analysis = analyzer
            .analyze("The delivery was late and the packaging was damaged.")
            .unwrap();

        assert!(analysis.keywords.len() <= 1);
    }
}
