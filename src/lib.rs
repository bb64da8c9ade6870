// BillSense - Core Library
// Bill OCR parsing + customer feedback analytics, shared by the CLI and API server

pub mod config;
pub mod error;
pub mod keywords;
pub mod normalizer;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod sentiment;
pub mod signals;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ExtractionError, PipelineError};
pub use keywords::extract_keywords;
pub use normalizer::normalize;
pub use ocr::{TesseractExtractor, TextExtractor};
pub use parser::{
    calculate_total, parse_bill, parse_date, parse_services,
    ParsedBill, ServiceItem, ServiceLayout,
};
pub use pipeline::{BillOutcome, BillProcessor, FeedbackAnalysis, FeedbackAnalyzer};
pub use sentiment::{analyze_sentiment, classify, SentimentLabel, SentimentResult};
pub use signals::{LexiconProvider, LinguisticSignals, SignalProvider, TaggedToken};
pub use store::{
    FeedbackRecord, FeedbackSnapshot, FeedbackStore,
    Insights, KeywordStat, SentimentDistribution,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
