// ⚙️ Application Configuration
// Command-line flags with BILLSENSE_* environment fallbacks

use crate::keywords::DEFAULT_MAX_KEYWORDS;
use crate::store::DEFAULT_KEYWORD_LIMIT;
use clap::Args;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Settings shared by the CLI and the HTTP server
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Keywords extracted per feedback
    #[arg(long, env = "BILLSENSE_MAX_KEYWORDS", default_value_t = DEFAULT_MAX_KEYWORDS)]
    pub max_keywords: usize,

    /// Keywords reported by the insights view
    #[arg(long, env = "BILLSENSE_INSIGHTS_KEYWORDS", default_value_t = DEFAULT_KEYWORD_LIMIT)]
    pub insights_keyword_limit: usize,

    /// Tesseract binary name or path
    #[arg(long, env = "BILLSENSE_TESSERACT_BIN", default_value = "tesseract")]
    pub tesseract_bin: String,

    /// Tesseract language code
    #[arg(long, env = "BILLSENSE_OCR_LANGUAGE", default_value = "eng")]
    pub ocr_language: String,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "BILLSENSE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            max_keywords: DEFAULT_MAX_KEYWORDS,
            insights_keyword_limit: DEFAULT_KEYWORD_LIMIT,
            tesseract_bin: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Load `.env` if present. Call before parsing arguments.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for JSON output. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: AppConfig,
    }

    #[test]
    fn test_default_matches_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.max_keywords, 10);
        assert_eq!(config.insights_keyword_limit, 20);
        assert_eq!(config.tesseract_bin, "tesseract");
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "billsense",
            "--max-keywords",
            "5",
            "--tesseract-bin",
            "/opt/tesseract",
        ]);
        assert_eq!(cli.config.max_keywords, 5);
        assert_eq!(cli.config.tesseract_bin, "/opt/tesseract");
        assert_eq!(cli.config.ocr_language, "eng");
    }
}
