// BillSense CLI
// billsense bill <IMAGE> | parse-text <FILE|-> | feedback [TEXT]... [--file PATH]

use anyhow::{Context, Result};
use billsense::config::{init_tracing, load_dotenv};
use billsense::{
    parse_bill, AppConfig, BillProcessor, FeedbackAnalyzer, FeedbackStore, LexiconProvider,
    TesseractExtractor,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "billsense", version, about = "Bill OCR parsing and feedback analytics")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// OCR a bill image with tesseract and print the parsed bill
    Bill {
        /// Image file (png, jpg, tiff, ...)
        image: PathBuf,
    },

    /// Parse already-extracted bill text ("-" reads stdin)
    ParseText {
        input: PathBuf,
    },

    /// Analyze feedback and print per-entry results plus aggregate insights
    Feedback {
        /// Feedback texts, one per argument
        texts: Vec<String>,

        /// File with one feedback per line
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.config.log_level);

    match cli.command {
        Command::Bill { image } => run_bill(&cli.config, &image),
        Command::ParseText { input } => run_parse_text(&input),
        Command::Feedback { texts, file } => run_feedback(&cli.config, texts, file.as_deref()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_bill(config: &AppConfig, image: &Path) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;

    let extractor = TesseractExtractor::new(&config.tesseract_bin, &config.ocr_language);
    let processor = BillProcessor::new(Arc::new(extractor));

    let outcome = processor.process_image(&bytes)?;
    if !outcome.success {
        eprintln!("⚠️  {}", outcome.message);
    }
    print_json(&outcome)
}

fn run_parse_text(input: &Path) -> Result<()> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    print_json(&parse_bill(text.trim()))
}

fn run_feedback(config: &AppConfig, mut texts: Vec<String>, file: Option<&Path>) -> Result<()> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        texts.extend(
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string),
        );
    }

    if texts.is_empty() {
        anyhow::bail!("No feedback given (pass TEXT arguments or --file)");
    }

    let store = Arc::new(FeedbackStore::new());
    let analyzer = FeedbackAnalyzer::new(Arc::new(LexiconProvider::new()), Arc::clone(&store))
        .with_max_keywords(config.max_keywords);

    let mut skipped = 0;
    for text in &texts {
        match analyzer.analyze(text) {
            Ok(analysis) => print_json(&analysis)?,
            Err(e) => {
                eprintln!("❌ Skipped {:?}: {}", text, e);
                skipped += 1;
            }
        }
    }

    eprintln!("✓ Analyzed {} feedback ({} skipped)", store.total_count(), skipped);
    print_json(&store.insights(config.insights_keyword_limit))
}
