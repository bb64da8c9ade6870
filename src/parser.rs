// 🧾 Bill Text Parser
// Regex-driven extraction of service/price pairs, date, and total from OCR text
//
// Three independent line layouts are matched on every line and merged:
//   1. "Haircut $25.00"     (name, whitespace, price)
//   2. "Haircut: $25.00"    (name, colon, price)
//   3. "Haircut - $25.00"   (name, dash, price)
// The layouts overlap on purpose. Filtering (name length, date-shaped names,
// price range) and dedup are what keep the output clean.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Smallest price accepted as a billed service
pub const MIN_PRICE: f64 = 0.01;

/// Largest price accepted as a billed service
pub const MAX_PRICE: f64 = 999_999.0;

/// Names shorter than this are OCR debris
const MIN_NAME_CHARS: usize = 3;

// ============================================================================
// CORE TYPES
// ============================================================================

/// ServiceItem - one billed line recovered from OCR text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub name: String,
    pub price: f64,
}

impl ServiceItem {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        ServiceItem {
            name: name.into(),
            price,
        }
    }

    /// Dedup key: lower-cased name + price in cents
    fn dedup_key(&self) -> (String, i64) {
        (self.name.to_lowercase(), (self.price * 100.0).round() as i64)
    }
}

/// ParsedBill - structured view of one OCR'd bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedBill {
    pub raw_text: String,
    pub services: Vec<ServiceItem>,

    /// Sum of service prices; None when no services were found
    pub total_price: Option<f64>,

    /// Date exactly as it appeared in the text
    pub date: Option<String>,
}

// ============================================================================
// SERVICE LAYOUTS
// ============================================================================

/// ServiceLayout - the three "label then price" shapes seen on bills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLayout {
    /// `Haircut $25.00`
    Spaced,
    /// `Haircut: $25.00`
    Colon,
    /// `Haircut - $25.00`
    Dash,
}

// name charset: letters, digits, whitespace, - & , .
// price: digits, optional point with up to two decimals; the next char may be
// anything but a digit, '/' or '-' so dates like 03/15/2024 never yield a price
static SPACED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([a-z0-9\s\-&,.]+?)\s+\$?(\d+(?:\.\d{0,2})?)(?:[^\d/\-]|$)").unwrap()
});

static COLON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([a-z0-9\s\-&,.]+?):\s+\$?(\d+(?:\.\d{0,2})?)(?:[^\d/\-]|$)").unwrap()
});

static DASH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([a-z0-9\s\-&,.]+?)\s+-\s+\$?(\d+(?:\.\d{0,2})?)(?:[^\d/\-]|$)").unwrap()
});

static DATE_LIKE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}$").unwrap());

impl ServiceLayout {
    /// Every layout, in the order the passes run
    pub const ALL: [ServiceLayout; 3] = [
        ServiceLayout::Spaced,
        ServiceLayout::Colon,
        ServiceLayout::Dash,
    ];

    pub fn name(&self) -> &str {
        match self {
            ServiceLayout::Spaced => "spaced",
            ServiceLayout::Colon => "colon",
            ServiceLayout::Dash => "dash",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            ServiceLayout::Spaced => &*SPACED_RE,
            ServiceLayout::Colon => &*COLON_RE,
            ServiceLayout::Dash => &*DASH_RE,
        }
    }

    /// Candidates on a single line, before filtering
    fn candidates<'a>(&self, line: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.regex().captures_iter(line).filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let price = caps.get(2)?.as_str();
            Some((name, price))
        })
    }
}

/// Strip whitespace and dangling separators left over from the layout
fn clean_name(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | '&'))
}

pub fn is_valid_price(price: f64) -> bool {
    (MIN_PRICE..=MAX_PRICE).contains(&price)
}

/// Validate one regex candidate. None means expected OCR noise.
fn to_service(raw_name: &str, raw_price: &str) -> Option<ServiceItem> {
    let name = clean_name(raw_name);

    if name.chars().count() < MIN_NAME_CHARS {
        trace!(name, "rejected: name too short");
        return None;
    }
    if DATE_LIKE_NAME_RE.is_match(name) {
        trace!(name, "rejected: name is a date");
        return None;
    }

    let price: f64 = match raw_price.trim().parse() {
        Ok(p) => p,
        Err(_) => {
            trace!(raw_price, "rejected: unparsable price");
            return None;
        }
    };
    if !is_valid_price(price) {
        trace!(name, price, "rejected: price out of range");
        return None;
    }

    Some(ServiceItem::new(name, price))
}

// ============================================================================
// PARSING
// ============================================================================

/// Extract service/price pairs from OCR text.
///
/// All three layouts run over every line; the first occurrence of each
/// (lower-cased name, price) pair wins.
pub fn parse_services(text: &str) -> Vec<ServiceItem> {
    let mut services = Vec::new();
    let mut seen: HashSet<(String, i64)> = HashSet::new();

    for layout in ServiceLayout::ALL {
        for line in text.lines() {
            for (raw_name, raw_price) in layout.candidates(line) {
                let Some(service) = to_service(raw_name, raw_price) else {
                    continue;
                };

                if seen.insert(service.dedup_key()) {
                    trace!(layout = layout.name(), name = %service.name, price = service.price, "service found");
                    services.push(service);
                }
            }
        }
    }

    services
}

static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}\b").unwrap());

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[/\-]\d{1,2}[/\-]\d{1,2}\b").unwrap());

static SPELLED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}\b",
    )
    .unwrap()
});

/// Shortest match accepted as a date
const MIN_DATE_CHARS: usize = 6;

/// Find the bill date.
///
/// Patterns are tried in priority order (MM/DD/YYYY, YYYY-MM-DD,
/// Month DD, YYYY); the matched text is returned verbatim.
pub fn parse_date(text: &str) -> Option<String> {
    let patterns: [&Regex; 3] = [&*NUMERIC_DATE_RE, &*ISO_DATE_RE, &*SPELLED_DATE_RE];

    patterns.iter().find_map(|re| {
        re.find_iter(text)
            .map(|m| m.as_str())
            .find(|date| date.len() >= MIN_DATE_CHARS)
            .map(str::to_string)
    })
}

/// Sum of all service prices, or None when there are no services.
pub fn calculate_total(services: &[ServiceItem]) -> Option<f64> {
    if services.is_empty() {
        return None;
    }
    Some(services.iter().map(|s| s.price).sum())
}

/// Run the full parse over raw OCR text
pub fn parse_bill(raw_text: &str) -> ParsedBill {
    let services = parse_services(raw_text);
    let date = parse_date(raw_text);
    let total_price = calculate_total(&services);

    debug!(
        services = services.len(),
        date = ?date,
        total = ?total_price,
        "bill parsed"
    );

    ParsedBill {
        raw_text: raw_text.to_string(),
        services,
        total_price,
        date,
    }
}

// ============================================================================
// TESTS
// ============================================================================
