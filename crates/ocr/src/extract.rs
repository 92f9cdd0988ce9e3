use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tally_core::{ExtractorConfig, Money};

use crate::types::{ExtractedDate, ExtractedTotal, ExtractionResult};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// No calendar validation; the short form only allows a 0-2 leading day digit.
re!(re_date_short_year,
    r"[01][0-9][-/. ][0-2][0-9][-/. ][0-9]{2}");
re!(re_date_long_year,
    r"(?:0[1-9]|1[012])[-/. ](?:0[1-9]|[12][0-9]|3[01])[-/. ](?:19|20)[0-9]{2}");
// Plain decimal only; `_` digit separators are not accepted.
re!(re_plain_number,
    r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)$");

const DEFAULT_MARKERS: &[char] = &['$'];

// ── Public extraction API ─────────────────────────────────────────────────────

/// Pulls a receipt total and date out of the fragments of one OCR pass.
///
/// Holds only configuration; every call starts from scratch.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract<S: AsRef<str>>(&self, fragments: &[S]) -> ExtractionResult {
        let scan = scan_total(fragments, self.config.ceiling, &self.config.currency_markers);
        ExtractionResult {
            total: scan.total(),
            date: find_date(fragments),
            marker: scan.marker,
        }
    }
}

/// Largest amount strictly between zero and `ceiling`, formatted to two
/// decimals with a `$` prefix when any fragment carried one. Falls back to a
/// zero amount when nothing qualifies.
pub fn extract_total<S: AsRef<str>>(fragments: &[S], ceiling: Decimal) -> String {
    let scan = scan_total(fragments, ceiling, DEFAULT_MARKERS);
    match scan.total() {
        Some(total) => total.to_string(),
        None => Money::zero().format_with(scan.marker),
    }
}

/// Like [`extract_total`] but reports absence instead of a zero default.
pub fn find_total<S: AsRef<str>>(
    fragments: &[S],
    ceiling: Decimal,
    markers: &[char],
) -> Option<ExtractedTotal> {
    scan_total(fragments, ceiling, markers).total()
}

/// First fragment that looks like a date, verbatim, or an empty string.
pub fn extract_date<S: AsRef<str>>(fragments: &[S]) -> String {
    find_date(fragments).map(|d| d.raw).unwrap_or_default()
}

pub fn find_date<S: AsRef<str>>(fragments: &[S]) -> Option<ExtractedDate> {
    fragments.iter().enumerate().find_map(|(idx, f)| {
        let text = f.as_ref();
        (re_date_short_year().is_match(text) || re_date_long_year().is_match(text))
            .then(|| ExtractedDate { raw: text.to_string(), source: idx })
    })
}

// ── Total scan ────────────────────────────────────────────────────────────────

struct TotalScan {
    best: Option<(usize, Money)>,
    marker: Option<char>,
}

impl TotalScan {
    fn total(&self) -> Option<ExtractedTotal> {
        self.best.map(|(source, amount)| ExtractedTotal {
            amount,
            marker: self.marker,
            source,
        })
    }
}

fn scan_total<S: AsRef<str>>(fragments: &[S], ceiling: Decimal, markers: &[char]) -> TotalScan {
    let mut scan = TotalScan { best: None, marker: None };
    let mut running_max = Decimal::ZERO;

    for (idx, fragment) in fragments.iter().enumerate() {
        let text = fragment.as_ref();
        let mut candidates = Vec::with_capacity(2);

        let trimmed = text.trim();
        if re_plain_number().is_match(trimmed) {
            if let Ok(value) = Decimal::from_str(trimmed) {
                candidates.push(value);
            }
        }

        if let Some(marker) = text.chars().find(|c| markers.contains(c)) {
            scan.marker.get_or_insert(marker);
            candidates.push(parse_marked_amount(text));
        }

        // Bounds apply to the displayed two-place amount.
        for amount in candidates.into_iter().map(Money::from_decimal) {
            if amount.value() < ceiling && amount.value() > running_max {
                running_max = amount.value();
                scan.best = Some((idx, amount));
            }
        }
    }

    scan
}

/// Keep only digits and decimal points, then parse. Unparseable input counts as zero.
fn parse_marked_amount(text: &str) -> Decimal {
    let stripped: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    match Decimal::from_str(&stripped) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(fragment = text, stripped = %stripped, error = %e,
                "currency fragment has no parseable amount, counting as zero");
            Decimal::ZERO
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
