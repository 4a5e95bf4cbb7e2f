//! Ticker to CIK symbol tables.
//!
//! Two source formats are understood:
//!
//! - [`SymbolTableFormat::Json`] - the SEC `company_tickers.json` layout, an object
//!   keyed arbitrarily whose values carry `ticker` and `cik_str`
//! - [`SymbolTableFormat::PipeDelimited`] - plain text lines of `TICKER|CIK`
//!
//! Each format has its own share-class separator (`BRK-B` vs `BRK.B`); keys are
//! stored normalized to that separator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};
use crate::types::{Cik, Ticker};

/// Layout of a symbol table payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolTableFormat {
    /// JSON object of `{ticker, cik_str, ...}` records.
    #[default]
    Json,
    /// `TICKER|CIK` text lines.
    #[serde(rename = "pipe")]
    PipeDelimited,
}

impl SymbolTableFormat {
    /// Share-class separator used by tickers in this format.
    #[must_use]
    pub const fn separator(&self) -> char {
        match self {
            Self::Json => '-',
            Self::PipeDelimited => '.',
        }
    }
}

impl fmt::Display for SymbolTableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::PipeDelimited => f.write_str("pipe"),
        }
    }
}

impl FromStr for SymbolTableFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pipe" | "pipe-delimited" => Ok(Self::PipeDelimited),
            other => Err(DataError::Config(format!("Unknown symbol table format: {other}"))),
        }
    }
}

/// Where to fetch the symbol table from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSource {
    /// URL of the table.
    pub url: String,
    /// Payload layout.
    pub format: SymbolTableFormat,
}

impl SymbolSource {
    /// SEC company tickers JSON.
    pub const SEC_COMPANY_TICKERS: &'static str = "https://www.sec.gov/files/company_tickers.json";

    /// Creates a source.
    #[must_use]
    pub fn new(url: impl Into<String>, format: SymbolTableFormat) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }
}

impl Default for SymbolSource {
    fn default() -> Self {
        Self::new(Self::SEC_COMPANY_TICKERS, SymbolTableFormat::Json)
    }
}

/// Normalized ticker to CIK lookup table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    separator: char,
    entries: HashMap<String, Cik>,
}

impl SymbolTable {
    /// Creates an empty table for tickers using `separator`.
    #[must_use]
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            entries: HashMap::new(),
        }
    }

    /// Parses a payload in the given format.
    ///
    /// Malformed records are skipped. A payload without a single usable record
    /// is an error.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if the payload is not in `format` or holds no
    /// usable record.
    pub fn parse(format: SymbolTableFormat, body: &str) -> Result<Self> {
        let table = match format {
            SymbolTableFormat::Json => Self::parse_json(body)?,
            SymbolTableFormat::PipeDelimited => Self::parse_pipe_delimited(body),
        };

        if table.is_empty() {
            return Err(DataError::Parse(format!("No usable entries in {format} symbol table")));
        }
        Ok(table)
    }

    fn parse_json(body: &str) -> Result<Self> {
        let records: HashMap<String, serde_json::Value> = serde_json::from_str(body)
            .map_err(|e| DataError::Parse(format!("Failed to parse company tickers: {e}")))?;

        // Keys are "0", "1", ... in SEC order; iterate in that order so the first
        // listing of a ticker wins. Records of the wrong shape are dropped here.
        let mut records: Vec<(String, JsonRecord)> = records
            .into_iter()
            .filter_map(|(key, value)| Some((key, serde_json::from_value::<JsonRecord>(value).ok()?)))
            .collect();
        records.sort_by(|(a, _), (b, _)| {
            match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        });

        let mut table = Self::new(SymbolTableFormat::Json.separator());
        for (_, record) in records {
            let (Some(ticker), Some(cik)) = (record.ticker, record.cik_str) else {
                continue;
            };
            let Some(cik) = cik.to_cik() else {
                continue;
            };
            table.insert(&Ticker::new(ticker), cik);
        }
        Ok(table)
    }

    fn parse_pipe_delimited(body: &str) -> Self {
        let mut table = Self::new(SymbolTableFormat::PipeDelimited.separator());
        for line in body.lines() {
            let mut fields = line.split('|').map(str::trim);
            let (Some(ticker), Some(cik)) = (fields.next(), fields.next()) else {
                continue;
            };
            if ticker.is_empty() {
                continue;
            }
            // Header lines and junk fail the numeric parse and are skipped.
            let Ok(cik) = cik.parse::<Cik>() else {
                continue;
            };
            table.insert(&Ticker::new(ticker), cik);
        }
        table
    }

    /// Adds an entry unless the normalized ticker is already present.
    pub fn insert(&mut self, ticker: &Ticker, cik: Cik) {
        self.entries
            .entry(ticker.normalized(self.separator))
            .or_insert(cik);
    }

    /// Looks up a ticker after normalizing it to this table's separator.
    #[must_use]
    pub fn lookup(&self, ticker: &Ticker) -> Option<&Cik> {
        self.entries.get(&ticker.normalized(self.separator))
    }

    /// Share-class separator of this table.
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One record of `company_tickers.json`.
#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    cik_str: Option<RawCik>,
}

/// `cik_str` is a number in the SEC file despite its name; accept either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCik {
    Number(u64),
    Text(String),
}

impl RawCik {
    fn to_cik(&self) -> Option<Cik> {
        match self {
            Self::Number(n) => Cik::from_number(*n).ok(),
            Self::Text(s) => s.parse().ok(),
        }
    }
}
