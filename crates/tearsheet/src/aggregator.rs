//! Metrics aggregation over XBRL company concepts.
//!
//! For each tracked concept the aggregator fetches the filer's fact history,
//! keeps the facts from the configured filing forms, trims to the most recent
//! period ends and merges everything into one [`MetricsTable`]. Each concept
//! succeeds or fails on its own; the outcome of every concept is kept in a
//! [`ConceptReport`] so callers can show what went missing.
//!
//! The standalone net income figure is fetched separately by
//! [`MetricsAggregator::latest_net_income`] and never read from the table.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use tearsheet_core::{
    Cik, ConceptFact, ConceptSeries, DataError, FilingFactsProvider, FormFilter, MetricsTable,
    NetIncomeFact, Result, SeriesPoint,
};

/// A tracked financial concept: the column label and the XBRL tag behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Concept {
    /// Human label used as the column header.
    pub label: &'static str,
    /// XBRL tag in the configured taxonomy.
    pub tag: &'static str,
}

impl Concept {
    /// Creates a concept.
    #[must_use]
    pub const fn new(label: &'static str, tag: &'static str) -> Self {
        Self { label, tag }
    }
}

/// The concepts shown in the metrics table, in column order.
///
/// "Net Margin" shares its tag with "Net Income" and is fetched twice.
pub const TRACKED_CONCEPTS: [Concept; 10] = [
    Concept::new("Revenue", "Revenues"),
    Concept::new("Net Income", "NetIncomeLoss"),
    Concept::new("Operating Margin", "OperatingIncomeLoss"),
    Concept::new("Net Margin", "NetIncomeLoss"),
    Concept::new("Cash from Operations", "NetCashProvidedByUsedInOperatingActivities"),
    Concept::new("Cash from Investing", "NetCashProvidedByUsedInInvestingActivities"),
    Concept::new("Free Cash Flow", "FreeCashFlow"),
    Concept::new("Short Term Debt", "ShortTermDebt"),
    Concept::new("Long Term Debt", "LongTermDebtNoncurrent"),
    Concept::new("Cash and Equivalents", "CashAndCashEquivalentsAtCarryingValue"),
];

/// What the aggregator fetches and how it trims it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// XBRL namespace for every concept.
    pub taxonomy: String,
    /// Table columns, in order.
    pub concepts: Vec<Concept>,
    /// Most recent period ends kept per concept before the merge.
    pub table_rows: usize,
    /// Forms accepted for table values.
    pub table_forms: FormFilter,
    /// Tag of the standalone net income fact.
    pub net_income_tag: String,
    /// Forms accepted for the standalone net income fact.
    pub net_income_forms: FormFilter,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            taxonomy: "us-gaap".to_string(),
            concepts: TRACKED_CONCEPTS.to_vec(),
            table_rows: 5,
            table_forms: FormFilter::Quarterly,
            net_income_tag: "NetIncomeLoss".to_string(),
            net_income_forms: FormFilter::QuarterlyOrAnnual,
        }
    }
}

/// Outcome of one concept.
#[derive(Debug)]
pub struct ConceptReport {
    /// The concept requested.
    pub concept: Concept,
    /// The trimmed series, or why it could not be built.
    pub result: Result<ConceptSeries>,
}

impl ConceptReport {
    /// Returns true if the concept produced a series.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every concept outcome plus the merged table of the ones that loaded.
#[derive(Debug)]
pub struct MetricsReport {
    /// One report per configured concept, in configuration order.
    pub concepts: Vec<ConceptReport>,
    /// Outer merge of the loaded series.
    pub table: MetricsTable,
}

impl MetricsReport {
    /// Builds the report, merging every loaded series into the table.
    #[must_use]
    pub fn new(concepts: Vec<ConceptReport>) -> Self {
        let table = MetricsTable::merge(concepts.iter().filter_map(|c| c.result.as_ref().ok()));
        Self { concepts, table }
    }

    /// Concepts that failed, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&Concept, &DataError)> {
        self.concepts
            .iter()
            .filter_map(|c| c.result.as_ref().err().map(|e| (&c.concept, e)))
    }

    /// Number of concepts that produced a series.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.concepts.iter().filter(|c| c.is_loaded()).count()
    }

    /// Returns true if there is nothing to show: no row made it into the table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Fetches tracked concepts for a filer and merges them.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    facts: Arc<dyn FilingFactsProvider>,
    config: AggregatorConfig,
}

impl MetricsAggregator {
    /// Creates an aggregator over a filing facts provider.
    #[must_use]
    pub fn new(facts: Arc<dyn FilingFactsProvider>, config: AggregatorConfig) -> Self {
        Self { facts, config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fetches every configured concept, one request at a time, and merges the
    /// ones that load.
    ///
    /// Never fails as a whole; per-concept errors are kept in the report.
    #[instrument(skip_all, fields(cik = %cik, provider = self.facts.name()))]
    pub async fn aggregate(&self, cik: &Cik) -> MetricsReport {
        let mut reports = Vec::with_capacity(self.config.concepts.len());

        for concept in &self.config.concepts {
            let result = self.concept_series(cik, concept).await;
            match &result {
                Ok(series) => debug!(
                    concept = concept.label,
                    rows = series.len(),
                    "Loaded concept"
                ),
                Err(e) => warn!(concept = concept.label, error = %e, "Concept unavailable"),
            }
            reports.push(ConceptReport {
                concept: *concept,
                result,
            });
        }

        let report = MetricsReport::new(reports);
        debug!(
            loaded = report.loaded_count(),
            rows = report.table.height(),
            "Merged metrics table"
        );
        report
    }

    /// Fetches and trims one concept.
    ///
    /// # Errors
    /// Returns the provider's error, or [`DataError::Parse`] if a period end cannot
    /// be read.
    pub async fn concept_series(&self, cik: &Cik, concept: &Concept) -> Result<ConceptSeries> {
        let facts = self
            .facts
            .fetch_concept(cik, &self.config.taxonomy, concept.tag)
            .await?;
        build_series(concept, &facts, self.config.table_forms, self.config.table_rows)
    }

    /// Fetches the single most recent net income fact across the accepted forms.
    ///
    /// Issues its own request; values already in the metrics table are not reused.
    /// Returns `Ok(None)` if no fact passes the form filter.
    ///
    /// # Errors
    /// Returns the provider's error, or [`DataError::Parse`] if a period end cannot
    /// be read.
    #[instrument(skip_all, fields(cik = %cik))]
    pub async fn latest_net_income(&self, cik: &Cik) -> Result<Option<NetIncomeFact>> {
        let facts = self
            .facts
            .fetch_concept(cik, &self.config.taxonomy, &self.config.net_income_tag)
            .await?;
        let latest = latest_fact(&facts, self.config.net_income_forms)?;
        debug!(found = latest.is_some(), "Latest net income");
        Ok(latest)
    }
}

/// Filters `facts` to `forms`, keeps one fact per period end, and returns the newest `limit` of them as a series labelled after `concept`.
///
/// Among facts sharing a period end the shortest period wins, so a quarter's
/// three-month figure beats the year-to-date figure filed alongside it. Remaining
/// ties go to the most recently filed fact.
///
/// # Errors
/// Returns [`DataError::Parse`] if an accepted fact has an unreadable end date.
pub fn build_series(
    concept: &Concept,
    facts: &[ConceptFact],
    forms: FormFilter,
    limit: usize,
) -> Result<ConceptSeries> {
    let mut by_end: BTreeMap<NaiveDate, &ConceptFact> = BTreeMap::new();
    for fact in facts.iter().filter(|f| forms.accepts(f.form.as_deref())) {
        let end = fact.end_date()?;
        match by_end.entry(end) {
            Entry::Vacant(slot) => {
                slot.insert(fact);
            }
            Entry::Occupied(mut slot) => {
                if supersedes(fact, slot.get()) {
                    slot.insert(fact);
                }
            }
        }
    }

    let points = by_end
        .into_iter()
        .rev()
        .take(limit)
        .map(|(end, fact)| SeriesPoint {
            end,
            value: fact.val,
        })
        .collect();

    Ok(ConceptSeries::new(concept.label, concept.tag, points))
}

/// ISO dates order as strings: a later start is a shorter period ending on the
/// same day.
fn supersedes(candidate: &ConceptFact, current: &ConceptFact) -> bool {
    (&candidate.start, &candidate.filed) > (&current.start, &current.filed)
}

/// Picks the fact with the latest period end among those passing `forms`.
///
/// Ties on the end date go to the most recently filed fact.
///
/// # Errors
/// Returns [`DataError::Parse`] if an accepted fact has an unreadable end date.
pub fn latest_fact(facts: &[ConceptFact], forms: FormFilter) -> Result<Option<NetIncomeFact>> {
    let mut best: Option<(NaiveDate, &ConceptFact)> = None;

    for fact in facts.iter().filter(|f| forms.accepts(f.form.as_deref())) {
        let end = fact.end_date()?;
        let newer = match best {
            None => true,
            Some((best_end, best_fact)) => {
                end > best_end || (end == best_end && fact.filed > best_fact.filed)
            }
        };
        if newer {
            best = Some((end, fact));
        }
    }

    Ok(best.map(|(end, fact)| NetIncomeFact {
        form: fact.form.clone().unwrap_or_default(),
        fiscal_year: fact.fy,
        fiscal_period: fact.fp.clone(),
        end,
        value: fact.val,
    }))
}
