// ⚖️ Reconciliation Engine - raw disclosures → ranked salary summaries
//
// Pipeline (one direction, no stage mutates an earlier stage's output):
//   raw records → normalized records → groups → scored summaries → ranked list
//
// Pure and synchronous: no I/O, no logging, no shared state. Each call builds
// its own grouping map, so concurrent calls never interfere.

use crate::aggregation::{score_group, AggregatedSummary};
use crate::grouping::group_records;
use crate::ranking::{distinct_federative_entities, rank};
use crate::record::RawDisclosureRecord;
use serde::Serialize;

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    /// Ranked summaries, highest max salary first
    pub summaries: Vec<AggregatedSummary>,

    /// Distinct federative entities across `summaries`
    pub federative_entities: Vec<String>,

    /// Raw records handed to the engine
    pub input_count: usize,

    /// Summaries emitted
    pub output_count: usize,

    /// Raw records dropped for missing name or obligated entity
    pub dropped_records: usize,

    /// Period-amount rows discarded as exact duplicates
    pub duplicate_pairs: usize,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        format!(
            "Reconciled {} records into {} summaries ({} dropped, {} duplicate rows, {} federative entities)",
            self.input_count,
            self.output_count,
            self.dropped_records,
            self.duplicate_pairs,
            self.federative_entities.len()
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        ReconciliationEngine
    }

    /// Reconcile a batch of raw records. Total: never fails, whatever the data quality.
    ///
    /// ```
    /// use salary_ledger::{ReconciliationEngine, RawDisclosureRecord};
    ///
    /// let records = vec![
    ///     RawDisclosureRecord::new("Ana Ruiz", "UNAM").with_period("01/01/2024 - 31/01/2024", "$1,000.00"),
    ///     RawDisclosureRecord::new("ANA RUIZ", "UNAM").with_period("01/02/2024 - 29/02/2024", "$2,500.00"),
    /// ];
    ///
    /// let report = ReconciliationEngine::new().reconcile(&records);
    /// assert_eq!(report.output_count, 1);
    /// assert_eq!(report.summaries[0].current_amount_label.as_deref(), Some("$2,500.00"));
    /// ```
    pub fn reconcile(&self, records: &[RawDisclosureRecord]) -> ReconciliationReport {
        let grouping = group_records(records);
        let dropped_records = grouping.dropped_records;
        let duplicate_pairs = grouping.duplicate_pairs;

        let scored = grouping.into_groups().into_iter().map(score_group).collect();
        let summaries = rank(scored);
        let federative_entities = distinct_federative_entities(&summaries);

        ReconciliationReport {
            input_count: records.len(),
            output_count: summaries.len(),
            dropped_records,
            duplicate_pairs,
            federative_entities,
            summaries,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
