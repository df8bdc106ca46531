// 🔍 Deduplication & Grouping - one group per (person, obligated entity)
//
// Groups live in a Vec in first-encounter order, with a HashMap from identity
// key to Vec index for lookups. Iteration order is therefore always insertion
// order: the first-seen record names the group, and groups that tie in the
// final ranking keep this order.

use crate::record::{normalize, IdentityKey, NormalizedRecord, PeriodAmount, RawDisclosureRecord};
use std::collections::HashMap;

// ============================================================================
// PROFESSOR GROUP
// ============================================================================

/// Accumulator for every disclosure of one identity
#[derive(Debug, Clone, PartialEq)]
pub struct ProfessorGroup {
    pub identity_key: IdentityKey,
    pub display_name: String,
    pub obligated_entity: String,
    pub federative_entity: Option<String>,
    pub record_id: Option<String>,
    pub period_amounts: Vec<PeriodAmount>,
}

impl ProfessorGroup {
    fn from_record(record: &NormalizedRecord) -> Self {
        ProfessorGroup {
            identity_key: record.key.clone(),
            display_name: record.display_name.clone(),
            obligated_entity: record.obligated_entity.clone(),
            federative_entity: record.federative_entity.clone(),
            record_id: record.record_id.clone(),
            period_amounts: Vec::new(),
        }
    }

    /// Append unless the same (period label, amount label) pair is already present.
    /// Returns whether the pair was added.
    pub fn push_period_amount(&mut self, period_amount: PeriodAmount) -> bool {
        if self
            .period_amounts
            .iter()
            .any(|existing| existing.same_labels(&period_amount))
        {
            return false;
        }
        self.period_amounts.push(period_amount);
        true
    }
}

// ============================================================================
// GROUPING ENGINE
// ============================================================================

/// Insertion-ordered map `IdentityKey → ProfessorGroup`
#[derive(Debug, Default)]
pub struct GroupingEngine {
    groups: Vec<ProfessorGroup>,
    index: HashMap<IdentityKey, usize>,

    /// Raw records dropped for missing identity fields
    pub dropped_records: usize,

    /// Period-amount pairs discarded as exact duplicates
    pub duplicate_pairs: usize,
}

impl GroupingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and add one raw record
    pub fn add_raw(&mut self, record: &RawDisclosureRecord) {
        match normalize(record) {
            Some(normalized) => self.add(normalized),
            None => self.dropped_records += 1,
        }
    }

    /// Add a normalized record to its group, creating the group on first encounter
    pub fn add(&mut self, record: NormalizedRecord) {
        let position = match self.index.get(&record.key) {
            Some(&position) => position,
            None => {
                let position = self.groups.len();
                self.groups.push(ProfessorGroup::from_record(&record));
                self.index.insert(record.key.clone(), position);
                position
            }
        };

        if let Some(period_amount) = record.period_amount {
            if !self.groups[position].push_period_amount(period_amount) {
                self.duplicate_pairs += 1;
            }
        }
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&ProfessorGroup> {
        self.index.get(key).map(|&position| &self.groups[position])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-encounter order
    pub fn groups(&self) -> &[ProfessorGroup] {
        &self.groups
    }

    /// Consume the engine, yielding groups in first-encounter order
    pub fn into_groups(self) -> Vec<ProfessorGroup> {
        self.groups
    }
}

/// Group a batch of raw records
pub fn group_records(records: &[RawDisclosureRecord]) -> GroupingEngine {
    let mut engine = GroupingEngine::new();
    for record in records {
        engine.add_raw(record);
    }
    engine
}

// ============================================================================
// TESTS
// ============================================================================
