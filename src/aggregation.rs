// 📊 Per-Group Aggregator - current / max / cumulative salary per identity
//
// Only RESOLVED pairs (end date AND amount parsed) feed the derived figures.
// Unresolved pairs stay in `period_amounts` for display.

use crate::grouping::ProfessorGroup;
use crate::record::PeriodAmount;
use serde::Serialize;

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// Highest resolved amount and the period it was reported for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxAmount {
    #[serde(rename = "monto")]
    pub label: String,

    #[serde(rename = "periodo")]
    pub period_label: String,
}

/// Final, per-identity salary summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSummary {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "sujetoObligado")]
    pub obligated_entity: String,

    #[serde(rename = "professorId")]
    pub record_id: Option<String>,

    #[serde(rename = "entidadFederativa")]
    pub federative_entity: Option<String>,

    /// Every distinct pair, resolved or not
    #[serde(rename = "periodoMontos")]
    pub period_amounts: Vec<PeriodAmount>,

    /// Amount label of the chronologically latest resolved period
    #[serde(rename = "sueldoActual")]
    pub current_amount_label: Option<String>,

    #[serde(rename = "sueldoMax")]
    pub max_amount: Option<MaxAmount>,

    /// Sum over resolved pairs; 0 when none resolved
    #[serde(rename = "sueldoAcumulado")]
    pub cumulative_amount: f64,
}

/// Summary plus the numeric max used for ranking. The number never leaves the crate.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredSummary {
    pub summary: AggregatedSummary,
    pub max_value: Option<f64>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Reduce one group to its summary
pub fn aggregate_group(group: ProfessorGroup) -> AggregatedSummary {
    score_group(group).summary
}

pub(crate) fn score_group(group: ProfessorGroup) -> ScoredSummary {
    let mut resolved: Vec<&PeriodAmount> = group
        .period_amounts
        .iter()
        .filter(|pa| pa.is_resolved())
        .collect();

    // Most recent first; sort_by is stable so equal dates keep insertion order
    resolved.sort_by(|a, b| b.parsed_end_date.cmp(&a.parsed_end_date));

    let current_amount_label = resolved.first().map(|pa| pa.amount_label.clone());

    let max = find_max(&resolved);
    let max_amount = max.map(|pa| MaxAmount {
        label: pa.amount_label.clone(),
        period_label: pa.period_label.clone(),
    });
    let max_value = max.and_then(|pa| pa.parsed_amount);

    let cumulative_amount: f64 = resolved.iter().filter_map(|pa| pa.parsed_amount).sum();

    ScoredSummary {
        summary: AggregatedSummary {
            name: group.display_name,
            obligated_entity: group.obligated_entity,
            record_id: group.record_id,
            federative_entity: group.federative_entity,
            period_amounts: group.period_amounts,
            current_amount_label,
            max_amount,
            cumulative_amount,
        },
        max_value,
    }
}

/// Greatest parsed amount; strict `>` so the first maximal element wins
fn find_max<'a>(resolved: &[&'a PeriodAmount]) -> Option<&'a PeriodAmount> {
    let mut best: Option<(&PeriodAmount, f64)> = None;

    for pa in resolved {
        let Some(amount) = pa.parsed_amount else {
            continue;
        };
        match best {
            Some((_, best_amount)) if amount <= best_amount => {}
            _ => best = Some((pa, amount)),
        }
    }

    best.map(|(pa, _)| pa)
}

// ============================================================================
// TESTS
// ============================================================================
