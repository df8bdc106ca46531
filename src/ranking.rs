// 🏆 Final Ranker - order summaries by max salary, highest first

use crate::aggregation::{AggregatedSummary, ScoredSummary};
use std::cmp::Ordering;

/// Sort by max amount descending and strip the numeric key.
///
/// A missing max ranks as 0. The sort is stable, so summaries with equal keys
/// (including every missing max) keep their group-creation order.
pub(crate) fn rank(mut scored: Vec<ScoredSummary>) -> Vec<AggregatedSummary> {
    scored.sort_by(|a, b| {
        let a_key = a.max_value.unwrap_or(0.0);
        let b_key = b.max_value.unwrap_or(0.0);
        b_key.partial_cmp(&a_key).unwrap_or(Ordering::Equal)
    });

    scored.into_iter().map(|s| s.summary).collect()
}

/// Distinct federative entities across summaries, in output order
pub fn distinct_federative_entities(summaries: &[AggregatedSummary]) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();

    for entity in summaries
        .iter()
        .filter_map(|s| s.federative_entity.as_deref())
        .filter(|e| !e.is_empty())
    {
        if !entities.iter().any(|seen| seen == entity) {
            entities.push(entity.to_string());
        }
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::MaxAmount;

    fn scored(name: &str, max: Option<f64>, entity: Option<&str>) -> ScoredSummary {
        ScoredSummary {
            summary: AggregatedSummary {
                name: name.to_string(),
                obligated_entity: "UNAM".to_string(),
                record_id: None,
                federative_entity: entity.map(str::to_string),
                period_amounts: Vec::new(),
                current_amount_label: None,
                max_amount: max.map(|m| MaxAmount {
                    label: format!("${:.2}", m),
                    period_label: "01/01/2024 - 31/01/2024".to_string(),
                }),
                cumulative_amount: max.unwrap_or(0.0),
            },
            max_value: max,
        }
    }

    fn names(summaries: &[AggregatedSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_rank_descending_null_last() {
        let ranked = rank(vec![
            scored("quinientos", Some(500.0), None),
            scored("nulo", None, None),
            scored("mil quinientos", Some(1500.0), None),
        ]);

        assert_eq!(names(&ranked), vec!["mil quinientos", "quinientos", "nulo"]);
    }

    #[test]
    fn test_rank_null_max_keeps_creation_order() {
        let ranked = rank(vec![
            scored("a", None, None),
            scored("b", Some(10.0), None),
            scored("c", None, None),
            scored("d", None, None),
        ]);

        assert_eq!(names(&ranked), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_rank_equal_max_is_stable() {
        let ranked = rank(vec![
            scored("first", Some(100.0), None),
            scored("second", Some(100.0), None),
        ]);

        assert_eq!(names(&ranked), vec!["first", "second"]);
    }

    #[test]
    fn test_distinct_federative_entities() {
        let summaries: Vec<AggregatedSummary> = vec![
            scored("a", None, Some("Jalisco")),
            scored("b", None, None),
            scored("c", None, Some("CDMX")),
            scored("d", None, Some("Jalisco")),
            scored("e", None, Some("")),
        ]
        .into_iter()
        .map(|s| s.summary)
        .collect();

        assert_eq!(distinct_federative_entities(&summaries), vec!["Jalisco", "CDMX"]);
    }
}
