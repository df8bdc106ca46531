// 📤 CSV Export - flatten reconciled summaries into one row per identity

use crate::aggregation::AggregatedSummary;
use anyhow::{Context, Result};
use std::io::Write;

pub const CSV_HEADERS: [&str; 9] = [
    "nombre",
    "sujetoObligado",
    "professorId",
    "entidadFederativa",
    "sueldoActual",
    "sueldoMax",
    "periodoSueldoMax",
    "sueldoAcumulado",
    "periodos",
];

/// Write summaries as CSV, keeping their ranked order
pub fn write_summaries_csv<W: Write>(writer: W, summaries: &[AggregatedSummary]) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer
        .write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;

    for summary in summaries {
        csv_writer
            .write_record(summary_row(summary))
            .with_context(|| format!("Failed to write CSV row for {}", summary.name))?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(summaries.len())
}

fn summary_row(summary: &AggregatedSummary) -> Vec<String> {
    let (max_label, max_period) = match &summary.max_amount {
        Some(max) => (max.label.clone(), max.period_label.clone()),
        None => (String::new(), String::new()),
    };

    vec![
        summary.name.clone(),
        summary.obligated_entity.clone(),
        summary.record_id.clone().unwrap_or_default(),
        summary.federative_entity.clone().unwrap_or_default(),
        summary.current_amount_label.clone().unwrap_or_default(),
        max_label,
        max_period,
        format!("{:.2}", summary.cumulative_amount),
        summary.period_amounts.len().to_string(),
    ]
}
