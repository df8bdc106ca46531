use anyhow::{Context, Result};
use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use salary_ledger::{
    extract_payload, general_stats, open_database, reconcile_payload, write_summaries_csv,
    QueryResponse,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("reconcile") if args.len() > 2 => {
            run_reconcile(Path::new(&args[2]), args.get(3).map(String::as_str))?
        }
        Some("export") if args.len() > 3 => run_export(
            Path::new(&args[2]),
            Path::new(&args[3]),
            args.get(4).map(String::as_str),
        )?,
        Some("stats") if args.len() > 2 => run_stats(Path::new(&args[2]))?,
        _ => print_usage(),
    }

    Ok(())
}

/// Reconcile a saved upstream payload and print the response JSON
fn run_reconcile(payload_path: &Path, federative_filter: Option<&str>) -> Result<()> {
    let response = load_and_reconcile(payload_path, federative_filter)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Reconcile a saved upstream payload and write the summaries as CSV
fn run_export(payload_path: &Path, csv_path: &Path, federative_filter: Option<&str>) -> Result<()> {
    let response = load_and_reconcile(payload_path, federative_filter)?;

    let file = File::create(csv_path)
        .with_context(|| format!("Failed to create CSV file: {}", csv_path.display()))?;
    let rows = write_summaries_csv(BufWriter::new(file), &response.summaries)?;

    log::info!("✓ Exported {} summaries to {}", rows, csv_path.display());
    Ok(())
}

fn load_and_reconcile(payload_path: &Path, federative_filter: Option<&str>) -> Result<QueryResponse> {
    let text = fs::read_to_string(payload_path)
        .with_context(|| format!("Failed to read payload: {}", payload_path.display()))?;
    let envelope: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Payload is not valid JSON: {}", payload_path.display()))?;

    let payload = extract_payload(&envelope)
        .context("Payload has no `paylod.datosSolr` record array")?;

    Ok(reconcile_payload(payload, federative_filter))
}

/// Print general audit statistics from an existing database
fn run_stats(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let conn = open_database(db_path)?;
    let stats = general_stats(&conn)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn print_usage() {
    eprintln!("salary-ledger {}", salary_ledger::VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  salary-ledger reconcile <payload.json> [federative-entity]");
    eprintln!("  salary-ledger export <payload.json> <out.csv> [federative-entity]");
    eprintln!("  salary-ledger stats <audit.db>");
}
