// Salary Ledger - Core Library
// Reconciles salary disclosures from the transparency registry into one
// summary per (person, obligated entity). Exposes all modules for the CLI,
// the proxy server, and tests.

pub mod money;          // Monetary Parser
pub mod period;         // Period Parser
pub mod record;         // Record Normalizer
pub mod grouping;       // Deduplication & Grouping
pub mod aggregation;    // Per-Group Aggregator
pub mod ranking;        // Final Ranker
pub mod engine;         // Full reconciliation pipeline
pub mod payload;        // Query body / upstream envelope handling
pub mod export;         // CSV export of summaries
pub mod session;        // sid cookie + client metadata
pub mod db;             // Audit log + analytics (SQLite)
pub mod config;         // Environment configuration

#[cfg(feature = "server")]
pub mod upstream;       // Registry HTTP client

// Re-export commonly used types
pub use money::{parse_amount, parse_amount_value};
pub use period::parse_period_end;
pub use record::{normalize, IdentityKey, NormalizedRecord, PeriodAmount, RawDisclosureRecord};
pub use grouping::{group_records, GroupingEngine, ProfessorGroup};
pub use aggregation::{aggregate_group, AggregatedSummary, MaxAmount};
pub use ranking::distinct_federative_entities;
pub use engine::{ReconciliationEngine, ReconciliationReport};
pub use payload::{
    extract_payload, filter_by_federative_entity, process_upstream, reconcile_payload,
    split_query_body, QueryOutcome, QueryRequest, QueryResponse, UpstreamPayload,
};
pub use export::write_summaries_csv;
pub use session::ClientSession;
pub use db::{
    cumulative_salary_ranking, general_stats, log_new_session, log_profile_view, log_query,
    most_searched_names, most_viewed_profiles, open_database, setup_database, AnalyticsPage,
    GeneralStats, NewSessionEntry, ProfileViewEntry, ProfileViewRequest, QueryLogEntry,
    SalaryOrder,
};
pub use config::ServerConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
