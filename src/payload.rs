// 📦 Query Payload - inbound query body, upstream envelope, outbound response
//
// Upstream answers `{ "paylod": { "datosSolr": [...], "sujetosObligados": [...] } }`
// (sic). Anything that does not look like that is passed through untouched.

use crate::aggregation::AggregatedSummary;
use crate::engine::{ReconciliationEngine, ReconciliationReport};
use crate::record::RawDisclosureRecord;
use serde::Serialize;
use serde_json::Value;

/// Body key carrying the federative entity filter (never forwarded upstream)
pub const FILTER_KEY: &str = "entidadFederativa";

/// Body key carrying the searched name
pub const SEARCH_KEY: &str = "contenido";

// ============================================================================
// INBOUND QUERY
// ============================================================================

/// Query body split into what goes upstream and what stays local
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Body forwarded upstream, filter key removed
    pub forward_body: Value,

    /// Case-insensitive substring filter on federative entity
    pub federative_filter: Option<String>,

    /// Searched name, for the audit log
    pub searched_name: Option<String>,
}

/// Split an inbound query body. Non-object bodies are forwarded as-is.
pub fn split_query_body(body: Value) -> QueryRequest {
    let Value::Object(mut map) = body else {
        return QueryRequest {
            forward_body: body,
            federative_filter: None,
            searched_name: None,
        };
    };

    let federative_filter = map
        .remove(FILTER_KEY)
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.is_empty());

    let searched_name = map
        .get(SEARCH_KEY)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    QueryRequest {
        forward_body: Value::Object(map),
        federative_filter,
        searched_name,
    }
}

/// Keep records whose federative entity contains `filter`, ignoring case.
/// No filter (or an empty one) keeps everything.
pub fn filter_by_federative_entity(
    records: Vec<RawDisclosureRecord>,
    filter: Option<&str>,
) -> Vec<RawDisclosureRecord> {
    let needle = match filter {
        Some(f) if !f.is_empty() => f.to_lowercase(),
        _ => return records,
    };

    records
        .into_iter()
        .filter(|r| {
            r.federative_entity
                .as_deref()
                .map(|e| e.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

// ============================================================================
// UPSTREAM ENVELOPE
// ============================================================================

/// Records and passthrough data pulled from an upstream envelope
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPayload {
    pub records: Vec<RawDisclosureRecord>,
    pub obligated_entities: Value,
}

/// Extract the record list, or `None` if the envelope is not the expected shape
pub fn extract_payload(envelope: &Value) -> Option<UpstreamPayload> {
    let inner = envelope.get("paylod").or_else(|| envelope.get("payload"))?;
    let rows = inner.get("datosSolr")?.as_array()?;

    Some(UpstreamPayload {
        records: rows.iter().cloned().map(RawDisclosureRecord::from_value).collect(),
        obligated_entities: inner
            .get("sujetosObligados")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
    })
}

// ============================================================================
// OUTBOUND RESPONSE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    #[serde(rename = "datosSolr")]
    pub summaries: Vec<AggregatedSummary>,

    #[serde(rename = "sujetosObligados")]
    pub obligated_entities: Value,

    #[serde(rename = "entidadesFederativas")]
    pub federative_entities: Vec<String>,
}

/// Result of processing one upstream answer
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Upstream answered with the expected envelope; records were reconciled
    Reconciled {
        status: u16,
        response: QueryResponse,
        /// Upstream records before any filtering
        total_records: usize,
        /// Summaries emitted
        filtered_records: usize,
    },

    /// Anything else: relay the upstream body verbatim
    Passthrough {
        status: u16,
        content_type: String,
        body: String,
    },
}

impl QueryOutcome {
    pub fn status(&self) -> u16 {
        match self {
            QueryOutcome::Reconciled { status, .. } => *status,
            QueryOutcome::Passthrough { status, .. } => *status,
        }
    }

    /// (total upstream records, emitted summaries) for the audit log
    pub fn audit_counts(&self) -> (usize, usize) {
        match self {
            QueryOutcome::Reconciled {
                total_records,
                filtered_records,
                ..
            } => (*total_records, *filtered_records),
            QueryOutcome::Passthrough { .. } => (0, 0),
        }
    }
}

/// Reconcile a parsed payload after applying the federative entity filter.
/// The engine report is logged, then consumed into the response.
pub fn reconcile_payload(payload: UpstreamPayload, federative_filter: Option<&str>) -> QueryResponse {
    let total = payload.records.len();
    let records = filter_by_federative_entity(payload.records, federative_filter);

    if let Some(filter) = federative_filter {
        log::info!(
            "Federative entity filter '{}': {} of {} records kept",
            filter,
            records.len(),
            total
        );
    }

    let report = ReconciliationEngine::new().reconcile(&records);
    log::info!("{}", report.summary());

    let ReconciliationReport {
        summaries,
        federative_entities,
        ..
    } = report;

    QueryResponse {
        summaries,
        obligated_entities: payload.obligated_entities,
        federative_entities,
    }
}

/// Turn an upstream answer into a reconciled response or a passthrough
pub fn process_upstream(
    status: u16,
    content_type: &str,
    body: String,
    federative_filter: Option<&str>,
) -> QueryOutcome {
    let passthrough = |body: String| QueryOutcome::Passthrough {
        status,
        content_type: content_type.to_string(),
        body,
    };

    if !content_type.contains("application/json") {
        log::debug!("Non-JSON upstream response ({}), passing through", content_type);
        return passthrough(body);
    }

    let envelope: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Upstream body is not valid JSON ({}), passing through", e);
            return passthrough(body);
        }
    };

    let Some(payload) = extract_payload(&envelope) else {
        log::warn!("Unexpected upstream envelope, passing through original response");
        return passthrough(body);
    };

    let total_records = payload.records.len();
    let response = reconcile_payload(payload, federative_filter);

    QueryOutcome::Reconciled {
        status,
        filtered_records: response.summaries.len(),
        response,
        total_records,
    }
}

// ============================================================================
// TESTS
// ============================================================================
