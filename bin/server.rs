// Salary Ledger - Proxy Server
// Forwards salary queries to the transparency registry, reconciles the
// answer, and keeps an audit log of sessions, queries and profile views.

use anyhow::{anyhow, Context, Result};
use axum::{
    extract::{ConnectInfo, Query, Request, State},
    http::{
        header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE},
        HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use salary_ledger::db::DEFAULT_LIMIT;
use salary_ledger::upstream::UpstreamClient;
use salary_ledger::{
    cumulative_salary_ranking, general_stats, log_new_session, log_profile_view, log_query,
    most_searched_names, most_viewed_profiles, open_database, process_upstream,
    split_query_body, ClientSession, NewSessionEntry, ProfileViewEntry, ProfileViewRequest,
    QueryLogEntry, QueryOutcome, SalaryOrder, ServerConfig,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    upstream: UpstreamClient,
}

impl AppState {
    fn with_db<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .db
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))?;
        f(&conn)
    }

    /// Audit writes never affect the response
    fn record(&self, what: &str, f: impl FnOnce(&Connection) -> Result<()>) {
        if let Err(e) = self.with_db(f) {
            log::warn!("⚠️ Failed to record {}: {:#}", what, e);
        }
    }
}

/// Analytics response wrapper
#[derive(Serialize)]
struct AnalyticsResponse<T> {
    success: bool,
    #[serde(flatten)]
    page: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    tipo: Option<&'static str>,
}

#[derive(Deserialize)]
struct LimitParams {
    limit: Option<String>,
}

impl LimitParams {
    /// Missing, zero or unparsable limits fall back to the default
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|&l| l > 0)
            .unwrap_or(DEFAULT_LIMIT)
    }
}

fn analytics_error(e: anyhow::Error) -> Response {
    log::error!("💥 Analytics query failed: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "Error al obtener estadísticas",
            "detail": format!("{:#}", e),
        })),
    )
        .into_response()
}

// ============================================================================
// Session middleware
// ============================================================================

async fn track_session(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = {
        let headers = req.headers();
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let peer_ip = peer.ip().to_string();

        ClientSession::resolve(
            header("cookie"),
            header("x-forwarded-for"),
            header("x-real-ip"),
            Some(&peer_ip),
            header("user-agent"),
        )
    };

    let path = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    if session.is_new {
        log::info!("🆕 New session {} - {} {} from {}", session.sid, req.method(), path, session.ip);
        let entry = NewSessionEntry {
            timestamp: Utc::now(),
            sid: session.sid.clone(),
            ip_address: session.ip.clone(),
            user_agent: session.user_agent.clone(),
            method: req.method().to_string(),
            path,
        };
        state.record("new session", |conn| log_new_session(conn, &entry));
    } else {
        log::debug!("🔁 Returning session {} - {} {}", session.sid, req.method(), path);
    }

    req.extensions_mut().insert(session.clone());
    let mut response = next.run(req).await;

    if let Some(cookie) = session.set_cookie_header() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/ping - Health check
async fn ping() -> impl IntoResponse {
    (
        [(CACHE_CONTROL, "no-store")],
        Json(json!({ "ok": true, "ts": Utc::now().to_rfc3339() })),
    )
}

/// POST /api/consulta - Forward query upstream and reconcile the answer
async fn consulta(
    State(state): State<AppState>,
    Extension(session): Extension<ClientSession>,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request = split_query_body(body);

    log::info!(
        "📡 Query - name: {}, federative entity: {}, sid: {}",
        request.searched_name.as_deref().unwrap_or("none"),
        request.federative_filter.as_deref().unwrap_or("none"),
        session.sid
    );

    let upstream = match state.upstream.post_query(&request.forward_body).await {
        Ok(upstream) => upstream,
        Err(e) => {
            log::error!("💥 Proxy error: {:#}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Proxy error", "detail": format!("{:#}", e) })),
            )
                .into_response();
        }
    };

    let outcome = process_upstream(
        upstream.status,
        &upstream.content_type,
        upstream.body,
        request.federative_filter.as_deref(),
    );
    let status = StatusCode::from_u16(outcome.status()).unwrap_or(StatusCode::BAD_GATEWAY);
    let (total_records, filtered_records) = outcome.audit_counts();

    let response = match outcome {
        QueryOutcome::Reconciled { response, .. } => (status, Json(response)).into_response(),
        QueryOutcome::Passthrough {
            content_type, body, ..
        } => (status, [(CONTENT_TYPE, content_type)], body).into_response(),
    };

    let entry = QueryLogEntry {
        timestamp: Utc::now(),
        sid: Some(session.sid),
        searched_name: request.searched_name,
        federative_entity: request.federative_filter,
        total_records,
        filtered_records,
        duration_ms: started.elapsed().as_millis() as u64,
        ip_address: Some(session.ip),
        user_agent: Some(session.user_agent),
    };
    state.record("query", |conn| log_query(conn, &entry));

    response
}

/// POST /api/profesor-vista - Record a profile card view
async fn profesor_vista(
    State(state): State<AppState>,
    Extension(session): Extension<ClientSession>,
    Json(request): Json<ProfileViewRequest>,
) -> Response {
    log::info!(
        "👁️ Profile view: {} (ID: {})",
        request.professor_name.as_deref().unwrap_or("unnamed"),
        request.professor_id.as_deref().unwrap_or("none")
    );

    let entry = ProfileViewEntry::from_request(
        &request,
        Some(session.sid),
        Some(session.ip),
        Some(session.user_agent),
    );
    state.record("profile view", |conn| log_profile_view(conn, &entry));

    Json(json!({ "success": true, "message": "Vista registrada correctamente" })).into_response()
}

/// GET /api/analytics/nombres-mas-buscados
async fn most_searched(State(state): State<AppState>, Query(params): Query<LimitParams>) -> Response {
    match state.with_db(|conn| most_searched_names(conn, params.limit())) {
        Ok(page) => Json(AnalyticsResponse { success: true, page, tipo: None }).into_response(),
        Err(e) => analytics_error(e),
    }
}

/// GET /api/analytics/profesores-mas-clickeados
async fn most_viewed(State(state): State<AppState>, Query(params): Query<LimitParams>) -> Response {
    match state.with_db(|conn| most_viewed_profiles(conn, params.limit())) {
        Ok(page) => Json(AnalyticsResponse { success: true, page, tipo: None }).into_response(),
        Err(e) => analytics_error(e),
    }
}

async fn salary_ranking(state: AppState, params: LimitParams, order: SalaryOrder) -> Response {
    match state.with_db(|conn| cumulative_salary_ranking(conn, params.limit(), order)) {
        Ok(page) => Json(AnalyticsResponse {
            success: true,
            page,
            tipo: Some(order.label()),
        })
        .into_response(),
        Err(e) => analytics_error(e),
    }
}

/// GET /api/analytics/top-sueldos
async fn top_salaries(State(state): State<AppState>, Query(params): Query<LimitParams>) -> Response {
    salary_ranking(state, params, SalaryOrder::Highest).await
}

/// GET /api/analytics/bottom-sueldos
async fn bottom_salaries(State(state): State<AppState>, Query(params): Query<LimitParams>) -> Response {
    salary_ranking(state, params, SalaryOrder::Lowest).await
}

/// GET /api/analytics/estadisticas-generales
async fn overall_stats(State(state): State<AppState>) -> Response {
    match state.with_db(general_stats) {
        Ok(stats) => Json(json!({ "success": true, "data": stats })).into_response(),
        Err(e) => analytics_error(e),
    }
}

// ============================================================================
// Main Server
// ============================================================================

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    if allowed_origin == "*" {
        return cors.allow_origin(Any);
    }

    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            log::warn!("⚠️ Invalid ALLOWED_ORIGIN '{}', allowing any origin", allowed_origin);
            cors.allow_origin(Any)
        }
    }
}

fn build_router(state: AppState, allowed_origin: &str) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/ping", get(ping))
        .route("/consulta", post(consulta))
        .route("/profesor-vista", post(profesor_vista))
        .route("/analytics/nombres-mas-buscados", get(most_searched))
        .route("/analytics/profesores-mas-clickeados", get(most_viewed))
        .route("/analytics/top-sueldos", get(top_salaries))
        .route("/analytics/bottom-sueldos", get(bottom_salaries))
        .route("/analytics/estadisticas-generales", get(overall_stats));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), track_session))
        .layer(cors_layer(allowed_origin))
        .with_state(state)
}

/// Serve until `shutdown` resolves, then wait for in-flight requests
async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("Server error")
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("🌐 Salary Ledger - Proxy Server {}", salary_ledger::VERSION);

    let config = ServerConfig::from_env()?;

    let conn = open_database(&config.db_path)?;
    log::info!("✓ Audit database opened: {}", config.db_path.display());

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        upstream: UpstreamClient::new(&config.target_url, config.upstream_timeout)?,
    };
    let app = build_router(state, &config.allowed_origin);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log::info!("🚀 Proxy listening on http://{}", addr);

    serve(listener, app, shutdown_signal()).await?;

    log::info!("✓ Server stopped, audit database closed");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("💥 Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("💥 Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("🛑 Ctrl+C received, shutting down"),
        _ = terminate => log::info!("🛑 SIGTERM received, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salary_ledger::setup_database;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn test_state() -> AppState {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        AppState {
            db: Arc::new(Mutex::new(conn)),
            upstream: UpstreamClient::new("http://127.0.0.1:9/unused", Duration::from_secs(1)).unwrap(),
        }
    }

    #[test]
    fn test_limit_params() {
        let limit = |raw: Option<&str>| LimitParams { limit: raw.map(str::to_string) }.limit();

        assert_eq!(limit(None), DEFAULT_LIMIT);
        assert_eq!(limit(Some("0")), DEFAULT_LIMIT);
        assert_eq!(limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(limit(Some("25")), 25);
    }

    #[tokio::test]
    async fn test_graceful_shutdown_keeps_audit_writes() {
        let state = test_state();
        let db = state.db.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, build_router(state, "*"), async move {
            let _ = stop_rx.await;
        }));

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap();
        let resp = client
            .get(format!("http://{}/api/ping", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert!(resp.headers().get("set-cookie").is_some());
        drop(client);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();

        let sessions: i64 = db
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM new_sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(sessions, 1);
    }
}
