// 🗄️ Audit Log - sessions, queries and profile views in SQLite
//
// Writes happen after the response is built and are best-effort for callers:
// a failed insert is logged, never surfaced to the client.
// Analytics are plain grouped counts over these rows.

use crate::money::parse_amount_value;
use crate::record::lenient_string;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default page size for analytics queries
pub const DEFAULT_LIMIT: usize = 10;

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS new_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            sid TEXT NOT NULL,
            ip_address TEXT,
            user_agent TEXT,
            method TEXT,
            path TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS query_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            sid TEXT,
            searched_name TEXT,
            federative_entity TEXT,
            total_records INTEGER NOT NULL,
            filtered_records INTEGER NOT NULL,
            duration_ms INTEGER NOT NULL,
            ip_address TEXT,
            user_agent TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profile_views (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            sid TEXT,
            professor_id TEXT,
            professor_name TEXT,
            obligated_entity TEXT,
            federative_entity TEXT,
            max_salary REAL,
            cumulative_salary REAL,
            latest_salary REAL,
            ip_address TEXT,
            user_agent TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON new_sessions(timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_sid ON new_sessions(sid)",
        "CREATE INDEX IF NOT EXISTS idx_query_timestamp ON query_log(timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_query_name ON query_log(searched_name)",
        "CREATE INDEX IF NOT EXISTS idx_views_timestamp ON profile_views(timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_views_name ON profile_views(professor_name)",
    ] {
        conn.execute(statement, [])?;
    }

    Ok(())
}

// ============================================================================
// AUDIT ENTRIES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NewSessionEntry {
    pub timestamp: DateTime<Utc>,
    pub sid: String,
    pub ip_address: String,
    pub user_agent: String,
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryLogEntry {
    pub timestamp: DateTime<Utc>,
    pub sid: Option<String>,
    pub searched_name: Option<String>,
    pub federative_entity: Option<String>,
    pub total_records: usize,
    pub filtered_records: usize,
    pub duration_ms: u64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Profile card view as posted by the frontend. Salaries may be numbers or "$1,234.50".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileViewRequest {
    #[serde(rename = "professorId", default, deserialize_with = "lenient_string")]
    pub professor_id: Option<String>,

    #[serde(rename = "nombreProfesor", default, deserialize_with = "lenient_string")]
    pub professor_name: Option<String>,

    #[serde(rename = "sujetoObligado", default, deserialize_with = "lenient_string")]
    pub obligated_entity: Option<String>,

    #[serde(rename = "entidadFederativa", default, deserialize_with = "lenient_string")]
    pub federative_entity: Option<String>,

    #[serde(rename = "sueldoMaximo", default)]
    pub max_salary: serde_json::Value,

    #[serde(rename = "sueldoAcumulado", default)]
    pub cumulative_salary: serde_json::Value,

    #[serde(rename = "ultimoSueldo", default)]
    pub latest_salary: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileViewEntry {
    pub timestamp: DateTime<Utc>,
    pub sid: Option<String>,
    pub professor_id: Option<String>,
    pub professor_name: Option<String>,
    pub obligated_entity: Option<String>,
    pub federative_entity: Option<String>,
    pub max_salary: Option<f64>,
    pub cumulative_salary: Option<f64>,
    pub latest_salary: Option<f64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ProfileViewEntry {
    pub fn from_request(
        request: &ProfileViewRequest,
        sid: Option<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        ProfileViewEntry {
            timestamp: Utc::now(),
            sid,
            professor_id: request.professor_id.clone(),
            professor_name: request.professor_name.clone(),
            obligated_entity: request.obligated_entity.clone(),
            federative_entity: request.federative_entity.clone(),
            max_salary: parse_amount_value(&request.max_salary),
            cumulative_salary: parse_amount_value(&request.cumulative_salary),
            latest_salary: parse_amount_value(&request.latest_salary),
            ip_address,
            user_agent,
        }
    }
}

pub fn log_new_session(conn: &Connection, entry: &NewSessionEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO new_sessions (timestamp, sid, ip_address, user_agent, method, path)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            format_timestamp(entry.timestamp),
            entry.sid,
            entry.ip_address,
            entry.user_agent,
            entry.method,
            entry.path,
        ],
    )?;
    Ok(())
}

pub fn log_query(conn: &Connection, entry: &QueryLogEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO query_log (
            timestamp, sid, searched_name, federative_entity,
            total_records, filtered_records, duration_ms, ip_address, user_agent
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            format_timestamp(entry.timestamp),
            entry.sid,
            entry.searched_name,
            entry.federative_entity,
            entry.total_records as i64,
            entry.filtered_records as i64,
            entry.duration_ms as i64,
            entry.ip_address,
            entry.user_agent,
        ],
    )?;
    Ok(())
}

pub fn log_profile_view(conn: &Connection, entry: &ProfileViewEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO profile_views (
            timestamp, sid, professor_id, professor_name, obligated_entity, federative_entity,
            max_salary, cumulative_salary, latest_salary, ip_address, user_agent
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            format_timestamp(entry.timestamp),
            entry.sid,
            entry.professor_id,
            entry.professor_name,
            entry.obligated_entity,
            entry.federative_entity,
            entry.max_salary,
            entry.cumulative_salary,
            entry.latest_salary,
            entry.ip_address,
            entry.user_agent,
        ],
    )?;
    Ok(())
}

// ============================================================================
// ANALYTICS
// ============================================================================

/// One page of analytics rows plus totals computed without the limit
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsPage<T> {
    pub data: Vec<T>,
    pub total: usize,
    #[serde(rename = "totalReal")]
    pub total_real: i64,
    #[serde(rename = "totalVistasAcumuladas", skip_serializing_if = "Option::is_none")]
    pub total_views: Option<i64>,
    pub limit: usize,
}

impl<T> AnalyticsPage<T> {
    fn new(data: Vec<T>, total_real: i64, total_views: Option<i64>, limit: usize) -> Self {
        AnalyticsPage {
            total: data.len(),
            data,
            total_real,
            total_views,
            limit,
        }
    }
}

/// Serialized with the raw column names dashboards already read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchedName {
    #[serde(rename = "nombre_profesor")]
    pub name: String,
    #[serde(rename = "total_busquedas")]
    pub searches: i64,
    #[serde(rename = "usuarios_unicos")]
    pub unique_sessions: i64,
    #[serde(rename = "ultima_busqueda")]
    pub last_search: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewedProfile {
    #[serde(rename = "nombreProfesor")]
    pub name: String,
    #[serde(rename = "sujetoObligado")]
    pub obligated_entity: Option<String>,
    #[serde(rename = "entidadFederativa")]
    pub federative_entity: Option<String>,
    #[serde(rename = "totalVistas")]
    pub views: i64,
    #[serde(rename = "usuariosUnicos")]
    pub unique_sessions: i64,
    #[serde(rename = "promedioSueldoMaximo")]
    pub avg_max_salary: String,
    #[serde(rename = "promedioSueldoAcumulado")]
    pub avg_cumulative_salary: String,
    #[serde(rename = "ultimaVista")]
    pub last_view: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryRanking {
    #[serde(rename = "nombreProfesor")]
    pub name: String,
    #[serde(rename = "sujetoObligado")]
    pub obligated_entity: Option<String>,
    #[serde(rename = "entidadFederativa")]
    pub federative_entity: Option<String>,
    #[serde(rename = "sueldoAcumulado")]
    pub cumulative_salary: String,
    #[serde(rename = "sueldoMaximo")]
    pub max_salary: String,
    #[serde(rename = "ultimoSueldo")]
    pub latest_salary: String,
    #[serde(rename = "totalVistas")]
    pub views: i64,
    #[serde(rename = "ultimaVista")]
    pub last_view: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryOrder {
    /// Largest cumulative salary first (MAX per profile)
    Highest,
    /// Smallest non-zero cumulative salary first (MIN per profile)
    Lowest,
}

impl SalaryOrder {
    fn sql(&self) -> (&'static str, &'static str) {
        match self {
            SalaryOrder::Highest => ("MAX", "DESC"),
            SalaryOrder::Lowest => ("MIN", "ASC"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SalaryOrder::Highest => "mayores",
            SalaryOrder::Lowest => "menores",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    #[serde(rename = "busquedas")]
    pub searches: i64,
    #[serde(rename = "vistas")]
    pub views: i64,
    #[serde(rename = "usuariosUnicos")]
    pub unique_sessions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTotals {
    #[serde(rename = "busquedas")]
    pub searches: i64,
    #[serde(rename = "vistas")]
    pub views: i64,
    #[serde(rename = "usuariosNuevos")]
    pub new_sessions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralStats {
    #[serde(rename = "totales")]
    pub totals: Totals,
    #[serde(rename = "ultimas24Horas")]
    pub last_24_hours: RecentTotals,
}

fn money_2dp(value: Option<f64>) -> String {
    format!("{:.2}", value.unwrap_or(0.0))
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

fn count_since(conn: &Connection, table: &str, since: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE timestamp >= ?1", table);
    Ok(conn.query_row(&sql, [since], |row| row.get(0))?)
}

/// Most searched names, by number of searches
pub fn most_searched_names(conn: &Connection, limit: usize) -> Result<AnalyticsPage<SearchedName>> {
    let mut stmt = conn.prepare(
        "SELECT searched_name, COUNT(*) AS searches, COUNT(DISTINCT sid), MAX(timestamp)
         FROM query_log
         WHERE searched_name IS NOT NULL AND searched_name != ''
         GROUP BY searched_name
         ORDER BY searches DESC, searched_name ASC
         LIMIT ?1",
    )?;

    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(SearchedName {
                name: row.get(0)?,
                searches: row.get(1)?,
                unique_sessions: row.get(2)?,
                last_search: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let total_real = count(
        conn,
        "SELECT COUNT(DISTINCT searched_name) FROM query_log
         WHERE searched_name IS NOT NULL AND searched_name != ''",
    )?;

    Ok(AnalyticsPage::new(rows, total_real, None, limit))
}

/// Most viewed profile cards
pub fn most_viewed_profiles(conn: &Connection, limit: usize) -> Result<AnalyticsPage<ViewedProfile>> {
    let mut stmt = conn.prepare(
        "SELECT professor_name, obligated_entity, federative_entity,
                COUNT(*) AS views, COUNT(DISTINCT sid),
                AVG(max_salary), AVG(cumulative_salary), MAX(timestamp)
         FROM profile_views
         WHERE professor_name IS NOT NULL AND professor_name != ''
         GROUP BY professor_name, obligated_entity, federative_entity
         ORDER BY views DESC, professor_name ASC
         LIMIT ?1",
    )?;

    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(ViewedProfile {
                name: row.get(0)?,
                obligated_entity: row.get(1)?,
                federative_entity: row.get(2)?,
                views: row.get(3)?,
                unique_sessions: row.get(4)?,
                avg_max_salary: money_2dp(row.get(5)?),
                avg_cumulative_salary: money_2dp(row.get(6)?),
                last_view: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let total_real = count(
        conn,
        "SELECT COUNT(*) FROM (
            SELECT 1 FROM profile_views
            WHERE professor_name IS NOT NULL AND professor_name != ''
            GROUP BY professor_name, obligated_entity, federative_entity
         )",
    )?;
    let total_views = count(
        conn,
        "SELECT COUNT(*) FROM profile_views
         WHERE professor_name IS NOT NULL AND professor_name != ''",
    )?;

    Ok(AnalyticsPage::new(rows, total_real, Some(total_views), limit))
}

/// Profiles ranked by cumulative salary, excluding zero/unknown salaries
pub fn cumulative_salary_ranking(
    conn: &Connection,
    limit: usize,
    order: SalaryOrder,
) -> Result<AnalyticsPage<SalaryRanking>> {
    let (aggregate, direction) = order.sql();
    let sql = format!(
        "SELECT professor_name, obligated_entity, federative_entity,
                {aggregate}(cumulative_salary) AS ranked_salary,
                MAX(max_salary), MAX(latest_salary), COUNT(*), MAX(timestamp)
         FROM profile_views
         WHERE professor_name IS NOT NULL AND professor_name != ''
           AND cumulative_salary > 0
         GROUP BY professor_name, obligated_entity, federative_entity
         ORDER BY ranked_salary {direction}, professor_name ASC
         LIMIT ?1"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(SalaryRanking {
                name: row.get(0)?,
                obligated_entity: row.get(1)?,
                federative_entity: row.get(2)?,
                cumulative_salary: money_2dp(row.get(3)?),
                max_salary: money_2dp(row.get(4)?),
                latest_salary: money_2dp(row.get(5)?),
                views: row.get(6)?,
                last_view: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let total_real = count(
        conn,
        "SELECT COUNT(*) FROM (
            SELECT 1 FROM profile_views
            WHERE professor_name IS NOT NULL AND professor_name != ''
              AND cumulative_salary > 0
            GROUP BY professor_name, obligated_entity, federative_entity
         )",
    )?;
    let total_views = count(
        conn,
        "SELECT COUNT(*) FROM profile_views
         WHERE professor_name IS NOT NULL AND professor_name != ''
           AND cumulative_salary > 0",
    )?;

    Ok(AnalyticsPage::new(rows, total_real, Some(total_views), limit))
}

pub fn general_stats(conn: &Connection) -> Result<GeneralStats> {
    general_stats_at(conn, Utc::now())
}

/// Totals, plus the same counts over the 24 hours before `now`
pub fn general_stats_at(conn: &Connection, now: DateTime<Utc>) -> Result<GeneralStats> {
    let since = format_timestamp(now - Duration::hours(24));

    Ok(GeneralStats {
        totals: Totals {
            searches: count(conn, "SELECT COUNT(*) FROM query_log")?,
            views: count(conn, "SELECT COUNT(*) FROM profile_views")?,
            unique_sessions: count(conn, "SELECT COUNT(DISTINCT sid) FROM new_sessions")?,
        },
        last_24_hours: RecentTotals {
            searches: count_since(conn, "query_log", &since)?,
            views: count_since(conn, "profile_views", &since)?,
            new_sessions: count_since(conn, "new_sessions", &since)?,
        },
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn query(name: &str, sid: &str, timestamp: DateTime<Utc>) -> QueryLogEntry {
        QueryLogEntry {
            timestamp,
            sid: Some(sid.to_string()),
            searched_name: Some(name.to_string()),
            federative_entity: None,
            total_records: 10,
            filtered_records: 2,
            duration_ms: 120,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: Some("test".to_string()),
        }
    }

    fn view(name: &str, sid: &str, cumulative: Option<f64>) -> ProfileViewEntry {
        ProfileViewEntry {
            timestamp: Utc::now(),
            sid: Some(sid.to_string()),
            professor_id: Some("p1".to_string()),
            professor_name: Some(name.to_string()),
            obligated_entity: Some("UNAM".to_string()),
            federative_entity: Some("CDMX".to_string()),
            max_salary: Some(2500.0),
            cumulative_salary: cumulative,
            latest_salary: Some(2000.0),
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_db();
        setup_database(&conn).unwrap();
    }

    #[test]
    fn test_most_searched_names() {
        let conn = test_db();
        let now = Utc::now();

        log_query(&conn, &query("Ana Ruiz", "s1", now)).unwrap();
        log_query(&conn, &query("Ana Ruiz", "s2", now)).unwrap();
        log_query(&conn, &query("Ana Ruiz", "s2", now)).unwrap();
        log_query(&conn, &query("Beto Gil", "s1", now)).unwrap();
        log_query(&conn, &query("", "s1", now)).unwrap();

        let page = most_searched_names(&conn, DEFAULT_LIMIT).unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.total_real, 2);
        assert_eq!(page.data[0].name, "Ana Ruiz");
        assert_eq!(page.data[0].searches, 3);
        assert_eq!(page.data[0].unique_sessions, 2);

        let limited = most_searched_names(&conn, 1).unwrap();
        assert_eq!(limited.total, 1);
        assert_eq!(limited.total_real, 2);
    }

    #[test]
    fn test_searched_name_json_keys() {
        let conn = test_db();
        log_query(&conn, &query("Ana Ruiz", "s1", Utc::now())).unwrap();

        let page = most_searched_names(&conn, DEFAULT_LIMIT).unwrap();
        let value = serde_json::to_value(&page).unwrap();
        let row = &value["data"][0];

        assert_eq!(row["nombre_profesor"], "Ana Ruiz");
        assert_eq!(row["total_busquedas"], 1);
        assert_eq!(row["usuarios_unicos"], 1);
        assert!(row["ultima_busqueda"].is_string());
        assert!(row.get("nombreProfesor").is_none());
    }

    #[test]
    fn test_most_viewed_profiles() {
        let conn = test_db();

        log_profile_view(&conn, &view("Ana Ruiz", "s1", Some(3500.0))).unwrap();
        log_profile_view(&conn, &view("Ana Ruiz", "s2", Some(4500.0))).unwrap();
        log_profile_view(&conn, &view("Beto Gil", "s1", None)).unwrap();

        let page = most_viewed_profiles(&conn, DEFAULT_LIMIT).unwrap();

        assert_eq!(page.total_real, 2);
        assert_eq!(page.total_views, Some(3));
        assert_eq!(page.data[0].name, "Ana Ruiz");
        assert_eq!(page.data[0].views, 2);
        assert_eq!(page.data[0].avg_cumulative_salary, "4000.00");
        assert_eq!(page.data[1].avg_cumulative_salary, "0.00");
    }

    #[test]
    fn test_cumulative_salary_ranking() {
        let conn = test_db();

        log_profile_view(&conn, &view("Ana Ruiz", "s1", Some(3500.0))).unwrap();
        log_profile_view(&conn, &view("Ana Ruiz", "s1", Some(5000.0))).unwrap();
        log_profile_view(&conn, &view("Beto Gil", "s1", Some(4000.0))).unwrap();
        log_profile_view(&conn, &view("Cero", "s1", Some(0.0))).unwrap();
        log_profile_view(&conn, &view("Nulo", "s1", None)).unwrap();

        let top = cumulative_salary_ranking(&conn, DEFAULT_LIMIT, SalaryOrder::Highest).unwrap();
        assert_eq!(top.total_real, 2);
        assert_eq!(top.total_views, Some(3));
        assert_eq!(top.data[0].name, "Ana Ruiz");
        assert_eq!(top.data[0].cumulative_salary, "5000.00");

        let bottom = cumulative_salary_ranking(&conn, DEFAULT_LIMIT, SalaryOrder::Lowest).unwrap();
        assert_eq!(bottom.data[0].name, "Ana Ruiz");
        assert_eq!(bottom.data[0].cumulative_salary, "3500.00");
        assert_eq!(bottom.data[1].name, "Beto Gil");
    }

    #[test]
    fn test_general_stats_window() {
        let conn = test_db();
        let now = Utc::now();

        log_query(&conn, &query("Ana", "s1", now - Duration::hours(1))).unwrap();
        log_query(&conn, &query("Ana", "s1", now - Duration::hours(48))).unwrap();
        log_new_session(
            &conn,
            &NewSessionEntry {
                timestamp: now - Duration::hours(2),
                sid: "s1".to_string(),
                ip_address: "127.0.0.1".to_string(),
                user_agent: "test".to_string(),
                method: "POST".to_string(),
                path: "/api/consulta".to_string(),
            },
        )
        .unwrap();
        log_profile_view(&conn, &view("Ana", "s1", Some(1.0))).unwrap();

        let stats = general_stats_at(&conn, now).unwrap();

        assert_eq!(stats.totals.searches, 2);
        assert_eq!(stats.totals.views, 1);
        assert_eq!(stats.totals.unique_sessions, 1);
        assert_eq!(stats.last_24_hours.searches, 1);
        assert_eq!(stats.last_24_hours.new_sessions, 1);
    }

    #[test]
    fn test_profile_view_request_parses_salaries() {
        let request: ProfileViewRequest = serde_json::from_value(json!({
            "professorId": 77,
            "nombreProfesor": "Ana Ruiz",
            "sueldoMaximo": "$2,500.00",
            "sueldoAcumulado": 3500,
            "ultimoSueldo": "N/A"
        }))
        .unwrap();

        let entry = ProfileViewEntry::from_request(&request, Some("s1".to_string()), None, None);

        assert_eq!(entry.professor_id.as_deref(), Some("77"));
        assert_eq!(entry.max_salary, Some(2500.0));
        assert_eq!(entry.cumulative_salary, Some(3500.0));
        assert_eq!(entry.latest_salary, None);
        assert!(entry.obligated_entity.is_none());
    }

    #[test]
    fn test_general_stats_json_shape() {
        let conn = test_db();
        let value = serde_json::to_value(general_stats(&conn).unwrap()).unwrap();

        assert_eq!(value["totales"]["busquedas"], 0);
        assert_eq!(value["ultimas24Horas"]["usuariosNuevos"], 0);
    }
}
