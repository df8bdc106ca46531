// 🆔 Session tracking - `sid` cookie, client IP, user agent
// Framework-agnostic: callers pass raw header values.

use serde::Serialize;

pub const SESSION_COOKIE: &str = "sid";

const UNKNOWN: &str = "unknown";

/// Who is asking, resolved once per request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSession {
    pub sid: String,
    /// No `sid` cookie was presented; a fresh id was issued
    pub is_new: bool,
    pub ip: String,
    pub user_agent: String,
}

impl ClientSession {
    /// Resolve session id and client metadata from raw header values
    pub fn resolve(
        cookie_header: Option<&str>,
        forwarded_for: Option<&str>,
        real_ip: Option<&str>,
        peer_addr: Option<&str>,
        user_agent: Option<&str>,
    ) -> Self {
        let existing = cookie_header.and_then(|h| read_cookie(h, SESSION_COOKIE));

        let (sid, is_new) = match existing {
            Some(sid) => (sid, false),
            None => (uuid::Uuid::new_v4().to_string(), true),
        };

        ClientSession {
            sid,
            is_new,
            ip: client_ip(forwarded_for, real_ip, peer_addr),
            user_agent: non_empty(user_agent).unwrap_or(UNKNOWN).to_string(),
        }
    }

    /// `Set-Cookie` value to send back for a new session
    pub fn set_cookie_header(&self) -> Option<String> {
        self.is_new.then(|| {
            format!(
                "{}={}; HttpOnly; SameSite=Lax; Path=/",
                SESSION_COOKIE, self.sid
            )
        })
    }
}

/// Value of cookie `name` in a `Cookie` header, if present and non-empty
pub fn read_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer
pub fn client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>, peer_addr: Option<&str>) -> String {
    let first_hop = forwarded_for
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    first_hop
        .or_else(|| non_empty(real_ip))
        .or_else(|| non_empty(peer_addr))
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie() {
        let header = "theme=dark; sid=abc-123 ; lang=es";
        assert_eq!(read_cookie(header, "sid").as_deref(), Some("abc-123"));
        assert_eq!(read_cookie(header, "lang").as_deref(), Some("es"));
        assert_eq!(read_cookie(header, "missing"), None);
        assert_eq!(read_cookie("sid=", "sid"), None);
    }

    #[test]
    fn test_existing_session() {
        let session = ClientSession::resolve(Some("sid=known"), None, None, Some("10.0.0.5"), Some("curl/8"));

        assert_eq!(session.sid, "known");
        assert!(!session.is_new);
        assert_eq!(session.ip, "10.0.0.5");
        assert_eq!(session.user_agent, "curl/8");
        assert!(session.set_cookie_header().is_none());
    }

    #[test]
    fn test_new_session_issues_cookie() {
        let session = ClientSession::resolve(None, None, None, None, None);

        assert!(session.is_new);
        assert_eq!(session.sid.len(), 36);
        assert_eq!(session.ip, "unknown");
        assert_eq!(session.user_agent, "unknown");

        let cookie = session.set_cookie_header().unwrap();
        assert!(cookie.starts_with(&format!("sid={};", session.sid)));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_client_ip_priority() {
        assert_eq!(
            client_ip(Some("203.0.113.7, 10.0.0.1"), Some("198.51.100.2"), Some("127.0.0.1")),
            "203.0.113.7"
        );
        assert_eq!(client_ip(None, Some("198.51.100.2"), Some("127.0.0.1")), "198.51.100.2");
        assert_eq!(client_ip(Some(" "), None, Some("127.0.0.1")), "127.0.0.1");
        assert_eq!(client_ip(None, None, None), "unknown");
    }
}
