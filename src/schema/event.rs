//! Canonical capture event definition
//!
//! One `Event` is one observed network occurrence: an HTTP request, an HTTP
//! response, or a WebSocket lifecycle/frame notification. The wire record
//! (`CanonicalEvent`) is validated into an `Event` whose payload is a tagged
//! union, so every consumer matches on the protocol instead of probing
//! optional fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Correlation map key linking requests to responses and sockets to frames
pub const CORRELATION_KEY: &str = "cdpRequestId";

/// Capture plane stamped on every event by the extension
pub const DEFAULT_PLANE: &str = "A";

fn default_plane() -> String {
    DEFAULT_PLANE.to_string()
}

/// Transport protocol of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Ws,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Ws => "ws",
        }
    }
}

/// Lifecycle phase of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Request,
    Response,
    WsOpen,
    WsFrame,
    WsClose,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Request => "request",
            Phase::Response => "response",
            Phase::WsOpen => "ws_open",
            Phase::WsFrame => "ws_frame",
            Phase::WsClose => "ws_close",
        }
    }

    /// Protocol this phase belongs to
    pub fn protocol(&self) -> Protocol {
        match self {
            Phase::Request | Phase::Response => Protocol::Http,
            Phase::WsOpen | Phase::WsFrame | Phase::WsClose => Protocol::Ws,
        }
    }
}

/// Body content classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Json,
    Text,
    Binary,
    #[default]
    None,
}

/// Body descriptor (contents are never captured verbatim)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpBody {
    #[serde(default)]
    pub kind: BodyKind,
    /// Body size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
}

/// Timing breakdown in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpTiming {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// Cache descriptor reported by the browser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpCache {
    #[serde(default)]
    pub from_cache: bool,
    /// Raw `Cache-Control` value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// URL components as captured; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// URL resolved to the pieces the derivation stages key on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// Host, with `:port` appended for non-default ports
    pub host: String,
    pub path: String,
    pub query: Option<String>,
}

impl ResolvedUrl {
    fn from_url(url: &Url) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        ResolvedUrl {
            host,
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
        }
    }

    /// Names of query parameters carrying a non-empty value, in query order
    pub fn query_names(&self) -> Vec<String> {
        match &self.query {
            Some(query) => url::form_urlencoded::parse(query.as_bytes())
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, _)| name.into_owned())
                .collect(),
            None => Vec::new(),
        }
    }
}

impl UrlParts {
    /// Resolve to host/path/query.
    ///
    /// An absolute http(s) raw URL wins; otherwise `https://{host}{path}` is
    /// synthesized from the recorded components.
    pub fn resolve(&self) -> ResolvedUrl {
        if let Some(raw) = self.raw.as_deref().filter(|raw| raw.starts_with("http")) {
            if let Ok(parsed) = Url::parse(raw) {
                if parsed.host_str().is_some() {
                    return ResolvedUrl::from_url(&parsed);
                }
            }
        }

        let host = self.host.clone().unwrap_or_default();
        let path = self.path.clone().unwrap_or_default();

        if !host.is_empty() {
            if let Ok(parsed) = Url::parse(&format!("https://{host}{path}")) {
                return ResolvedUrl::from_url(&parsed);
            }
        }

        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path, None),
        };
        ResolvedUrl { host, path, query }
    }
}

/// Header maps split by direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeaders {
    #[serde(default)]
    pub req: BTreeMap<String, String>,
    #[serde(default)]
    pub res: BTreeMap<String, String>,
}

/// Exact lowercase key first, then any casing
fn lookup_header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_ascii_lowercase())
        .or_else(|| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}

impl HttpHeaders {
    /// Case-insensitive request header lookup
    pub fn request(&self, name: &str) -> Option<&str> {
        lookup_header(&self.req, name)
    }

    /// Case-insensitive response header lookup
    pub fn response(&self, name: &str) -> Option<&str> {
        lookup_header(&self.res, name)
    }
}

/// HTTP payload of a request or response event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpInfo {
    pub method: String,
    #[serde(default)]
    pub url: UrlParts,
    /// Status code (responses only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: HttpHeaders,
    #[serde(default)]
    pub body: HttpBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<HttpTiming>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<HttpCache>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<BTreeMap<String, String>>,
}

impl HttpInfo {
    /// Minimal payload with only a method and raw URL
    pub fn new(method: impl Into<String>, raw_url: impl Into<String>) -> Self {
        HttpInfo {
            method: method.into(),
            url: UrlParts {
                raw: Some(raw_url.into()),
                host: None,
                path: None,
            },
            status: None,
            headers: HttpHeaders::default(),
            body: HttpBody::default(),
            timing: None,
            cache: None,
            initiator: None,
        }
    }

    /// Time-to-first-byte, when timing data was captured
    pub fn ttfb(&self) -> Option<f64> {
        self.timing.as_ref().and_then(|t| t.ttfb)
    }
}

/// Frame direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WsDirection {
    Send,
    Recv,
}

/// WebSocket payload of an open/frame/close event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsInfo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<WsDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl WsInfo {
    pub fn new(url: impl Into<String>) -> Self {
        WsInfo {
            url: url.into(),
            direction: None,
            opcode: None,
            size: None,
            hash: None,
            preview: None,
        }
    }
}

/// Wire record as emitted by the capture extension (one JSON object per line)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    pub id: String,
    #[serde(default = "default_plane")]
    pub plane: String,
    #[serde(rename = "type")]
    pub protocol: Protocol,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
    pub ts: f64,
    #[serde(default)]
    pub corr: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws: Option<WsInfo>,
}

/// Protocol-specific payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Http(HttpInfo),
    Ws(WsInfo),
}

/// A validated capture event. Immutable once accepted into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CanonicalEvent", into = "CanonicalEvent")]
pub struct Event {
    pub id: String,
    pub plane: String,
    pub phase: Phase,
    pub tab_id: Option<i64>,
    pub frame_id: Option<String>,
    /// Capture timestamp (epoch seconds)
    pub ts: f64,
    pub corr: BTreeMap<String, String>,
    pub payload: Payload,
}

impl Event {
    /// Create an HTTP event
    pub fn http(id: impl Into<String>, phase: Phase, info: HttpInfo) -> Self {
        Self::with_payload(id.into(), phase, Payload::Http(info))
    }

    /// Create a WebSocket event
    pub fn ws(id: impl Into<String>, phase: Phase, info: WsInfo) -> Self {
        Self::with_payload(id.into(), phase, Payload::Ws(info))
    }

    fn with_payload(id: String, phase: Phase, payload: Payload) -> Self {
        Event {
            id,
            plane: default_plane(),
            phase,
            tab_id: None,
            frame_id: None,
            ts: 0.0,
            corr: BTreeMap::new(),
            payload,
        }
    }

    /// Set the correlation id
    pub fn with_correlation(mut self, request_id: impl Into<String>) -> Self {
        self.corr
            .insert(CORRELATION_KEY.to_string(), request_id.into());
        self
    }

    pub fn protocol(&self) -> Protocol {
        match self.payload {
            Payload::Http(_) => Protocol::Http,
            Payload::Ws(_) => Protocol::Ws,
        }
    }

    /// Per-protocol request identifier; an empty value counts as absent
    pub fn correlation_id(&self) -> Option<&str> {
        self.corr
            .get(CORRELATION_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn http_info(&self) -> Option<&HttpInfo> {
        match &self.payload {
            Payload::Http(info) => Some(info),
            Payload::Ws(_) => None,
        }
    }

    pub fn ws_info(&self) -> Option<&WsInfo> {
        match &self.payload {
            Payload::Ws(info) => Some(info),
            Payload::Http(_) => None,
        }
    }
}

impl TryFrom<CanonicalEvent> for Event {
    type Error = ValidationError;

    fn try_from(record: CanonicalEvent) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }

        if record.phase.protocol() != record.protocol {
            return Err(ValidationError::PhaseMismatch {
                id: record.id,
                protocol: record.protocol.as_str(),
                phase: record.phase.as_str(),
            });
        }

        let payload = match record.protocol {
            Protocol::Http => record.http.map(Payload::Http),
            Protocol::Ws => record.ws.map(Payload::Ws),
        };
        let payload = payload.ok_or_else(|| ValidationError::MissingPayload {
            id: record.id.clone(),
            protocol: record.protocol.as_str(),
        })?;

        Ok(Event {
            id: record.id,
            plane: record.plane,
            phase: record.phase,
            tab_id: record.tab_id,
            frame_id: record.frame_id,
            ts: record.ts,
            corr: record.corr,
            payload,
        })
    }
}

impl From<Event> for CanonicalEvent {
    fn from(event: Event) -> Self {
        let protocol = event.protocol();
        let (http, ws) = match event.payload {
            Payload::Http(info) => (Some(info), None),
            Payload::Ws(info) => (None, Some(info)),
        };
        CanonicalEvent {
            id: event.id,
            plane: event.plane,
            protocol,
            phase: event.phase,
            tab_id: event.tab_id,
            frame_id: event.frame_id,
            ts: event.ts,
            corr: event.corr,
            http,
            ws,
        }
    }
}

/// Structural validation failures at the ingestion boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Event id must not be empty")]
    EmptyId,

    #[error("Event {id} declares type {protocol} but carries no {protocol} payload")]
    MissingPayload { id: String, protocol: &'static str },

    #[error("Event {id}: phase {phase} is not valid for type {protocol}")]
    PhaseMismatch {
        id: String,
        protocol: &'static str,
        phase: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_http_request() {
        let json = r#"{
            "id": "evt_1r",
            "plane": "A",
            "type": "http",
            "phase": "request",
            "tabId": 1,
            "frameId": "frame1",
            "ts": 1.0,
            "corr": {"cdpRequestId": "1"},
            "http": {
                "method": "GET",
                "url": {"raw": "https://example.com/api/users/1", "host": "example.com"},
                "headers": {"req": {"Cookie": "session=abc"}},
                "body": {"kind": "none", "size": 0}
            }
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.protocol(), Protocol::Http);
        assert_eq!(event.phase, Phase::Request);
        assert_eq!(event.correlation_id(), Some("1"));
        assert_eq!(event.tab_id, Some(1));

        let http = event.http_info().unwrap();
        assert_eq!(http.method, "GET");
        assert_eq!(http.headers.request("cookie"), Some("session=abc"));
        assert!(http.url.path.is_none());
    }

    #[test]
    fn test_missing_payload_is_rejected() {
        let json = r#"{"id": "evt_2", "type": "ws", "phase": "ws_open", "ts": 2.0}"#;
        let err = serde_json::from_str::<Event>(json).unwrap_err();
        assert!(err.to_string().contains("carries no ws payload"));
    }

    #[test]
    fn test_phase_protocol_mismatch() {
        let record = CanonicalEvent {
            id: "evt_3".to_string(),
            plane: default_plane(),
            protocol: Protocol::Http,
            phase: Phase::WsFrame,
            tab_id: None,
            frame_id: None,
            ts: 3.0,
            corr: BTreeMap::new(),
            http: Some(HttpInfo::new("GET", "https://example.com/")),
            ws: None,
        };

        assert_eq!(
            Event::try_from(record).unwrap_err(),
            ValidationError::PhaseMismatch {
                id: "evt_3".to_string(),
                protocol: "http",
                phase: "ws_frame",
            }
        );
    }

    #[test]
    fn test_serializes_back_to_wire_shape() {
        let event = Event::ws("evt_ws", Phase::WsOpen, WsInfo::new("wss://example.com/socket"))
            .with_correlation("ws1");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "ws");
        assert_eq!(value["phase"], "ws_open");
        assert_eq!(value["corr"]["cdpRequestId"], "ws1");
        assert_eq!(value["ws"]["url"], "wss://example.com/socket");
        assert!(value.get("http").is_none());
    }

    #[test]
    fn test_empty_correlation_counts_as_absent() {
        let event = Event::http("evt_4", Phase::Request, HttpInfo::new("GET", "https://a.com/"))
            .with_correlation("");
        assert_eq!(event.correlation_id(), None);
    }

    #[test]
    fn test_resolve_prefers_absolute_raw_url() {
        let parts = UrlParts {
            raw: Some("https://api.example.com:8443/v1/items?page=2&q=".to_string()),
            host: Some("ignored.example.com".to_string()),
            path: Some("/ignored".to_string()),
        };
        let resolved = parts.resolve();

        assert_eq!(resolved.host, "api.example.com:8443");
        assert_eq!(resolved.path, "/v1/items");
        assert_eq!(resolved.query_names(), vec!["page".to_string()]);
    }

    #[test]
    fn test_resolve_synthesizes_from_host_and_path() {
        let parts = UrlParts {
            raw: Some("/relative/only".to_string()),
            host: Some("example.com".to_string()),
            path: Some("/api/users/7?expand=true".to_string()),
        };
        let resolved = parts.resolve();

        assert_eq!(resolved.host, "example.com");
        assert_eq!(resolved.path, "/api/users/7");
        assert_eq!(resolved.query.as_deref(), Some("expand=true"));
    }

    #[test]
    fn test_resolve_without_host() {
        let parts = UrlParts {
            raw: None,
            host: None,
            path: Some("/health?verbose=1".to_string()),
        };
        let resolved = parts.resolve();

        assert_eq!(resolved.host, "");
        assert_eq!(resolved.path, "/health");
        assert_eq!(resolved.query_names(), vec!["verbose".to_string()]);
    }

    #[test]
    fn test_resolve_normalizes_host_and_path() {
        let parts = UrlParts {
            raw: Some("https://Example.com:443/api/../Admin/café".to_string()),
            host: None,
            path: None,
        };
        let resolved = parts.resolve();

        assert_eq!(resolved.host, "example.com");
        assert_eq!(resolved.path, "/Admin/caf%C3%A9");
    }

    #[test]
    fn test_header_lookup_prefers_lowercase_key() {
        let mut headers = HttpHeaders::default();
        headers.req.insert("Cookie".to_string(), "upper=1".to_string());
        headers.req.insert("cookie".to_string(), "lower=1".to_string());
        headers.res.insert("Cache-Control".to_string(), "max-age=5".to_string());

        assert_eq!(headers.request("cookie"), Some("lower=1"));
        assert_eq!(headers.response("cache-control"), Some("max-age=5"));
    }
}
