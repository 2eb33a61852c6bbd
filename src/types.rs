//! Core types for the Agent Brain derivation engine
//!
//! This module defines the data structures that flow through each stage:
//! fused exchanges in the middle, and the site profile facets at the end.
//! Profile types serialize to the stable `profile.v1` JSON shape.

use crate::schema::{Event, HttpInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An HTTP event together with its (guaranteed) HTTP payload
#[derive(Debug, Clone, Copy)]
pub struct HttpMessage<'a> {
    pub event: &'a Event,
    pub http: &'a HttpInfo,
}

impl<'a> HttpMessage<'a> {
    /// Returns `None` for WebSocket events
    pub fn from_event(event: &'a Event) -> Option<Self> {
        event.http_info().map(|http| HttpMessage { event, http })
    }

    pub fn id(&self) -> &'a str {
        &self.event.id
    }
}

/// A request paired with its matching response, if one was captured
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub request: HttpMessage<'a>,
    pub response: Option<HttpMessage<'a>>,
}

impl<'a> Exchange<'a> {
    /// Host the request was sent to
    pub fn host(&self) -> String {
        self.request.http.url.resolve().host
    }
}

/// Site information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub origin: String,
    pub captured_at: DateTime<Utc>,
}

/// A contacted host and how many requests went to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub host: String,
    pub request_count: usize,
}

/// Overall authentication posture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Unknown,
    Cookie,
    Bearer,
    Mixed,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Unknown => "unknown",
            AuthMode::Cookie => "cookie",
            AuthMode::Bearer => "bearer",
            AuthMode::Mixed => "mixed",
        }
    }
}

/// Inferred authentication profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProfile {
    pub mode: AuthMode,
    /// Deduplicated, sorted cookie names
    pub cookies: Vec<String>,
    /// First cookie-bearing request id, then last bearer-bearing request id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_ids: Option<Vec<String>>,
}

/// Parameter names observed for an endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointParams {
    pub query: Vec<String>,
    /// Reserved; path parameters are expressed by the template placeholders
    pub path: Vec<String>,
}

/// Cacheability derived from `max-age`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    pub cacheable: bool,
    /// Time to live in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

/// Count of one error status code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCount {
    pub status: u16,
    pub count: usize,
}

/// Aggregate over exchanges sharing (host, path template, method)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub key: String,
    pub host: String,
    pub path_template: String,
    pub methods: Vec<String>,
    pub params: EndpointParams,
    pub cache: CachePolicy,
    /// Histogram of statuses >= 400, ascending by status
    pub errors: Vec<ErrorCount>,
    /// One event id per contributing exchange, in encounter order
    pub evidence_ids: Vec<String>,
}

/// Frame activity of one WebSocket URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketSummary {
    pub url: String,
    pub frame_count: usize,
}

/// Realtime channel activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeProfile {
    pub sockets: Vec<SocketSummary>,
}

/// A non-origin host, labelled with its provider when known
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThirdPartyEntry {
    pub provider: String,
    pub host: String,
}

/// Reserved risk finding; no derivation stage emits these yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub evidence_ids: Vec<String>,
}

/// Coarse performance statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Median time-to-first-byte (ms)
    #[serde(rename = "medianTTFB")]
    pub median_ttfb: f64,
    /// 95th percentile response payload size (KiB)
    #[serde(rename = "p95PayloadKB")]
    pub p95_payload_kb: f64,
}

/// Complete site profile (`profile.v1`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub site: Site,
    pub services: Vec<Service>,
    pub auth: AuthProfile,
    pub endpoints: Vec<Endpoint>,
    pub realtime: RealtimeProfile,
    pub third_parties: Vec<ThirdPartyEntry>,
    pub risks: Vec<Risk>,
    pub performance: PerformanceSummary,
}
