//! Authentication classification
//!
//! Scans request headers for cookie and bearer-token evidence and decides
//! an overall authentication mode for the site.

use crate::types::{AuthMode, AuthProfile, Exchange};
use std::collections::BTreeSet;

const BEARER_SCHEME: &str = "bearer ";

/// Classifier for inferring the authentication posture
pub struct AuthClassifier;

impl AuthClassifier {
    /// Classify exchanges into an authentication profile
    pub fn classify(exchanges: &[Exchange<'_>]) -> AuthProfile {
        let mut cookie_names: BTreeSet<String> = BTreeSet::new();
        let mut cookie_evidence: Option<&str> = None;
        let mut bearer_evidence: Option<&str> = None;

        for exchange in exchanges {
            let headers = &exchange.request.http.headers;

            if headers.request("authorization").is_some_and(is_bearer) {
                bearer_evidence = Some(exchange.request.id());
            }

            if let Some(cookie_header) = headers.request("cookie").filter(|v| !v.is_empty()) {
                if cookie_evidence.is_none() {
                    cookie_evidence = Some(exchange.request.id());
                }
                cookie_names.extend(cookie_header_names(cookie_header));
            }
        }

        let mode = match (cookie_evidence.is_some(), bearer_evidence.is_some()) {
            (true, true) => AuthMode::Mixed,
            (false, true) => AuthMode::Bearer,
            (true, false) => AuthMode::Cookie,
            (false, false) => AuthMode::Unknown,
        };

        let evidence: Vec<String> = [cookie_evidence, bearer_evidence]
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();

        AuthProfile {
            mode,
            cookies: cookie_names.into_iter().collect(),
            evidence_ids: (!evidence.is_empty()).then_some(evidence),
        }
    }
}

fn is_bearer(value: &str) -> bool {
    value
        .get(..BEARER_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
}

/// Cookie names from a `Cookie` header (`a=1; b=2` -> `a`, `b`)
fn cookie_header_names(header: &str) -> impl Iterator<Item = String> + '_ {
    header
        .split(';')
        .map(|part| part.split_once('=').map_or(part, |(name, _)| name).trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
