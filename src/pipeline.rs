//! Profile pipeline orchestration
//!
//! Sequences the derivation stages over a full event collection and
//! assembles the site profile. Every build is a fresh re-derivation.

use crate::auth::AuthClassifier;
use crate::config::BrainConfig;
use crate::endpoints::EndpointClusterer;
use crate::error::BrainError;
use crate::fusion::EventFuser;
use crate::performance::PerformanceSummarizer;
use crate::realtime::RealtimeTracker;
use crate::schema::Event;
use crate::third_party::ThirdPartyDetector;
use crate::types::{Exchange, Profile, Service, Site};
use chrono::Utc;
use std::collections::HashMap;

/// Origin reported when no HTTP exchange was captured
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Build a profile with the default configuration (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let profile = build_profile(&events)?;
/// println!("{}", render_summary(&profile));
/// ```
pub fn build_profile(events: &[Event]) -> Result<Profile, BrainError> {
    ProfileBuilder::new().build(events)
}

/// Builder holding the configuration-dependent stages
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    origin_host: Option<String>,
    third_parties: ThirdPartyDetector,
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileBuilder {
    /// Builder with built-in providers and first-exchange origin
    pub fn new() -> Self {
        Self {
            origin_host: None,
            third_parties: ThirdPartyDetector::new(),
        }
    }

    pub fn from_config(config: &BrainConfig) -> Self {
        let mut third_parties =
            ThirdPartyDetector::new().with_providers(config.extra_providers.iter().cloned());
        if let Some(host) = &config.origin_host {
            third_parties = third_parties.with_origin_host(host.clone());
        }

        Self {
            origin_host: config.origin_host.clone(),
            third_parties,
        }
    }

    /// Derive a profile from the full event collection.
    ///
    /// Pipeline stages:
    /// 1. EventFuser - Pair requests with responses
    /// 2. EndpointClusterer, AuthClassifier, ThirdPartyDetector,
    ///    PerformanceSummarizer - Reduce exchanges
    /// 3. RealtimeTracker - Reduce raw WebSocket events
    pub fn build(&self, events: &[Event]) -> Result<Profile, BrainError> {
        if events.is_empty() {
            return Err(BrainError::NoData);
        }

        // Stage 1: Fuse HTTP events into exchanges
        let exchanges = EventFuser::fuse(events);
        log::debug!("fused {} events into {} exchanges", events.len(), exchanges.len());

        // Stage 2: Reduce exchanges
        let site = self.derive_site(&exchanges);
        let services = derive_services(&exchanges);
        let auth = AuthClassifier::classify(&exchanges);
        let endpoints = EndpointClusterer::cluster(&exchanges);
        let third_parties = self.third_parties.detect(&exchanges);
        let performance = PerformanceSummarizer::summarize(&exchanges);

        // Stage 3: Reduce WebSocket events
        let realtime = RealtimeTracker::track(events);

        Ok(Profile {
            site,
            services,
            auth,
            endpoints,
            realtime,
            third_parties,
            risks: Vec::new(),
            performance,
        })
    }

    fn derive_site(&self, exchanges: &[Exchange<'_>]) -> Site {
        let origin = match (&self.origin_host, exchanges.first()) {
            (Some(host), _) => host.clone(),
            (None, Some(first)) => {
                let url = &first.request.http.url;
                url.raw
                    .clone()
                    .filter(|raw| !raw.is_empty())
                    .or_else(|| url.host.clone().filter(|host| !host.is_empty()))
                    .unwrap_or_else(|| first.host())
            }
            (None, None) => UNKNOWN_ORIGIN.to_string(),
        };

        Site {
            origin,
            captured_at: Utc::now(),
        }
    }
}

/// Request count per host, descending; ties keep first-seen order
fn derive_services(exchanges: &[Exchange<'_>]) -> Vec<Service> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut services: Vec<Service> = Vec::new();

    for exchange in exchanges {
        let host = exchange.host();
        match slots.get(&host) {
            Some(&slot) => services[slot].request_count += 1,
            None => {
                slots.insert(host.clone(), services.len());
                services.push(Service {
                    host,
                    request_count: 1,
                });
            }
        }
    }

    services.sort_by(|a, b| b.request_count.cmp(&a.request_count));
    services
}
