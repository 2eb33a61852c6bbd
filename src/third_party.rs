//! Third-party detection
//!
//! Every host other than the site's own is a third party. Hosts matching a
//! known provider suffix are labelled with the provider's name; anything
//! else is labelled with the host itself.

use crate::config::ProviderRule;
use crate::types::{Exchange, ThirdPartyEntry};
use std::collections::HashSet;

/// Built-in provider table as (host suffix, provider name). First match wins.
pub const KNOWN_PROVIDERS: &[(&str, &str)] = &[
    ("google-analytics.com", "Google Analytics"),
    ("googletagmanager.com", "Google Tag Manager"),
    ("segment.io", "Segment"),
    ("sentry.io", "Sentry"),
    ("stripe.com", "Stripe"),
    ("paypal.com", "PayPal"),
    ("facebook.com", "Facebook"),
    ("tiktok.com", "TikTok"),
];

/// Detector for classifying non-origin hosts
#[derive(Debug, Clone)]
pub struct ThirdPartyDetector {
    providers: Vec<ProviderRule>,
    origin_host: Option<String>,
}

impl Default for ThirdPartyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ThirdPartyDetector {
    /// Detector with the built-in provider table
    pub fn new() -> Self {
        Self {
            providers: KNOWN_PROVIDERS
                .iter()
                .map(|(suffix, name)| ProviderRule::new(*suffix, *name))
                .collect(),
            origin_host: None,
        }
    }

    /// Append providers after the built-in table
    pub fn with_providers(mut self, extra: impl IntoIterator<Item = ProviderRule>) -> Self {
        self.providers.extend(extra);
        self
    }

    /// Pin the site host instead of taking it from the first exchange
    pub fn with_origin_host(mut self, host: impl Into<String>) -> Self {
        self.origin_host = Some(host.into());
        self
    }

    /// Provider name for a host, if it matches a known suffix
    pub fn provider_for(&self, host: &str) -> Option<&str> {
        self.providers
            .iter()
            .find(|rule| host.ends_with(rule.suffix.as_str()))
            .map(|rule| rule.name.as_str())
    }

    /// Detect third parties, deduplicated by (provider, host) in first-seen order
    pub fn detect(&self, exchanges: &[Exchange<'_>]) -> Vec<ThirdPartyEntry> {
        let site_host = match &self.origin_host {
            Some(host) => host.clone(),
            None => match exchanges.first() {
                Some(first) => first.host(),
                None => return Vec::new(),
            },
        };

        let mut seen: HashSet<ThirdPartyEntry> = HashSet::new();
        let mut third_parties = Vec::new();

        for exchange in exchanges {
            let host = exchange.host();
            if host == site_host {
                continue;
            }

            let entry = ThirdPartyEntry {
                provider: self.provider_for(&host).unwrap_or(&host).to_string(),
                host,
            };
            if seen.insert(entry.clone()) {
                third_parties.push(entry);
            }
        }

        third_parties
    }
}
