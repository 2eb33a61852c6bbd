//! Endpoint clustering
//!
//! Groups exchanges by (host, path template, method) and accumulates, per
//! cluster: observed methods, query parameter names, cache policy, the
//! error status histogram and one evidence id per exchange.

use crate::templater::template_path;
use crate::types::{CachePolicy, Endpoint, EndpointParams, ErrorCount, Exchange, HttpMessage};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

lazy_static! {
    static ref MAX_AGE_PATTERN: Regex = Regex::new(r"max-age=(\d+)").expect("valid max-age regex");
}

/// Statuses at or above this are counted as errors
const ERROR_STATUS_THRESHOLD: u16 = 400;

/// Clusterer for grouping exchanges into endpoints
pub struct EndpointClusterer;

impl EndpointClusterer {
    /// Cluster exchanges into endpoints.
    ///
    /// Output is ordered by the first exchange that created each cluster.
    pub fn cluster(exchanges: &[Exchange<'_>]) -> Vec<Endpoint> {
        let mut order: Vec<String> = Vec::new();
        let mut clusters: HashMap<String, ClusterAccumulator> = HashMap::new();

        for exchange in exchanges {
            let request = exchange.request.http;
            let resolved = request.url.resolve();
            let path_template = template_path(&resolved.path);
            let method = request.method.to_uppercase();
            let key = format!("{}{}{}", resolved.host, path_template, method);

            let cluster = clusters.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                ClusterAccumulator::new(key, resolved.host.clone(), path_template)
            });

            cluster.methods.insert(method);
            cluster.query.extend(resolved.query_names());
            cluster.add_outcome(exchange);
        }

        let endpoints: Vec<Endpoint> = order
            .into_iter()
            .filter_map(|key| clusters.remove(&key))
            .map(ClusterAccumulator::finish)
            .collect();

        log::debug!("clustered {} exchanges into {} endpoints", exchanges.len(), endpoints.len());
        endpoints
    }
}

/// Mutable state for one endpoint cluster
struct ClusterAccumulator {
    key: String,
    host: String,
    path_template: String,
    methods: BTreeSet<String>,
    query: BTreeSet<String>,
    cache: CachePolicy,
    errors: BTreeMap<u16, usize>,
    evidence_ids: Vec<String>,
}

impl ClusterAccumulator {
    fn new(key: String, host: String, path_template: String) -> Self {
        ClusterAccumulator {
            key,
            host,
            path_template,
            methods: BTreeSet::new(),
            query: BTreeSet::new(),
            cache: CachePolicy::default(),
            errors: BTreeMap::new(),
            evidence_ids: Vec::new(),
        }
    }

    fn add_outcome(&mut self, exchange: &Exchange<'_>) {
        let Some(response) = exchange.response else {
            self.evidence_ids.push(exchange.request.id().to_string());
            return;
        };

        if let Some(status) = response.http.status.filter(|s| *s >= ERROR_STATUS_THRESHOLD) {
            *self.errors.entry(status).or_insert(0) += 1;
        }
        self.evidence_ids.push(response.id().to_string());

        if let Some(ttl) = max_age(&response) {
            self.cache = CachePolicy {
                cacheable: true,
                ttl: Some(ttl),
            };
        }
    }

    fn finish(self) -> Endpoint {
        Endpoint {
            key: self.key,
            host: self.host,
            path_template: self.path_template,
            methods: self.methods.into_iter().collect(),
            params: EndpointParams {
                query: self.query.into_iter().collect(),
                path: Vec::new(),
            },
            cache: self.cache,
            errors: self
                .errors
                .into_iter()
                .map(|(status, count)| ErrorCount { status, count })
                .collect(),
            evidence_ids: self.evidence_ids,
        }
    }
}

/// Positive `max-age` from the cache descriptor, else the `Cache-Control` header
fn max_age(response: &HttpMessage<'_>) -> Option<u64> {
    let control = response
        .http
        .cache
        .as_ref()
        .and_then(|c| c.control.as_deref())
        .or_else(|| response.http.headers.response("cache-control"))?;

    MAX_AGE_PATTERN
        .captures(control)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .filter(|ttl| *ttl > 0)
}
