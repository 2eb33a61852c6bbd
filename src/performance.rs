//! Performance summary
//!
//! Median time-to-first-byte and 95th percentile response payload size.

use crate::types::{Exchange, PerformanceSummary};

const BYTES_PER_KB: f64 = 1024.0;
const PAYLOAD_PERCENTILE: f64 = 0.95;

/// Summarizer for coarse performance statistics
pub struct PerformanceSummarizer;

impl PerformanceSummarizer {
    /// Summarize exchanges; both statistics are 0 without samples
    pub fn summarize(exchanges: &[Exchange<'_>]) -> PerformanceSummary {
        let responses = exchanges.iter().filter_map(|x| x.response);

        let ttfbs: Vec<f64> = responses.clone().filter_map(|r| r.http.ttfb()).collect();
        let payloads: Vec<u64> = responses.map(|r| r.http.body.size).collect();

        PerformanceSummary {
            median_ttfb: median(ttfbs).unwrap_or(0.0),
            p95_payload_kb: nearest_rank(payloads, PAYLOAD_PERCENTILE)
                .map(|bytes| bytes as f64 / BYTES_PER_KB)
                .unwrap_or(0.0),
        }
    }
}

/// Median, averaging the two middle values for even counts
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Value at index `floor(p * (n - 1))` of the ascending-sorted samples
fn nearest_rank(mut values: Vec<u64>, percentile: f64) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();

    let idx = (percentile * (values.len() - 1) as f64).floor() as usize;
    values.get(idx.min(values.len() - 1)).copied()
}
