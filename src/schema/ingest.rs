//! Line-oriented ingestion of capture events
//!
//! Input is newline-delimited JSON, one `CanonicalEvent` per line. Every
//! non-blank line yields an explicit outcome so callers can report what was
//! rejected and why instead of silently dropping bad records.

use crate::error::BrainError;
use crate::schema::event::Event;
use serde::Serialize;
use std::collections::HashSet;

/// What happened to a single input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineOutcome {
    Accepted { line: usize, id: String },
    /// Well-formed, but an event with this id is already stored
    Duplicate { line: usize, id: String },
    Rejected { line: usize, reason: String },
}

/// Result of ingesting one batch of lines
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    /// Size of the event collection after the batch
    pub total: usize,
    pub outcomes: Vec<LineOutcome>,
}

impl IngestReport {
    /// Outcomes for lines that could not be admitted
    pub fn rejections(&self) -> impl Iterator<Item = &LineOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LineOutcome::Rejected { .. }))
    }
}

/// Parse and validate a single JSON line
pub fn parse_event(line: &str) -> Result<Event, BrainError> {
    let event: Event = serde_json::from_str(line)?;
    Ok(event)
}

/// Parse NDJSON and append new events to `events`.
///
/// Events whose id is already present (in `events` or earlier in the same
/// batch) are reported as duplicates and not appended.
pub fn ingest_ndjson(data: &str, events: &mut Vec<Event>) -> IngestReport {
    let mut seen: HashSet<String> = events.iter().map(|e| e.id.clone()).collect();
    let mut report = IngestReport::default();

    for (line_num, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let line = line_num + 1;

        match parse_event(trimmed) {
            Ok(event) => {
                if seen.contains(&event.id) {
                    report.duplicates += 1;
                    report.outcomes.push(LineOutcome::Duplicate { line, id: event.id });
                    continue;
                }
                seen.insert(event.id.clone());
                report.accepted += 1;
                report.outcomes.push(LineOutcome::Accepted {
                    line,
                    id: event.id.clone(),
                });
                events.push(event);
            }
            Err(e) => {
                log::warn!("rejected event line {}: {}", line, e);
                report.rejected += 1;
                report.outcomes.push(LineOutcome::Rejected {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.total = events.len();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REQUEST_LINE: &str = r#"{"id":"evt_1r","type":"http","phase":"request","ts":1.0,"corr":{"cdpRequestId":"1"},"http":{"method":"GET","url":{"raw":"https://example.com/"}}}"#;

    #[test]
    fn test_ingest_accepts_valid_lines() {
        let mut events = Vec::new();
        let data = format!("{REQUEST_LINE}\n\n");
        let report = ingest_ndjson(&data, &mut events);

        assert_eq!(report.accepted, 1);
        assert_eq!(report.total, 1);
        assert_eq!(
            report.outcomes,
            vec![LineOutcome::Accepted {
                line: 1,
                id: "evt_1r".to_string()
            }]
        );
        assert_eq!(events[0].id, "evt_1r");
    }

    #[test]
    fn test_duplicate_ids_are_idempotent() {
        let mut events = Vec::new();
        ingest_ndjson(REQUEST_LINE, &mut events);
        let report = ingest_ndjson(REQUEST_LINE, &mut events);

        assert_eq!(report.accepted, 0);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.total, 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_duplicate_within_one_batch() {
        let mut events = Vec::new();
        let data = format!("{REQUEST_LINE}\n{REQUEST_LINE}");
        let report = ingest_ndjson(&data, &mut events);

        assert_eq!(report.accepted, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(
            report.outcomes[1],
            LineOutcome::Duplicate {
                line: 2,
                id: "evt_1r".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_lines_are_reported() {
        let mut events = Vec::new();
        let data = format!(
            "not json\n{}\n{REQUEST_LINE}",
            r#"{"id":"evt_x","type":"http","phase":"request","ts":1.0}"#
        );
        let report = ingest_ndjson(&data, &mut events);

        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected, 2);
        let lines: Vec<usize> = report
            .rejections()
            .map(|o| match o {
                LineOutcome::Rejected { line, .. } => *line,
                _ => 0,
            })
            .collect();
        assert_eq!(lines, vec![1, 2]);
    }
}
