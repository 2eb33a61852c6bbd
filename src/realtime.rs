//! Realtime channel tracking
//!
//! Counts WebSocket frames per socket URL. Works on raw events because
//! sockets are not part of HTTP fusion.

use crate::schema::{Event, Phase};
use crate::types::{RealtimeProfile, SocketSummary};
use std::collections::HashMap;

/// Tracker for aggregating WebSocket activity
pub struct RealtimeTracker;

impl RealtimeTracker {
    /// Aggregate frame counts per socket URL, in order of first open
    pub fn track(events: &[Event]) -> RealtimeProfile {
        let mut url_by_request: HashMap<&str, &str> = HashMap::new();
        let mut slot_by_url: HashMap<&str, usize> = HashMap::new();
        let mut sockets: Vec<SocketSummary> = Vec::new();

        for event in events {
            let Some(ws) = event.ws_info() else {
                continue;
            };

            match event.phase {
                Phase::WsOpen => {
                    let request_id = event.correlation_id().unwrap_or(&event.id);
                    url_by_request.insert(request_id, &ws.url);
                    slot_by_url.entry(&ws.url).or_insert_with(|| {
                        sockets.push(SocketSummary {
                            url: ws.url.clone(),
                            frame_count: 0,
                        });
                        sockets.len() - 1
                    });
                }
                Phase::WsFrame => {
                    let slot = event
                        .correlation_id()
                        .and_then(|id| url_by_request.get(id))
                        .and_then(|url| slot_by_url.get(url));
                    if let Some(&slot) = slot {
                        sockets[slot].frame_count += 1;
                    }
                }
                // Close events do not contribute to aggregation yet
                _ => {}
            }
        }

        RealtimeProfile { sockets }
    }
}
