//! HTTP event fusion
//!
//! Pairs request and response events sharing a correlation id into
//! exchanges. Fusion is request-keyed: a response without a request is
//! dropped, a request without a response is kept.

use crate::schema::{Event, Phase};
use crate::types::{Exchange, HttpMessage};
use std::collections::HashMap;

/// Fuser for turning raw HTTP events into exchanges
pub struct EventFuser;

impl EventFuser {
    /// Fuse events into one exchange per distinct request correlation id.
    ///
    /// The latest request and latest response seen for an id win. Output is
    /// ordered by the first appearance of each request id.
    pub fn fuse(events: &[Event]) -> Vec<Exchange<'_>> {
        let mut order: Vec<&str> = Vec::new();
        let mut requests: HashMap<&str, HttpMessage<'_>> = HashMap::new();
        let mut responses: HashMap<&str, HttpMessage<'_>> = HashMap::new();

        for event in events {
            let Some(message) = HttpMessage::from_event(event) else {
                continue;
            };
            let Some(request_id) = event.correlation_id() else {
                continue;
            };

            match event.phase {
                Phase::Request => {
                    if requests.insert(request_id, message).is_none() {
                        order.push(request_id);
                    }
                }
                Phase::Response => {
                    responses.insert(request_id, message);
                }
                _ => {}
            }
        }

        order
            .into_iter()
            .filter_map(|request_id| {
                let request = *requests.get(request_id)?;
                Some(Exchange {
                    request,
                    response: responses.get(request_id).copied(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HttpInfo, WsInfo};

    fn request(id: &str, corr: &str) -> Event {
        Event::http(id, Phase::Request, HttpInfo::new("GET", "https://example.com/"))
            .with_correlation(corr)
    }

    fn response(id: &str, corr: &str) -> Event {
        let mut info = HttpInfo::new("GET", "https://example.com/");
        info.status = Some(200);
        Event::http(id, Phase::Response, info).with_correlation(corr)
    }

    fn ids(exchanges: &[Exchange<'_>]) -> Vec<(String, Option<String>)> {
        exchanges
            .iter()
            .map(|x| {
                (
                    x.request.id().to_string(),
                    x.response.map(|r| r.id().to_string()),
                )
            })
            .collect()
    }

    #[test]
    fn test_pairs_request_and_response() {
        let events = vec![request("r1", "1"), response("p1", "1")];
        let exchanges = EventFuser::fuse(&events);

        assert_eq!(ids(&exchanges), vec![("r1".into(), Some("p1".into()))]);
    }

    #[test]
    fn test_request_without_response_is_kept() {
        let events = vec![request("r1", "1")];
        assert_eq!(ids(&EventFuser::fuse(&events)), vec![("r1".into(), None)]);
    }

    #[test]
    fn test_orphan_response_is_dropped() {
        let events = vec![response("p9", "9"), request("r1", "1")];
        assert_eq!(ids(&EventFuser::fuse(&events)), vec![("r1".into(), None)]);
    }

    #[test]
    fn test_missing_correlation_is_ignored() {
        let events = vec![
            Event::http("r0", Phase::Request, HttpInfo::new("GET", "https://example.com/")),
            request("r1", "1"),
        ];
        assert_eq!(ids(&EventFuser::fuse(&events)), vec![("r1".into(), None)]);
    }

    #[test]
    fn test_latest_wins_and_first_seen_order_kept() {
        let events = vec![
            request("r2a", "2"),
            request("r1", "1"),
            response("p2a", "2"),
            request("r2b", "2"),
            response("p2b", "2"),
        ];
        assert_eq!(
            ids(&EventFuser::fuse(&events)),
            vec![
                ("r2b".into(), Some("p2b".into())),
                ("r1".into(), None),
            ]
        );
    }

    #[test]
    fn test_websocket_events_are_skipped() {
        let events = vec![
            Event::ws("w1", Phase::WsOpen, WsInfo::new("wss://example.com/s")).with_correlation("1"),
            request("r1", "1"),
        ];
        assert_eq!(ids(&EventFuser::fuse(&events)), vec![("r1".into(), None)]);
    }
}
