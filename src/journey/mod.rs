//! Append-only event log and per-user journey reconstruction.
//!
//! ```text
//! ┌──────────────┐  record   ┌──────────────┐  journey_for  ┌──────────────┐
//! │   Tracker    │──────────►│   EventLog   │──────────────►│ JourneyGraph │
//! │ (session)    │           │ (append-only)│  (pure fn)    │ nodes/edges  │
//! └──────────────┘           └──────────────┘               └──────────────┘
//! ```
//!
//! Entries are never edited once recorded. Ordering for journeys is by
//! timestamp; events sharing a timestamp keep their recording order.

pub mod graph;

pub use graph::{journey_for, style_for, JourneyEdge, JourneyGraph, JourneyNode, NodeStyle, Position};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logging::log_event_recorded;
use crate::model::Event;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append one event. Existing entries are untouched.
    pub fn record(&mut self, event: Event) {
        log_event_recorded(
            &event.user_id,
            event.event_type.as_str(),
            event.timestamp,
            self.events.len() + 1,
        );
        self.events.push(event);
    }

    /// Events of one user in recording order.
    pub fn events_for(&self, user_id: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.user_id == user_id).collect()
    }

    /// Up to `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Event> {
        let mut all: Vec<&Event> = self.events.iter().collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all.truncate(limit);
        all
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// SHA-256 over the serialized entries, hex encoded.
    pub fn digest(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        for event in &self.events {
            let bytes = serde_json::to_vec(event).with_context(|| format!("encoding event {}", event.id))?;
            hasher.update(bytes);
            hasher.update(b"\n");
        }
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl From<Vec<Event>> for EventLog {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}

/// Value-style append: consumes the log and returns it with `event` added.
pub fn record_event(mut log: EventLog, event: Event) -> EventLog {
    log.record(event);
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, UserRole};

    fn event(id: &str, user: &str, ts: u64) -> Event {
        Event {
            id: id.to_string(),
            user_id: user.to_string(),
            user_name: user.to_string(),
            user_role: UserRole::BuyerUser,
            event_type: EventType::BrowseProducts,
            timestamp: ts,
            metadata: None,
        }
    }

    #[test]
    fn record_appends_without_touching_existing() {
        let log = record_event(EventLog::new(), event("e1", "u1", 10));
        let first = log.events()[0].clone();
        let log = record_event(log, event("e2", "u2", 5));
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0], first);
        assert_eq!(log.events()[1].id, "e2");
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let log = EventLog::from(vec![
            event("a", "u1", 10),
            event("b", "u1", 30),
            event("c", "u2", 20),
        ]);
        let recent: Vec<&str> = log.recent(2).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(recent, vec!["b", "c"]);
    }

    #[test]
    fn events_for_filters_by_user() {
        let log = EventLog::from(vec![event("a", "u1", 10), event("b", "u2", 5), event("c", "u1", 1)]);
        let ids: Vec<&str> = log.events_for("u1").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(log.events_for("nobody").is_empty());
    }

    #[test]
    fn digest_tracks_content() {
        let a = EventLog::from(vec![event("a", "u1", 10)]);
        let b = EventLog::from(vec![event("a", "u1", 10)]);
        let c = record_event(b.clone(), event("b", "u1", 11));
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);
        assert_ne!(EventLog::new().digest().unwrap(), a.digest().unwrap());
    }

    #[test]
    fn serializes_as_plain_array() {
        let log = EventLog::from(vec![event("a", "u1", 10)]);
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        let back: EventLog = serde_json::from_value(json).unwrap();
        assert_eq!(back, log);
    }
}
