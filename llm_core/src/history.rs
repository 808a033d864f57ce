//! Per-session conversation history.
//!
//! Each session keeps at most [`MAX_HISTORY_MESSAGES`] messages; appending to
//! a full history drops the oldest one first. Histories live only in memory.

use std::collections::{HashMap, VecDeque};

use tracing::info;

use crate::message::{Message, Role};

/// Exchange pairs (user + assistant) kept per session.
pub const MAX_HISTORY_ROUNDS: usize = 10;
pub const MAX_HISTORY_MESSAGES: usize = MAX_HISTORY_ROUNDS * 2;

/// Bounded FIFO message log keyed by session id.
///
/// Not synchronized; callers that share a store wrap it in a lock.
#[derive(Debug, Default)]
pub struct HistoryStore {
    sessions: HashMap<String, VecDeque<Message>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// History for `session`, creating an empty one on first use.
    pub fn get(&mut self, session: &str) -> &VecDeque<Message> {
        self.entry(session)
    }

    /// Copy of the history, oldest first, without creating the session.
    pub fn snapshot(&self, session: &str) -> Vec<Message> {
        self.sessions
            .get(session)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn append(&mut self, session: &str, role: Role, content: impl Into<String>) {
        let history = self.entry(session);
        if history.len() >= MAX_HISTORY_MESSAGES {
            history.pop_front();
        }
        history.push_back(Message::new(role, content));
    }

    /// Drop one session's history, or every session's when `session` is `None`.
    pub fn clear(&mut self, session: Option<&str>) {
        match session {
            None => {
                self.sessions.clear();
                info!("All conversation history cleared");
            }
            Some(id) => {
                if self.sessions.remove(id).is_some() {
                    info!("Session {} conversation history cleared", id);
                }
            }
        }
    }

    pub fn len(&self, session: &str) -> usize {
        self.sessions.get(session).map_or(0, VecDeque::len)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn entry(&mut self, session: &str) -> &mut VecDeque<Message> {
        self.sessions
            .entry(session.to_string())
            .or_insert_with(|| VecDeque::with_capacity(MAX_HISTORY_MESSAGES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unknown_session_is_empty() {
        let mut store = HistoryStore::new();
        assert!(store.get("nobody").is_empty());
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_append_round_trip_keeps_order() {
        let mut store = HistoryStore::new();
        store.append("s", Role::User, "m1");
        store.append("s", Role::Assistant, "r1");

        let history: Vec<Message> = store.get("s").iter().cloned().collect();
        assert_eq!(history, vec![Message::user("m1"), Message::assistant("r1")]);
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut store = HistoryStore::new();
        for i in 0..MAX_HISTORY_MESSAGES {
            store.append("s", Role::User, format!("m{i}"));
        }
        assert_eq!(store.len("s"), MAX_HISTORY_MESSAGES);

        store.append("s", Role::Assistant, "newest");
        let history = store.snapshot("s");
        assert_eq!(history.len(), MAX_HISTORY_MESSAGES);
        assert_eq!(history[0].content, "m1");
        assert_eq!(history.last().unwrap(), &Message::assistant("newest"));

        for i in 0..50 {
            store.append("s", Role::User, format!("x{i}"));
            assert!(store.len("s") <= MAX_HISTORY_MESSAGES);
        }
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut store = HistoryStore::new();
        store.append("a", Role::User, "for a");
        assert_eq!(store.len("a"), 1);
        assert_eq!(store.len("b"), 0);
        assert!(store.snapshot("b").is_empty());
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_clear_one_session() {
        let mut store = HistoryStore::new();
        store.append("a", Role::User, "1");
        store.append("b", Role::User, "2");

        store.clear(Some("a"));
        assert!(store.get("a").is_empty());
        assert_eq!(store.len("b"), 1);

        // unknown ids are fine
        store.clear(Some("missing"));
    }

    #[test]
    fn test_clear_all_sessions() {
        let mut store = HistoryStore::new();
        store.append("a", Role::User, "1");
        store.append("b", Role::User, "2");

        store.clear(None);
        assert_eq!(store.session_count(), 0);
        assert!(store.get("a").is_empty());
        assert!(store.get("b").is_empty());
    }
}
