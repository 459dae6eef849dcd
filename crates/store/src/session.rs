//! In-memory session transcripts.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use crate::models::MessageEntry;

/// Current local time as an ISO-8601 string without offset.
pub fn now_iso() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Append-only message log per session id. Not persisted.
#[derive(Debug, Default)]
pub struct SessionLog {
    sessions: RwLock<HashMap<String, Vec<MessageEntry>>>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message, creating the session on its first message.
    pub async fn append(&self, session_id: &str, role: &str, text: &str) -> MessageEntry {
        let entry = MessageEntry {
            role: role.to_string(),
            text: text.to_string(),
            timestamp: now_iso(),
        };

        let mut sessions = self.sessions.write().await;
        let messages = sessions.entry(session_id.to_string()).or_insert_with(|| {
            info!(session_id = %session_id, "New session created");
            Vec::new()
        });
        messages.push(entry.clone());

        info!(session_id = %session_id, role = %role, text = %text, "Session message");
        entry
    }

    /// Transcript of a session, if it exists.
    pub async fn get(&self, session_id: &str) -> Option<Vec<MessageEntry>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Ids of all known sessions, sorted.
    pub async fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_creates_session() {
        let log = SessionLog::new();
        assert!(log.get("s1").await.is_none());

        log.append("s1", "user", "hello").await;
        log.append("s1", "wizard", "hi there").await;

        let messages = log.get("s1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].text, "hi there");
    }

    #[tokio::test]
    async fn test_list_ids_sorted() {
        let log = SessionLog::new();
        log.append("b", "user", "x").await;
        log.append("a", "user", "y").await;
        log.append("b", "user", "z").await;

        assert_eq!(log.list_ids().await, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_now_iso_format() {
        let stamp = now_iso();
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }
}
