//! Session persistence
//!
//! Key/value storage standing in for the browser's origin-scoped local
//! storage. Three keys exist: the conversation snapshot, the current
//! objective, and the last issued command name.

use crate::chat::state::{Message, SessionState};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const KEY_CONVERSATION: &str = "conversation";
pub const KEY_OBJECTIVE: &str = "objective";
pub const KEY_PREVIOUS_COMMAND: &str = "previousCommand";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS session_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Persistence adapter for the session's key/value subset
///
/// `save` removes a key when the corresponding field is absent; `clear`
/// removes every key. The conversation snapshot is stored whole.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> SessionResult<SessionState>;
    async fn save(&self, state: &SessionState) -> SessionResult<()>;
    async fn clear(&self) -> SessionResult<()>;

    async fn save_conversation(&self, messages: &[Message]) -> SessionResult<()>;
    async fn load_conversation(&self) -> SessionResult<Option<Vec<Message>>>;
}

/// Thread-safe SQLite-backed session store
#[derive(Clone)]
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Open or create the session database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> SessionResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory session database (for testing)
    pub fn open_in_memory() -> SessionResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> SessionResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM session_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO session_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM session_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn set_or_remove(&self, key: &str, value: Option<&str>) -> SessionResult<()> {
        match value {
            Some(value) => self.set(key, value),
            None => self.remove(key),
        }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self) -> SessionResult<SessionState> {
        Ok(SessionState {
            objective: self.get(KEY_OBJECTIVE)?,
            previous_command: self.get(KEY_PREVIOUS_COMMAND)?,
        })
    }

    async fn save(&self, state: &SessionState) -> SessionResult<()> {
        self.set_or_remove(KEY_OBJECTIVE, state.objective.as_deref())?;
        self.set_or_remove(KEY_PREVIOUS_COMMAND, state.previous_command.as_deref())
    }

    async fn clear(&self) -> SessionResult<()> {
        self.remove(KEY_CONVERSATION)?;
        self.remove(KEY_OBJECTIVE)?;
        self.remove(KEY_PREVIOUS_COMMAND)
    }

    async fn save_conversation(&self, messages: &[Message]) -> SessionResult<()> {
        let encoded = serde_json::to_string(messages)?;
        self.set(KEY_CONVERSATION, &encoded)
    }

    async fn load_conversation(&self) -> SessionResult<Option<Vec<Message>>> {
        match self.get(KEY_CONVERSATION)? {
            Some(encoded) => Ok(Some(serde_json::from_str(&encoded)?)),
            None => Ok(None),
        }
    }
}
