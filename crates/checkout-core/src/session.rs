//! # Session
//!
//! Per-customer key/value session and the store that persists it between
//! requests.

use crate::error::{CheckoutError, CheckoutResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Session key holding the ID of the order being checked out
pub const ORDER_ID: &str = "aimeos/orderid";
/// Session key holding the index of cached basket entries (cache key -> any)
pub const BASKET_CACHE: &str = "aimeos/basket/cache";
/// Session key holding the serialized basket
pub const BASKET_CONTENT: &str = "aimeos/basket/content";

/// Values stored for one customer session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    values: HashMap<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a string value; non-string values are ignored
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove all given keys
    pub fn remove<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.values.remove(key.as_ref());
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// ID of the order being checked out
    pub fn order_id(&self) -> Option<&str> {
        self.get_str(ORDER_ID).filter(|id| !id.is_empty())
    }

    pub fn set_order_id(&mut self, order_id: impl Into<String>) {
        self.set(ORDER_ID, order_id.into());
    }

    /// Session keys listed in the basket cache index
    pub fn basket_cache_keys(&self) -> Vec<String> {
        self.get(BASKET_CACHE)
            .and_then(Value::as_object)
            .map(|index| index.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Persists sessions between requests
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session; unknown IDs yield an empty session
    async fn load(&self, session_id: &str) -> CheckoutResult<Session>;

    /// Store a session under its ID
    async fn save(&self, session_id: &str, session: Session) -> CheckoutResult<()>;
}

/// Process-local session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> CheckoutResult<Session> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| CheckoutError::Internal("session store lock poisoned".to_string()))?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn save(&self, session_id: &str, session: Session) -> CheckoutResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| CheckoutError::Internal("session store lock poisoned".to_string()))?;
        sessions.insert(session_id.to_string(), session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_id() {
        let mut session = Session::new();
        assert_eq!(session.order_id(), None);

        session.set_order_id("O-1");
        assert_eq!(session.order_id(), Some("O-1"));

        session.set_order_id("");
        assert_eq!(session.order_id(), None);
    }

    #[test]
    fn test_basket_cache_keys() {
        let mut session = Session::new();
        assert!(session.basket_cache_keys().is_empty());

        session.set(
            BASKET_CACHE,
            json!({"aimeos/basket/list": 1, "aimeos/basket/mini": 1}),
        );
        let mut keys = session.basket_cache_keys();
        keys.sort();

        assert_eq!(keys, vec!["aimeos/basket/list", "aimeos/basket/mini"]);
    }

    #[test]
    fn test_remove_keys() {
        let mut session = Session::new();
        session.set("a", 1);
        session.set("b", 2);
        session.set("c", 3);

        session.remove(["a", "c", "missing"]);

        assert!(!session.contains("a"));
        assert!(session.contains("b"));
        assert_eq!(session.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.load("s1").await.unwrap().is_empty());

        let mut session = Session::new();
        session.set_order_id("O-7");
        store.save("s1", session).await.unwrap();

        assert_eq!(store.load("s1").await.unwrap().order_id(), Some("O-7"));
        assert!(store.load("s2").await.unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }
}
