use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Keys the quiz and survey controllers use in the session store.
pub mod keys {
    pub const EMAIL: &str = "email";
    pub const TWITTER: &str = "twitter";
    pub const WHATSAPP: &str = "whatsapp";
    pub const RESPONSES: &str = "responses";
    pub const USER_DATA: &str = "userData";
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionStoreError {
    #[error("session store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Ephemeral string key/value storage scoped to one user session.
///
/// Hands the quiz result to the survey controller and lets a restarted quiz
/// restore identity fields and in-progress answers. Values persist for the
/// store's lifetime unless removed explicitly.
pub trait SessionStore: Send + Sync {
    /// Store `value` under `key`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the backend cannot be written.
    fn put(&self, key: &str, value: &str) -> Result<(), SessionStoreError>;

    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Remove the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), SessionStoreError>;
}

/// Store `value` JSON-encoded under `key`.
///
/// # Errors
///
/// Returns `SessionStoreError::Serialization` if encoding fails, or the
/// backend's error on write failure.
pub fn put_json<T: Serialize>(
    store: &dyn SessionStore,
    key: &str,
    value: &T,
) -> Result<(), SessionStoreError> {
    let encoded =
        serde_json::to_string(value).map_err(|e| SessionStoreError::Serialization(e.to_string()))?;
    store.put(key, &encoded)
}

/// Fetch and JSON-decode the value stored under `key`.
///
/// # Errors
///
/// Returns `SessionStoreError::Serialization` if a stored value cannot be
/// decoded as `T`, or the backend's error on read failure.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn SessionStore,
    key: &str,
) -> Result<Option<T>, SessionStoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| SessionStoreError::Serialization(e.to_string()))
}

/// In-memory session store, the stand-in for browser tab storage.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove_roundtrip() {
        let store = InMemorySessionStore::new();
        store.put(keys::EMAIL, "a@b.com").unwrap();
        assert_eq!(store.get(keys::EMAIL).unwrap().as_deref(), Some("a@b.com"));

        store.remove(keys::EMAIL).unwrap();
        assert_eq!(store.get(keys::EMAIL).unwrap(), None);
    }

    #[test]
    fn json_helpers_roundtrip_vectors() {
        let store = InMemorySessionStore::new();
        let responses = vec![Some("A".to_string()), None, Some("B".to_string())];
        put_json(&store, keys::RESPONSES, &responses).unwrap();

        let restored: Vec<Option<String>> = get_json(&store, keys::RESPONSES).unwrap().unwrap();
        assert_eq!(restored, responses);
    }

    #[test]
    fn get_json_on_missing_key_is_none() {
        let store = InMemorySessionStore::new();
        let missing: Option<Vec<String>> = get_json(&store, keys::USER_DATA).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn get_json_on_corrupt_value_is_an_error() {
        let store = InMemorySessionStore::new();
        store.put(keys::USER_DATA, "{not json").unwrap();
        let result: Result<Option<Vec<String>>, _> = get_json(&store, keys::USER_DATA);
        assert!(matches!(result, Err(SessionStoreError::Serialization(_))));
    }
}
