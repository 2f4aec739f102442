//! The live, per-request session record.

use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

/// Session data as key-value pairs.
pub type SessionData = HashMap<String, serde_json::Value>;

/// Session record handed to application code for the duration of a request.
///
/// Behaves like a string-keyed map of JSON values, plus identity and the
/// bookkeeping the session interface needs to decide whether a write-back is
/// required. `new` and the modification flags are never persisted.
///
/// `modified` covers any change, including the `permanent` hint;
/// `data_modified` only covers changes to the stored map. Only the latter can
/// cause the stored record to be deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: String,
    data: SessionData,
    permanent: bool,
    new: bool,
    modified: bool,
    data_modified: bool,
}

impl Session {
    /// Create a session that has no stored counterpart yet.
    pub fn fresh(id: impl Into<String>, permanent: bool) -> Self {
        Self {
            id: id.into(),
            data: SessionData::new(),
            permanent,
            new: true,
            modified: false,
            data_modified: false,
        }
    }

    /// Create a session from data read back from the store.
    pub fn hydrated(id: impl Into<String>, data: SessionData, permanent: bool) -> Self {
        Self {
            id: id.into(),
            data,
            permanent,
            new: false,
            modified: false,
            data_modified: false,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the session was created during this request.
    pub fn is_new(&self) -> bool {
        self.new
    }

    /// Whether the session changed since it was opened.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether the session data changed since it was opened.
    pub fn is_data_modified(&self) -> bool {
        self.data_modified
    }

    /// Whether the client should keep the identifier beyond the browser session.
    pub fn permanent(&self) -> bool {
        self.permanent
    }

    /// Change the client-side lifetime hint.
    pub fn set_permanent(&mut self, permanent: bool) {
        if self.permanent != permanent {
            self.permanent = permanent;
            self.modified = true;
        }
    }

    /// Flag the session as changed.
    ///
    /// Needed after editing a value in place through [`get_mut`](Self::get_mut).
    pub fn mark_modified(&mut self) {
        self.touch();
    }

    /// Get a value from the session data.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get the raw JSON value stored under `key`.
    pub fn get_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Mutable access to a stored value. Does not mark the session modified.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut serde_json::Value> {
        self.data.get_mut(key)
    }

    /// Set a value in the session data.
    pub fn insert<T: Serialize>(&mut self, key: &str, value: T) -> SessionResult<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| SessionError::Serialization(e.to_string()))?;
        self.insert_value(key, json_value);
        Ok(())
    }

    /// Set a raw JSON value, returning the previous one.
    pub fn insert_value(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.touch();
        self.data.insert(key.into(), value)
    }

    /// Remove a value from the session data.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Check if a key exists in the session data.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Iterate over the keys in the session data.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Iterate over the entries in the session data.
    pub fn iter(&self) -> hash_map::Iter<'_, String, serde_json::Value> {
        self.data.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the session holds no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all session data.
    ///
    /// Clearing a stored session deletes it from the backend on save.
    pub fn clear(&mut self) {
        self.data.clear();
        self.touch();
    }

    /// Borrow the underlying map.
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    fn touch(&mut self) {
        self.modified = true;
        self.data_modified = true;
    }
}

impl<'a> IntoIterator for &'a Session {
    type Item = (&'a String, &'a serde_json::Value);
    type IntoIter = hash_map::Iter<'a, String, serde_json::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_session() {
        let session = Session::fresh("abc", true);
        assert_eq!(session.id(), "abc");
        assert!(session.is_new());
        assert!(!session.is_modified());
        assert!(session.is_empty());
        assert!(session.permanent());
    }

    #[test]
    fn test_insert_marks_modified() {
        let mut session = Session::hydrated("abc", SessionData::new(), false);
        assert!(!session.is_modified());

        session.insert("user_id", 123).unwrap();
        assert!(session.is_modified());
        assert_eq!(session.get::<i32>("user_id"), Some(123));
        assert!(session.contains("user_id"));
    }

    #[test]
    fn test_remove_missing_key_keeps_unmodified() {
        let mut data = SessionData::new();
        data.insert("x".to_string(), json!("foo"));
        let mut session = Session::hydrated("abc", data, false);

        assert!(session.remove("missing").is_none());
        assert!(!session.is_modified());

        assert_eq!(session.remove("x"), Some(json!("foo")));
        assert!(session.is_modified());
        assert!(session.is_empty());
    }

    #[test]
    fn test_clear_marks_modified() {
        let mut data = SessionData::new();
        data.insert("x".to_string(), json!(1));
        let mut session = Session::hydrated("abc", data, false);

        session.clear();
        assert!(session.is_empty());
        assert!(session.is_modified());
    }

    #[test]
    fn test_get_mut_requires_explicit_mark() {
        let mut data = SessionData::new();
        data.insert("cart".to_string(), json!([1]));
        let mut session = Session::hydrated("abc", data, false);

        if let Some(serde_json::Value::Array(items)) = session.get_mut("cart") {
            items.push(json!(2));
        }
        assert!(!session.is_modified());

        session.mark_modified();
        assert!(session.is_modified());
        assert_eq!(session.get::<Vec<i32>>("cart"), Some(vec![1, 2]));
    }

    #[test]
    fn test_set_permanent() {
        let mut session = Session::hydrated("abc", SessionData::new(), true);
        session.set_permanent(true);
        assert!(!session.is_modified());

        session.set_permanent(false);
        assert!(!session.permanent());
        assert!(session.is_modified());
        assert!(!session.is_data_modified());
    }

    #[test]
    fn test_data_changes_set_data_modified() {
        let mut session = Session::hydrated("abc", SessionData::new(), true);
        assert!(!session.is_data_modified());

        session.remove("missing");
        assert!(!session.is_data_modified());

        session.clear();
        assert!(session.is_data_modified());

        let mut session = Session::hydrated("abc", SessionData::new(), true);
        session.mark_modified();
        assert!(session.is_data_modified());
    }

    #[test]
    fn test_keys_and_iter() {
        let mut session = Session::fresh("abc", false);
        session.insert("a", 1).unwrap();
        session.insert("b", "two").unwrap();

        let mut keys: Vec<&str> = session.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(session.len(), 2);
        assert_eq!((&session).into_iter().count(), 2);
    }

    #[test]
    fn test_generate_session_id() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
        assert_eq!(a.len(), 36);
    }
}
