//! Auth session snapshot store.
//!
//! One owner (the coordinator), two transitions (login detection stores,
//! logout detection clears), reads hand out immutable clones. The host
//! runtime persists a session under exactly two string keys.

use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    /// Serialized user object as received from the web app.
    pub user: String,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    auth: Option<AuthSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Login transition.
    pub fn store(&mut self, access_token: String, user: String) {
        self.auth = Some(AuthSession { access_token, user });
    }

    /// Logout transition.
    pub fn clear(&mut self) {
        self.auth = None;
    }

    pub fn snapshot(&self) -> Option<AuthSession> {
        self.auth.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_some()
    }

    /// Host storage layout: the two string keys, or empty when logged out.
    pub fn to_storage_keys(&self) -> Vec<(String, String)> {
        match &self.auth {
            Some(auth) => vec![
                (ACCESS_TOKEN_KEY.to_string(), auth.access_token.clone()),
                (USER_KEY.to_string(), auth.user.clone()),
            ],
            None => Vec::new(),
        }
    }

    pub fn from_storage_keys(pairs: &[(String, String)]) -> Self {
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        let mut store = Self::new();
        if let Some(token) = get(ACCESS_TOKEN_KEY) {
            store.store(token, get(USER_KEY).unwrap_or_default());
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_logout_transitions() {
        let mut store = SessionStore::new();
        assert!(!store.is_logged_in());
        store.store("tok".to_string(), "{\"id\":1}".to_string());
        assert!(store.is_logged_in());
        assert_eq!(store.snapshot().unwrap().access_token, "tok");
        store.clear();
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn storage_keys_round_trip() {
        let mut store = SessionStore::new();
        store.store("tok".to_string(), "{\"id\":1}".to_string());
        let keys = store.to_storage_keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].0, ACCESS_TOKEN_KEY);
        assert_eq!(keys[1].0, USER_KEY);

        let restored = SessionStore::from_storage_keys(&keys);
        assert_eq!(restored.snapshot(), store.snapshot());

        let empty = SessionStore::from_storage_keys(&[]);
        assert!(!empty.is_logged_in());
    }
}
