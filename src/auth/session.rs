//! Session-scoped key/value storage.
//!
//! Values live only as long as the running program, like a browser tab's
//! session storage.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    SignupPhone,
    SignupFullname,
    LoginPhone,
}

impl SessionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::SignupPhone => "signupPhone",
            SessionKey::SignupFullname => "signupFullname",
            SessionKey::LoginPhone => "loginPhone",
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    values: HashMap<SessionKey, String>,
}

impl SessionStore {
    pub fn set(&mut self, key: SessionKey, value: impl Into<String>) {
        tracing::debug!("session set {}", key.as_str());
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: SessionKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn remove(&mut self, key: SessionKey) -> Option<String> {
        tracing::debug!("session remove {}", key.as_str());
        self.values.remove(&key)
    }
}
