use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

pub const DAYS: u64 = 86_400;
/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_DURATION_SECONDS: u64 = 3_650 * DAYS;

/// Where the user repository is found: a bundle and an entity name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserLookup {
    pub bundle: String,
    pub model: String,
}

impl Default for UserLookup {
    fn default() -> Self { Self { bundle: "app".to_string(), model: "User".to_string() } }
}

/// Raw input field names carrying the account and the password of a login attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginFieldMap {
    pub account: String,
    pub password: String,
}

impl Default for LoginFieldMap {
    fn default() -> Self { Self { account: "account".to_string(), password: "password".to_string() } }
}

/// Authentication settings. Unspecified keys fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    pub user_lookup: UserLookup,
    /// Entity field matched against the submitted account value.
    pub account_field: String,
    /// Entity field matched against a session identity.
    pub identity_field: String,
    pub login_field_map: LoginFieldMap,
    pub session_duration_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_lookup: UserLookup::default(),
            account_field: "email".to_string(),
            identity_field: "id".to_string(),
            login_field_map: LoginFieldMap::default(),
            session_duration_seconds: DAYS, // 1 day by default
        }
    }
}

impl AuthConfig {
    pub fn from_json_str(text: &str) -> Result<Self, AuthError> {
        serde_json::from_str(text).map_err(|e| AuthError::configuration(format!("invalid auth config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AuthError::configuration(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Overlay `PORTCULLIS_*` environment variables.
    pub fn apply_env(self) -> Result<Self, AuthError> {
        self.apply_env_with(|k| std::env::var(k).ok())
    }

    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PORTCULLIS_ACCOUNT_FIELD") { self.account_field = v; }
        if let Some(v) = lookup("PORTCULLIS_IDENTITY_FIELD") { self.identity_field = v; }
        if let Some(v) = lookup("PORTCULLIS_LOGIN_ACCOUNT_FIELD") { self.login_field_map.account = v; }
        if let Some(v) = lookup("PORTCULLIS_LOGIN_PASSWORD_FIELD") { self.login_field_map.password = v; }
        if let Some(v) = lookup("PORTCULLIS_USER_BUNDLE") { self.user_lookup.bundle = v; }
        if let Some(v) = lookup("PORTCULLIS_USER_MODEL") { self.user_lookup.model = v; }
        if let Some(v) = lookup("PORTCULLIS_SESSION_DURATION_SECONDS") {
            self.session_duration_seconds = v.trim().parse::<u64>().map_err(|_| {
                AuthError::configuration(format!("PORTCULLIS_SESSION_DURATION_SECONDS is not an integer: '{}'", v))
            })?;
        }
        Ok(self)
    }

    /// Startup-time checks. Anything rejected here would otherwise fail every request.
    pub fn validate(&self) -> Result<(), AuthError> {
        let named = [
            ("user_lookup.bundle", &self.user_lookup.bundle),
            ("user_lookup.model", &self.user_lookup.model),
            ("account_field", &self.account_field),
            ("identity_field", &self.identity_field),
            ("login_field_map.account", &self.login_field_map.account),
            ("login_field_map.password", &self.login_field_map.password),
        ];
        for (key, value) in named {
            if value.trim().is_empty() {
                return Err(AuthError::configuration(format!("{} must not be empty", key)));
            }
        }
        if self.login_field_map.account == self.login_field_map.password {
            return Err(AuthError::configuration("login_field_map.account and login_field_map.password must differ"));
        }
        if self.session_duration_seconds == 0 || self.session_duration_seconds > MAX_SESSION_DURATION_SECONDS {
            return Err(AuthError::configuration(format!(
                "session_duration_seconds must be within 1..={}, got {}",
                MAX_SESSION_DURATION_SECONDS, self.session_duration_seconds
            )));
        }
        Ok(())
    }

    pub fn session_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_duration_seconds)
    }
}
