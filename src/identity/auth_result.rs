use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::{Identity, UserModel};
use crate::error::AuthError;

/// Key under which the resolved user is stored in extended data.
pub const USER_KEY: &str = "user";

pub type ExtendedData = serde_json::Map<String, Value>;

/// Outcome of a login attempt. A failed result has no identity; the reason is not recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    identity: Option<Identity>,
    #[serde(default)]
    extended_data: ExtendedData,
}

impl AuthResult {
    pub fn failed() -> Self { Self::default() }

    pub fn success(identity: Identity, extended_data: ExtendedData) -> Self {
        Self { identity: Some(identity), extended_data }
    }

    /// Success result carrying `user` in plain form under `USER_KEY`.
    pub fn for_user<U: UserModel>(user: &U) -> Result<Self, AuthError> {
        let raw = serde_json::to_value(user)
            .map_err(|e| AuthError::configuration(format!("user model is not serializable: {}", e)))?;
        let mut extended_data = ExtendedData::new();
        extended_data.insert(USER_KEY.to_string(), raw);
        Ok(Self::success(user.identity_id(), extended_data))
    }

    pub fn is_success(&self) -> bool { self.identity.is_some() }
    pub fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }
    pub fn extended_data(&self) -> &ExtendedData { &self.extended_data }

    /// Typed view of the stored user, if present and well-formed.
    pub fn user<U: UserModel>(&self) -> Option<U> {
        let raw = self.extended_data.get(USER_KEY)?;
        serde_json::from_value(raw.clone()).ok()
    }
}
