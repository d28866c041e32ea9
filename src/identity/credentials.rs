use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::config::LoginFieldMap;
use crate::error::ValidationError;

/// Raw login input as submitted by the client, keyed by the client-side field names.
pub type RawCredentials = HashMap<String, String>;

/// Validated login input keyed by role rather than by raw field name.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    account: String,
    password: String,
}

impl Credentials {
    pub fn account(&self) -> &str { &self.account }
    pub fn password(&self) -> &str { &self.password }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("account", &self.account).field("password", &"***").finish()
    }
}

/// Login form: both mapped fields are mandatory.
#[derive(Debug, Clone)]
pub struct CredentialForm {
    fields: LoginFieldMap,
}

impl CredentialForm {
    pub fn new(fields: LoginFieldMap) -> Self { Self { fields } }

    pub fn fields(&self) -> &LoginFieldMap { &self.fields }

    /// Collects every error rather than stopping at the first one.
    pub fn validate(&self, raw: &RawCredentials) -> Result<Credentials, Vec<ValidationError>> {
        let mut errors = Vec::new();
        // Surrounding blanks in an account are input noise; a password is taken verbatim.
        let account = raw.get(&self.fields.account).map(|s| s.trim()).filter(|s| !s.is_empty());
        let password = raw.get(&self.fields.password).map(String::as_str).filter(|s| !s.is_empty());
        if account.is_none() { errors.push(ValidationError::mandatory(self.fields.account.as_str())); }
        if password.is_none() { errors.push(ValidationError::mandatory(self.fields.password.as_str())); }
        match (account, password) {
            (Some(a), Some(p)) => Ok(Credentials { account: a.to_string(), password: p.to_string() }),
            _ => Err(errors),
        }
    }
}

impl Default for CredentialForm {
    fn default() -> Self { Self::new(LoginFieldMap::default()) }
}
