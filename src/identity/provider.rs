use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::auth_result::AuthResult;
use super::credentials::{CredentialForm, Credentials, RawCredentials};
use super::user::{Identity, UserModel};
use crate::config::AuthConfig;
use crate::dao::{criteria, DaoFactory, Repository};
use crate::error::AuthError;

/// Resolves credentials to an identity against the user repository.
pub struct AuthLogic<U: UserModel> {
    account_field: String,
    identity_field: String,
    form: CredentialForm,
    repository: Arc<dyn Repository<U>>,
}

impl<U: UserModel> AuthLogic<U> {
    /// Validates the config and resolves the user repository up front, so wiring mistakes
    /// surface at startup rather than on the first login.
    pub fn new(config: &AuthConfig, factory: &dyn DaoFactory<U>) -> Result<Self, AuthError> {
        config.validate()?;
        let lookup = &config.user_lookup;
        let repository = factory.get(&lookup.bundle, &lookup.model).map_err(|e| {
            error!(target: "portcullis::auth", bundle = %lookup.bundle, model = %lookup.model, "user repository lookup failed: {}", e);
            AuthError::configuration(format!("user repository {}/{}: {}", lookup.bundle, lookup.model, e))
        })?;
        Self::with_repository(config, repository)
    }

    /// Fails when the repository knows its entity shape and either lookup field is not in it.
    pub fn with_repository(config: &AuthConfig, repository: Arc<dyn Repository<U>>) -> Result<Self, AuthError> {
        config.validate()?;
        for (role, field) in [("account_field", &config.account_field), ("identity_field", &config.identity_field)] {
            repository.ensure_field(field).map_err(|e| {
                error!(target: "portcullis::auth", setting = role, field = %field, "lookup field rejected by repository: {}", e);
                AuthError::configuration(format!("{} '{}': {}", role, field, e))
            })?;
        }
        Ok(Self {
            account_field: config.account_field.clone(),
            identity_field: config.identity_field.clone(),
            form: CredentialForm::new(config.login_field_map.clone()),
            repository,
        })
    }

    pub fn form(&self) -> &CredentialForm { &self.form }

    /// Validation failures, unknown accounts, ambiguous matches, backend faults and wrong
    /// passwords all yield the same failed result. Only configuration-class faults are errors.
    pub fn login(&self, raw: &RawCredentials) -> Result<AuthResult, AuthError> {
        match self.form.validate(raw) {
            Ok(credentials) => self.login_with(&credentials),
            Err(errors) => {
                debug!(target: "portcullis::auth", invalid_fields = ?errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(), "login form rejected");
                Ok(AuthResult::failed())
            }
        }
    }

    pub fn login_with(&self, credentials: &Credentials) -> Result<AuthResult, AuthError> {
        let user = match self.repository.find_one_by(&criteria(&self.account_field, credentials.account())) {
            Ok(u) => u,
            Err(e) if e.is_configuration() => {
                error!(target: "portcullis::auth", field = %self.account_field, "account lookup misconfigured: {}", e);
                return Err(e.into());
            }
            Err(e) => {
                debug!(target: "portcullis::auth", "account lookup yielded no user: {}", e);
                return Ok(AuthResult::failed());
            }
        };

        if !user.check_password(credentials.password()) {
            debug!(target: "portcullis::auth", identity = %user.identity_id(), "password check failed");
            return Ok(AuthResult::failed());
        }

        let result = AuthResult::for_user(&user)?;
        info!(target: "portcullis::auth", identity = %user.identity_id(), "login succeeded");
        Ok(result)
    }

    /// True only when exactly one user still carries `identity`. Never fails.
    pub fn authenticate(&self, identity: &Identity) -> bool {
        match self.repository.find_one_by(&criteria(&self.identity_field, identity.as_str())) {
            Ok(_) => true,
            Err(e) => {
                if e.is_configuration() {
                    warn!(target: "portcullis::auth", field = %self.identity_field, "identity lookup misconfigured: {}", e);
                } else {
                    debug!(target: "portcullis::auth", identity = %identity, "identity no longer resolves: {}", e);
                }
                false
            }
        }
    }

    /// Rebuild the rich user from the plain form kept in session extended data.
    pub fn materialize_user(&self, raw: &Value) -> Result<U, AuthError> {
        self.repository.make_model(raw).map_err(AuthError::from)
    }
}
