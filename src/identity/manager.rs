use std::sync::Arc;

use tracing::{info, warn};

use super::credentials::RawCredentials;
use super::provider::AuthLogic;
use super::session::{Session, SessionStore};
use super::user::{Identity, UserModel};
use crate::config::AuthConfig;
use crate::dao::DaoFactory;
use crate::error::AuthError;

/// Login entry point: form validation, credential check and session creation.
pub struct AuthManager<U: UserModel> {
    logic: AuthLogic<U>,
    sessions: Arc<SessionStore>,
}

impl<U: UserModel> AuthManager<U> {
    pub fn new(config: &AuthConfig, factory: &dyn DaoFactory<U>) -> Result<Self, AuthError> {
        let logic = AuthLogic::new(config, factory)?;
        Ok(Self::with_parts(logic, Arc::new(SessionStore::new(config.session_duration()))))
    }

    pub fn with_parts(logic: AuthLogic<U>, sessions: Arc<SessionStore>) -> Self { Self { logic, sessions } }

    pub fn logic(&self) -> &AuthLogic<U> { &self.logic }
    pub fn sessions(&self) -> &Arc<SessionStore> { &self.sessions }

    /// Bad credentials collapse into `AuthFailed`, so a caller cannot tell a wrong password from
    /// an unknown account or a rejected form. Configuration and backend faults pass through.
    pub fn auth(&self, raw: &RawCredentials) -> Result<Session, AuthError> {
        let result = self.logic.login(raw)?;
        if !result.is_success() {
            info!(target: "portcullis::auth", "login rejected");
            return Err(AuthError::AuthFailed);
        }
        self.sessions.create_session(&result).map_err(|e| {
            warn!(target: "portcullis::auth", "session creation failed: {}", e);
            e
        })
    }

    /// Cache lookup only; cheap enough to run on every protected call.
    pub fn current_session(&self, token: &str) -> Option<Session> { self.sessions.get_session(token) }

    /// Cache lookup plus a re-check that the identity still maps to a user. A session whose
    /// identity no longer resolves is destroyed.
    pub fn verify_session(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get_session(token)?;
        let identity = session.identity.as_ref()?;
        if self.logic.authenticate(identity) {
            Some(session)
        } else {
            self.sessions.destroy(token);
            None
        }
    }

    pub fn logout(&self, token: &str) -> bool { self.sessions.destroy(token) }

    pub fn revoke(&self, identity: &Identity) -> usize { self.sessions.revoke_identity(identity) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{MemoryDaoFactory, MemoryRepository, Repository};
    use crate::identity::session::{SessionToken, TokenSource};
    use crate::identity::user::fixtures::TestUser;

    fn raw(account: &str, password: &str) -> RawCredentials {
        [("account", account), ("password", password)].iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    struct NoEntropy;

    impl TokenSource for NoEntropy {
        fn next_token(&self) -> Result<SessionToken, AuthError> { Err(AuthError::backend("entropy source closed")) }
    }

    fn manager() -> (Arc<MemoryRepository<TestUser>>, AuthManager<TestUser>) {
        let repo = Arc::new(MemoryRepository::new(vec![TestUser::new(1, "ann@example.com", "pw")]));
        let dyn_repo: Arc<dyn Repository<TestUser>> = repo.clone();
        let factory = MemoryDaoFactory::new().with("app", "User", dyn_repo);
        (repo, AuthManager::<TestUser>::new(&AuthConfig::default(), &factory).unwrap())
    }

    #[test]
    fn auth_failures_are_uniform() {
        let (repo, m) = manager();
        assert_eq!(m.auth(&raw("ann@example.com", "bad")).unwrap_err(), AuthError::AuthFailed);
        assert_eq!(m.auth(&raw("nobody@example.com", "pw")).unwrap_err(), AuthError::AuthFailed);
        assert_eq!(m.auth(&RawCredentials::new()).unwrap_err(), AuthError::AuthFailed);
        repo.set_offline(true);
        assert_eq!(m.auth(&raw("ann@example.com", "pw")).unwrap_err(), AuthError::AuthFailed);
        assert!(m.sessions().is_empty());
    }

    #[test]
    fn session_backend_fault_is_not_reported_as_bad_credentials() {
        let repo = Arc::new(MemoryRepository::new(vec![TestUser::new(1, "ann@example.com", "pw")]));
        let cfg = AuthConfig::default();
        let logic = AuthLogic::<TestUser>::with_repository(&cfg, repo).unwrap();
        let sessions = Arc::new(SessionStore::new(cfg.session_duration()).with_token_source(Arc::new(NoEntropy)));
        let m = AuthManager::with_parts(logic, sessions);
        let err = m.auth(&raw("ann@example.com", "pw")).unwrap_err();
        assert!(matches!(err, AuthError::Backend(_)));
        assert_eq!(err.http_status(), 503);
        // credential failures are still uniform on the same manager
        assert_eq!(m.auth(&raw("ann@example.com", "bad")).unwrap_err(), AuthError::AuthFailed);
        assert!(m.sessions().is_empty());
    }

    #[test]
    fn login_then_current_session() {
        let (_, m) = manager();
        let s = m.auth(&raw("ann@example.com", "pw")).unwrap();
        let cur = m.current_session(&s.token).unwrap();
        assert_eq!(cur.identity, Some(Identity::from(1i64)));
        assert!(m.current_session("unknown-token").is_none());
    }

    #[test]
    fn verify_session_drops_vanished_identity() {
        let (repo, m) = manager();
        let s = m.auth(&raw("ann@example.com", "pw")).unwrap();
        assert!(m.verify_session(&s.token).is_some());
        repo.remove_identity(&Identity::from(1i64));
        // the cache alone still answers
        assert!(m.current_session(&s.token).is_some());
        assert!(m.verify_session(&s.token).is_none());
        assert!(m.current_session(&s.token).is_none());
    }

    #[test]
    fn logout_and_revoke() {
        let (_, m) = manager();
        let a = m.auth(&raw("ann@example.com", "pw")).unwrap();
        let b = m.auth(&raw("ann@example.com", "pw")).unwrap();
        assert!(m.logout(&a.token));
        assert!(m.current_session(&a.token).is_none());
        assert_eq!(m.revoke(&Identity::from(1i64)), 1);
        assert!(m.current_session(&b.token).is_none());
    }
}
