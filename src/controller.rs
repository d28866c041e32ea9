//! Request-handler façade: the firewall and the voting gate in front of business logic.

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

use crate::error::AuthError;
use crate::identity::{AuthManager, Session, SessionToken, UserModel};
use crate::voter::{Attributes, VoterManager};

/// Built once per request from the shared managers and the token the client presented.
pub struct SecuredController<U: UserModel> {
    auth_manager: Arc<AuthManager<U>>,
    voter_manager: Arc<VoterManager<U>>,
    token: Option<SessionToken>,
}

impl<U: UserModel> SecuredController<U> {
    pub fn new(auth_manager: Arc<AuthManager<U>>, voter_manager: Arc<VoterManager<U>>, token: Option<SessionToken>) -> Self {
        Self { auth_manager, voter_manager, token }
    }

    pub fn token(&self) -> Option<&str> { self.token.as_deref() }

    fn session(&self) -> Option<Session> {
        let token = self.token.as_deref()?;
        self.auth_manager.current_session(token)
    }

    pub fn is_logged_in(&self) -> bool { self.session().is_some_and(|s| s.is_authenticated()) }

    /// Fails with `AuthFailed` unless the request carries a live, authenticated session.
    pub fn auth_firewall(&self) -> Result<Session, AuthError> {
        match self.session() {
            Some(s) if s.is_authenticated() => Ok(s),
            _ => Err(AuthError::AuthFailed),
        }
    }

    pub fn get_user(&self) -> Result<U, AuthError> {
        let session = self.auth_firewall()?;
        let raw = session
            .user_data()
            .ok_or_else(|| AuthError::configuration("authenticated session without user data"))?;
        self.auth_manager.logic().materialize_user(raw)
    }

    /// The firewall runs before any voter is consulted.
    pub fn deny_access_unless_granted<A: Into<Attributes>>(&self, attributes: A, subject: &dyn Any) -> Result<(), AuthError> {
        self.auth_firewall()?;
        let attributes = attributes.into();
        let user = self.get_user()?;
        let decision = self.voter_manager.vote(&user, subject, attributes);
        if decision.is_granted() {
            Ok(())
        } else {
            debug!(target: "portcullis::voter", identity = %user.identity_id(), "access denied");
            Err(AuthError::AccessDenied)
        }
    }
}
