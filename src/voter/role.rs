use std::any::Any;

use super::api::{Vote, Voter};
use crate::identity::UserModel;

/// Grants `ROLE_*` attributes the actor holds, on any subject.
#[derive(Debug, Clone)]
pub struct RoleVoter {
    prefix: String,
}

impl RoleVoter {
    pub fn new() -> Self { Self::with_prefix("ROLE_") }

    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self { Self { prefix: prefix.into() } }
}

impl Default for RoleVoter {
    fn default() -> Self { Self::new() }
}

impl<U: UserModel> Voter<U> for RoleVoter {
    fn supports(&self, _subject: &dyn Any, attribute: &str) -> bool { attribute.starts_with(&self.prefix) }

    fn vote_on(&self, actor: &U, _subject: &dyn Any, attribute: &str) -> Vote {
        if actor.roles().iter().any(|r| r.eq_ignore_ascii_case(attribute)) { Vote::Granted } else { Vote::Denied }
    }
}
