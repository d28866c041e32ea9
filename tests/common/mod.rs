//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use portcullis::dao::{MemoryDaoFactory, MemoryRepository, Repository};
use portcullis::identity::RawCredentials;
use portcullis::password::verify_password;
use portcullis::{AuthConfig, AuthManager, Identity, UserModel};

/// Plain-text password user; keeps the suite fast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Member {
    pub fn new(id: i64, email: &str, password: &str, roles: &[&str]) -> Self {
        Member { id, email: email.into(), password: password.into(), roles: roles.iter().map(|r| r.to_string()).collect() }
    }
}

impl UserModel for Member {
    fn check_password(&self, secret: &str) -> bool { self.password == secret }
    fn identity_id(&self) -> Identity { Identity::from(self.id) }
    fn roles(&self) -> Vec<String> { self.roles.clone() }
}

/// Argon2-hashed user, as a real data-access layer would provide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedMember {
    pub uid: String,
    pub login: String,
    pub password_hash: String,
}

impl UserModel for HashedMember {
    fn check_password(&self, secret: &str) -> bool { verify_password(&self.password_hash, secret) }
    fn identity_id(&self) -> Identity { Identity::from(self.uid.as_str()) }
}

pub fn members() -> Vec<Member> {
    vec![
        Member::new(1, "ann@example.com", "ann-pw", &["ROLE_ADMIN"]),
        Member::new(2, "bob@example.com", "bob-pw", &[]),
        Member::new(3, "cat@example.com", "cat-pw", &["ROLE_EDITOR"]),
    ]
}

pub fn raw(pairs: &[(&str, &str)]) -> RawCredentials {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>()
}

pub fn creds(account: &str, password: &str) -> RawCredentials {
    raw(&[("account", account), ("password", password)])
}

pub fn setup_with(config: &AuthConfig) -> (Arc<MemoryRepository<Member>>, Arc<AuthManager<Member>>) {
    let repo = Arc::new(MemoryRepository::new(members()));
    let dyn_repo: Arc<dyn Repository<Member>> = repo.clone();
    let factory = MemoryDaoFactory::new().with(&config.user_lookup.bundle, &config.user_lookup.model, dyn_repo);
    let manager = AuthManager::<Member>::new(config, &factory).expect("auth manager");
    (repo, Arc::new(manager))
}

pub fn setup() -> (Arc<MemoryRepository<Member>>, Arc<AuthManager<Member>>) {
    setup_with(&AuthConfig::default())
}
