//!
//! portcullis demo binary
//! ----------------------
//! Loads an auth config and a JSON user seed, performs one login and checks the
//! requested attributes against the role voter. Useful for trying a config out.
//!
//! portcullis --users users.json --account ann@example.com --password pw [--config auth.json] [--require ROLE_ADMIN]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use portcullis::dao::{MemoryDaoFactory, MemoryRepository, Repository};
use portcullis::identity::RawCredentials;
use portcullis::password::{hash_password, verify_password};
use portcullis::voter::RoleVoter;
use portcullis::{AuthConfig, AuthManager, Identity, SecuredController, UserModel, VoterManager};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DemoUser {
    id: i64,
    email: String,
    password_hash: String,
    #[serde(default)]
    roles: Vec<String>,
}

impl UserModel for DemoUser {
    fn check_password(&self, secret: &str) -> bool { verify_password(&self.password_hash, secret) }
    fn identity_id(&self) -> Identity { Identity::from(self.id) }
    fn roles(&self) -> Vec<String> { self.roles.clone() }
}

/// Seed file row; the plain password is hashed on load.
#[derive(Debug, Deserialize)]
struct SeedUser {
    id: i64,
    email: String,
    password: String,
    #[serde(default)]
    roles: Vec<String>,
}

fn parse_arg(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn parse_all(args: &[String], flag: &str) -> Vec<String> {
    args.windows(2).filter(|w| w[0] == flag).map(|w| w[1].clone()).collect()
}

fn load_users(path: &PathBuf) -> Result<Vec<DemoUser>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let seed: Vec<SeedUser> = serde_json::from_str(&text).context("parsing user seed")?;
    seed.into_iter()
        .map(|s| -> Result<DemoUser> {
            Ok(DemoUser { id: s.id, email: s.email, password_hash: hash_password(&s.password)?, roles: s.roles })
        })
        .collect()
}

fn main() -> Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow!(e.to_string()))?;
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_arg(&args, "--config") {
        Some(p) => AuthConfig::from_file(&PathBuf::from(p))?,
        None => AuthConfig::default(),
    }
    .apply_env()?;
    config.validate()?;

    let users_path = parse_arg(&args, "--users").ok_or_else(|| anyhow!("--users <file> is required"))?;
    let account = parse_arg(&args, "--account").ok_or_else(|| anyhow!("--account is required"))?;
    let password = parse_arg(&args, "--password").ok_or_else(|| anyhow!("--password is required"))?;

    let users = load_users(&PathBuf::from(users_path))?;
    info!(target: "portcullis", "loaded {} users, session duration {}s", users.len(), config.session_duration_seconds);

    let repo: Arc<dyn Repository<DemoUser>> = Arc::new(MemoryRepository::new(users));
    let factory = MemoryDaoFactory::new().with(&config.user_lookup.bundle, &config.user_lookup.model, repo);
    let auth = Arc::new(AuthManager::new(&config, &factory)?);
    let voters: Arc<VoterManager<DemoUser>> = Arc::new(VoterManager::default().with_voter(RoleVoter::new()));

    let mut raw = RawCredentials::new();
    raw.insert(config.login_field_map.account.clone(), account);
    raw.insert(config.login_field_map.password.clone(), password);
    let session = match auth.auth(&raw) {
        Ok(s) => s,
        Err(e) => {
            println!("login: {} ({})", e.public_message(), e.http_status());
            return Ok(());
        }
    };
    println!("login: ok sid={} expires_at={}", session.session_id, session.expires_at.to_rfc3339());

    let controller = SecuredController::new(auth, voters, Some(session.token));
    for attribute in parse_all(&args, "--require") {
        match controller.deny_access_unless_granted(attribute.as_str(), &()) {
            Ok(()) => println!("{}: granted", attribute),
            Err(e) => println!("{}: {} ({})", attribute, e.public_message(), e.http_status()),
        }
    }
    Ok(())
}
