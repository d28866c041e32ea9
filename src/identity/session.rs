use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use super::auth_result::{AuthResult, ExtendedData, USER_KEY};
use super::user::Identity;
use crate::clock::{Clock, SystemClock};
use crate::error::AuthError;

pub type SessionToken = String;

pub const DEFAULT_SHARDS: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub session_id: String,
    pub token: SessionToken,
    /// `None` marks an anonymous session.
    pub identity: Option<Identity>,
    pub extended_data: ExtendedData,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool { self.identity.is_some() }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }

    /// Plain form of the user that produced this session.
    pub fn user_data(&self) -> Option<&Value> { self.extended_data.get(USER_KEY) }
}

/// Where session tokens come from. Tokens must be unguessable; the store only guarantees
/// uniqueness among live sessions.
pub trait TokenSource: Send + Sync {
    fn next_token(&self) -> Result<SessionToken, AuthError>;
}

/// 256-bit OS randomness, base64url without padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn next_token(&self) -> Result<SessionToken, AuthError> {
        let mut buf = [0u8; 32];
        getrandom::getrandom(&mut buf).map_err(|e| AuthError::backend(format!("token entropy unavailable: {}", e)))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
    }
}

const MAX_TOKEN_DRAWS: usize = 8;

type Shard = RwLock<HashMap<SessionToken, Session>>;

/// Token-keyed session cache with lazy expiry.
///
/// Sessions are spread over independently locked shards so that creating or evicting
/// one token never blocks lookups of tokens living in other shards.
pub struct SessionStore {
    shards: Box<[Shard]>,
    mask: usize,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenSource>,
}

impl SessionStore {
    pub fn new(ttl: std::time::Duration) -> Self { Self::with_clock(ttl, Arc::new(SystemClock)) }

    pub fn with_clock(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_shards(ttl, clock, DEFAULT_SHARDS)
    }

    /// `shards` is rounded up to a power of two.
    pub fn with_shards(ttl: std::time::Duration, clock: Arc<dyn Clock>, shards: usize) -> Self {
        let n = shards.max(1).next_power_of_two();
        let shards: Vec<Shard> = (0..n).map(|_| RwLock::new(HashMap::new())).collect();
        Self {
            shards: shards.into_boxed_slice(),
            mask: n - 1,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
            tokens: Arc::new(RandomTokens),
        }
    }

    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn ttl(&self) -> TimeDelta { self.ttl }

    fn shard(&self, token: &str) -> &Shard {
        let h = xxh3_64(token.as_bytes()) as usize;
        &self.shards[h & self.mask]
    }

    /// Only a successful result carrying its user can open a session. The session becomes
    /// visible in a single insert.
    pub fn create_session(&self, result: &AuthResult) -> Result<Session, AuthError> {
        let Some(identity) = result.identity() else { return Err(AuthError::AuthFailed); };
        if !result.extended_data().contains_key(USER_KEY) {
            return Err(AuthError::configuration("successful auth result without user data"));
        }
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        for _ in 0..MAX_TOKEN_DRAWS {
            let token = self.tokens.next_token()?;
            let mut shard = self.shard(&token).write();
            // never overwrite a live session; draw again
            let Entry::Vacant(slot) = shard.entry(token.clone()) else { continue; };
            let session = Session {
                session_id: uuid::Uuid::new_v4().to_string(),
                token,
                identity: Some(identity.clone()),
                extended_data: result.extended_data().clone(),
                created_at: now,
                expires_at,
            };
            slot.insert(session.clone());
            drop(shard);
            info!(target: "portcullis::session", identity = %identity, sid = %session.session_id, ttl_secs = self.ttl.num_seconds(), "session.issue");
            return Ok(session);
        }
        Err(AuthError::backend(format!("token source collided {} times in a row", MAX_TOKEN_DRAWS)))
    }

    /// Expired sessions are evicted here and never returned.
    pub fn get_session(&self, token: &str) -> Option<Session> {
        let now = self.clock.now();
        let shard = self.shard(token);
        {
            let map = shard.read();
            match map.get(token) {
                None => return None,
                Some(s) if !s.is_expired_at(now) => return Some(s.clone()),
                Some(_) => {}
            }
        }
        let mut map = shard.write();
        if let Some(s) = map.get(token) {
            if s.is_expired_at(now) {
                let sid = s.session_id.clone();
                map.remove(token);
                debug!(target: "portcullis::session", sid = %sid, "session.expired");
            } else {
                return Some(s.clone());
            }
        }
        None
    }

    /// Logout. Returns whether a session was removed.
    pub fn destroy(&self, token: &str) -> bool {
        let removed = self.shard(token).write().remove(token);
        if let Some(s) = &removed {
            info!(target: "portcullis::session", sid = %s.session_id, "session.logout");
        }
        removed.is_some()
    }

    /// Drop every session bound to `identity`.
    pub fn revoke_identity(&self, identity: &Identity) -> usize {
        let mut count = 0usize;
        for shard in self.shards.iter() {
            let mut map = shard.write();
            let before = map.len();
            map.retain(|_, s| s.identity.as_ref() != Some(identity));
            count += before - map.len();
        }
        info!(target: "portcullis::session", identity = %identity, count, "session.revoke");
        count
    }

    /// Reclaim memory held by expired sessions. Lookups never depend on this running.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut count = 0usize;
        for shard in self.shards.iter() {
            let mut map = shard.write();
            let before = map.len();
            map.retain(|_, s| !s.is_expired_at(now));
            count += before - map.len();
        }
        if count > 0 {
            debug!(target: "portcullis::session", count, "session.sweep");
        }
        count
    }

    /// Number of cached sessions, expired-but-unswept ones included.
    pub fn len(&self) -> usize { self.shards.iter().map(|s| s.read().len()).sum() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Periodically sweep expired sessions on the current tokio runtime.
pub fn spawn_sweeper(store: Arc<SessionStore>, period: std::time::Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(period);
        // first tick completes immediately
        tick.tick().await;
        loop {
            tick.tick().await;
            store.sweep_expired();
        }
    })
}
