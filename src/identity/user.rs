use std::fmt::{Display, Formatter};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Canonical id of an authenticated actor. Opaque and comparable; numeric ids are kept in
/// their decimal form so they compare equal to the same id read back from a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new<S: Into<String>>(id: S) -> Self { Identity(id.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self { Identity(s.to_string()) }
}

impl From<String> for Identity {
    fn from(s: String) -> Self { Identity(s) }
}

impl From<i64> for Identity {
    fn from(n: i64) -> Self { Identity(n.to_string()) }
}

impl From<u64> for Identity {
    fn from(n: u64) -> Self { Identity(n.to_string()) }
}

impl From<i32> for Identity {
    fn from(n: i32) -> Self { Identity(n.to_string()) }
}

/// Capabilities the data-access layer's user type must provide.
///
/// The serde bounds let a resolved user travel through session extended data in plain
/// form and be rebuilt by the repository afterwards.
pub trait UserModel: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// True if `secret` matches the stored password.
    fn check_password(&self, secret: &str) -> bool;

    fn identity_id(&self) -> Identity;

    /// Role names consumed by `RoleVoter`.
    fn roles(&self) -> Vec<String> { Vec::new() }
}
