//! Identity resolution and session management for login across request handlers.
//! Keep the public surface thin and split implementation across sub-modules.

mod auth_result;
mod credentials;
mod manager;
mod provider;
mod session;
pub(crate) mod user;

pub use auth_result::{AuthResult, ExtendedData, USER_KEY};
pub use credentials::{CredentialForm, Credentials, RawCredentials};
pub use manager::AuthManager;
pub use provider::AuthLogic;
pub use session::{spawn_sweeper, RandomTokens, Session, SessionStore, SessionToken, TokenSource, DEFAULT_SHARDS};
pub use user::{Identity, UserModel};
