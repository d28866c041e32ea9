pub mod clock;
pub mod config;
pub mod controller;
pub mod dao;
pub mod error;
pub mod identity;
pub mod password;
pub mod voter;

pub use config::AuthConfig;
pub use controller::SecuredController;
pub use error::{AuthError, DataError, ValidationError};
pub use identity::{AuthLogic, AuthManager, AuthResult, Identity, Session, SessionStore, UserModel};
pub use voter::{Decision, Strategy, Vote, Voter, VoterManager};
