//! Voter-based authorization: independent policy units vote on (actor, subject, attribute)
//! and the manager folds their votes into one decision per call.

pub mod api;
pub mod manager;
pub mod role;

// Re-exports for thin public surface
pub use api::{Attributes, Decision, Vote, Voter};
pub use manager::{Strategy, VoterManager};
pub use role::RoleVoter;
