use std::any::Any;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Granted,
    Denied,
    Abstain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Granted,
    Denied,
}

impl Decision {
    pub fn is_granted(self) -> bool { self == Decision::Granted }
}

/// A policy unit for some subject types and attributes.
///
/// Subjects are passed as `&dyn Any`; a voter recognises its subject type by downcasting.
pub trait Voter<U>: Send + Sync {
    fn supports(&self, subject: &dyn Any, attribute: &str) -> bool;

    /// Only called when `supports` returned true for the same pair.
    fn vote_on(&self, actor: &U, subject: &dyn Any, attribute: &str) -> Vote;
}

/// Requested attributes. A single attribute is a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<String>);

impl Attributes {
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<&str> for Attributes {
    fn from(a: &str) -> Self { Attributes(vec![a.to_string()]) }
}

impl From<String> for Attributes {
    fn from(a: String) -> Self { Attributes(vec![a]) }
}

impl From<Vec<String>> for Attributes {
    fn from(v: Vec<String>) -> Self { Attributes(v) }
}

impl From<Vec<&str>> for Attributes {
    fn from(v: Vec<&str>) -> Self { Attributes(v.into_iter().map(str::to_string).collect()) }
}

impl From<&[&str]> for Attributes {
    fn from(v: &[&str]) -> Self { Attributes(v.iter().map(|s| s.to_string()).collect()) }
}

impl<const N: usize> From<[&str; N]> for Attributes {
    fn from(v: [&str; N]) -> Self { Attributes(v.iter().map(|s| s.to_string()).collect()) }
}
