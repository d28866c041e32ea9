//! Data-access seam: how the core reaches user records without owning their storage.
//! Keep the surface thin; concrete backends live in sub-modules or in the host application.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DataError;
use crate::identity::UserModel;

pub mod memory;
pub mod shape;

pub use memory::{MemoryDaoFactory, MemoryRepository};

/// Field/value equality criteria, all of which must hold.
pub type Criteria = BTreeMap<String, String>;

pub fn criteria(field: &str, value: &str) -> Criteria {
    let mut c = Criteria::new();
    c.insert(field.to_string(), value.to_string());
    c
}

pub(crate) fn describe(criteria: &Criteria) -> String {
    criteria.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join(",")
}

pub trait Repository<U: UserModel>: Send + Sync {
    /// Exactly one match, otherwise `NotFound` or `Ambiguous`.
    fn find_one_by(&self, criteria: &Criteria) -> Result<U, DataError>;

    /// `UnknownField` when the backend knows its entity shape and `field` is not part of it.
    /// Backends without a known shape accept every field.
    fn ensure_field(&self, field: &str) -> Result<(), DataError> {
        let _ = field;
        Ok(())
    }

    /// Rebuild a rich entity from its plain form.
    fn make_model(&self, raw: &Value) -> Result<U, DataError> {
        serde_json::from_value(raw.clone()).map_err(|e| DataError::Backend(format!("cannot rebuild model: {}", e)))
    }
}

/// Resolves a repository from a bundle/model pair.
pub trait DaoFactory<U: UserModel>: Send + Sync {
    fn get(&self, bundle: &str, model: &str) -> Result<Arc<dyn Repository<U>>, DataError>;
}
