//! In-memory repository and factory. Matching is done on the serialized form of each entity,
//! so any `UserModel` works without per-type field accessors.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::shape::declared_fields;
use super::{describe, Criteria, DaoFactory, Repository};
use crate::error::DataError;
use crate::identity::UserModel;

pub struct MemoryRepository<U> {
    rows: RwLock<Vec<U>>,
    /// Fields of `U` when its shape is known; criteria on anything else are rejected up front.
    fields: Option<BTreeSet<String>>,
    offline: AtomicBool,
    lookups: AtomicUsize,
}

impl<U: UserModel> MemoryRepository<U> {
    pub fn new(rows: Vec<U>) -> Self {
        Self { rows: RwLock::new(rows), fields: declared_fields::<U>(), offline: AtomicBool::new(false), lookups: AtomicUsize::new(0) }
    }

    pub fn insert(&self, user: U) { self.rows.write().push(user); }

    /// Remove every entity whose identity equals `id`; returns how many were removed.
    pub fn remove_identity(&self, id: &crate::identity::Identity) -> usize {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|u| &u.identity_id() != id);
        before - rows.len()
    }

    /// Simulate an unreachable backend: every lookup fails with `DataError::Backend`.
    pub fn set_offline(&self, offline: bool) { self.offline.store(offline, Ordering::SeqCst); }

    /// Number of `find_one_by` calls served so far.
    pub fn lookups(&self) -> usize { self.lookups.load(Ordering::SeqCst) }
}

fn field_matches(row: &Value, field: &str, expected: &str) -> Result<bool, DataError> {
    let Some(v) = row.get(field) else { return Err(DataError::UnknownField(field.to_string())); };
    Ok(match v {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    })
}

impl<U: UserModel> Repository<U> for MemoryRepository<U> {
    fn find_one_by(&self, criteria: &Criteria) -> Result<U, DataError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        for field in criteria.keys() {
            self.ensure_field(field)?;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(DataError::Backend("repository offline".into()));
        }
        let rows = self.rows.read();
        let mut found: Vec<&U> = Vec::new();
        for u in rows.iter() {
            let raw = serde_json::to_value(u).map_err(|e| DataError::Backend(e.to_string()))?;
            let mut all = true;
            for (field, expected) in criteria.iter() {
                if !field_matches(&raw, field, expected)? { all = false; break; }
            }
            if all { found.push(u); }
        }
        match found.as_slice() {
            [one] => Ok((*one).clone()),
            [] => Err(DataError::NotFound(describe(criteria))),
            many => Err(DataError::Ambiguous { criteria: describe(criteria), count: many.len() }),
        }
    }

    fn ensure_field(&self, field: &str) -> Result<(), DataError> {
        match &self.fields {
            Some(known) if !known.contains(field) => Err(DataError::UnknownField(field.to_string())),
            _ => Ok(()),
        }
    }
}

/// Factory keyed by (bundle, model).
pub struct MemoryDaoFactory<U: UserModel> {
    repos: HashMap<(String, String), Arc<dyn Repository<U>>>,
}

impl<U: UserModel> MemoryDaoFactory<U> {
    pub fn new() -> Self { Self { repos: HashMap::new() } }

    pub fn register(&mut self, bundle: &str, model: &str, repo: Arc<dyn Repository<U>>) {
        self.repos.insert((bundle.to_string(), model.to_string()), repo);
    }

    pub fn with(mut self, bundle: &str, model: &str, repo: Arc<dyn Repository<U>>) -> Self {
        self.register(bundle, model, repo);
        self
    }
}

impl<U: UserModel> Default for MemoryDaoFactory<U> {
    fn default() -> Self { Self::new() }
}

impl<U: UserModel> DaoFactory<U> for MemoryDaoFactory<U> {
    fn get(&self, bundle: &str, model: &str) -> Result<Arc<dyn Repository<U>>, DataError> {
        self.repos
            .get(&(bundle.to_string(), model.to_string()))
            .cloned()
            .ok_or_else(|| DataError::UnknownModel { bundle: bundle.to_string(), model: model.to_string() })
    }
}
