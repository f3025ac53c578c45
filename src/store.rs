//! Process-wide rule sets.
//!
//! A [`RuleStore`] holds the current rules for one domain behind a
//! copy-on-write cell: readers take an `Arc` snapshot, writers clone the
//! current set, apply their update and swap the pointer under the write lock.
//! A reader therefore never observes a half-applied update.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::boolean::BoolRules;
use crate::email::EmailRules;
use crate::enumeration::EnumRules;
use crate::error::RuleError;
use crate::integer::IntegerRules;
use crate::rules::RuleSet;
use crate::uuid::UuidRules;

/// Process-wide boolean rules.
pub static BOOLEAN: Lazy<RuleStore<BoolRules>> = Lazy::new(RuleStore::new);

/// Process-wide integer rules, shared by the signed, unsigned and ranged coercers.
pub static INTEGER: Lazy<RuleStore<IntegerRules>> = Lazy::new(RuleStore::new);

/// Process-wide enumeration rules.
pub static ENUMERATION: Lazy<RuleStore<EnumRules>> = Lazy::new(RuleStore::new);

/// Process-wide UUID rules.
pub static UUID: Lazy<RuleStore<UuidRules>> = Lazy::new(RuleStore::new);

/// Process-wide email rules.
pub static EMAIL: Lazy<RuleStore<EmailRules>> = Lazy::new(RuleStore::new);

/// A mutable cell holding the current rule set of one domain.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::{BoolOverrides, Fallback, RuleStore};
/// use scalar_sanitize::boolean::BoolRules;
///
/// let store: RuleStore<BoolRules> = RuleStore::new();
/// store.update(BoolOverrides {
///     default: Some(Fallback::Value(true)),
///     ..Default::default()
/// });
///
/// assert_eq!(store.snapshot().default, Fallback::Value(true));
/// ```
#[derive(Debug)]
pub struct RuleStore<R: RuleSet> {
    current: RwLock<Arc<R>>,
}

impl<R: RuleSet> RuleStore<R> {
    /// Creates a store holding the hard-coded defaults.
    pub fn new() -> Self {
        Self::with_rules(R::default())
    }

    /// Creates a store holding `rules`.
    pub fn with_rules(rules: R) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// Returns the current rules. Later updates do not affect the snapshot.
    pub fn snapshot(&self) -> Arc<R> {
        Arc::clone(&self.current.read())
    }

    /// Replaces every key present in `update`; other keys keep their value.
    pub fn update(&self, update: R::Overrides) {
        let mut current = self.current.write();
        let mut next = R::clone(&current);
        next.apply(update);
        *current = Arc::new(next);
        debug!(domain = R::DOMAIN, "sanitizer rules updated");
    }

    /// Applies an update given as a JSON object keyed by rule name.
    ///
    /// Keys are read in input order. Unknown keys are skipped with a warning.
    /// Nothing is stored if any known key carries a malformed value.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::NotAnObject`] if `rules` is not an object and
    /// [`RuleError::InvalidValue`] for a malformed value.
    pub fn update_json(&self, rules: &Value) -> Result<(), RuleError> {
        let map = rules
            .as_object()
            .ok_or(RuleError::NotAnObject { domain: R::DOMAIN })?;

        let mut update = R::Overrides::default();
        for (key, value) in map {
            if R::KEYS.contains(&key.as_str()) {
                R::parse_key(key, value, &mut update)?;
            } else {
                warn!(
                    domain = R::DOMAIN,
                    key = %key,
                    "cannot update unknown {} sanitizer rule '{}'",
                    R::DOMAIN,
                    key
                );
            }
        }

        self.update(update);
        Ok(())
    }

    /// Restores the hard-coded defaults.
    pub fn reset(&self) {
        *self.current.write() = Arc::new(R::default());
        debug!(domain = R::DOMAIN, "sanitizer rules reset to defaults");
    }
}

impl<R: RuleSet> Default for RuleStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
