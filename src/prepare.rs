//! Preparation of key/value pairs before they are committed into a settings
//! container.
//!
//! A preparer is consulted with [`PrepareKeyValue::should_prepare`] first and
//! only then asked to [`PrepareKeyValue::prepare`] the pair, rewriting its key
//! and value in place. Every preparer shipped by this crate owns a
//! [`SkipSet`]: keys registered there are never handed to its mutation logic.
//!
//! # Example
//!
//! ```rust
//! use next_settings::{KeyValue, PrepareKeyValue, SkipKeys, TrimKeyValue};
//!
//! let trim = TrimKeyValue::<String>::new().skip_key("raw".to_string());
//!
//! let mut pair = KeyValue::new(" name ".to_string(), Some("  value ".to_string()));
//! if trim.should_prepare(&pair) {
//!     trim.prepare(&mut pair).unwrap();
//! }
//! assert_eq!(pair.key, "name");
//! assert_eq!(pair.value.as_deref(), Some("value"));
//!
//! let raw = KeyValue::new("raw".to_string(), Some(" kept ".to_string()));
//! assert!(!PrepareKeyValue::<String, Option<String>>::should_prepare(&trim, &raw));
//! ```
use std::{borrow::Borrow, collections::HashSet, hash::Hash};

use crate::{KeyValue, error::Error};

/// A unit of preparation logic for pairs of type `KeyValue<K, V>`.
pub trait PrepareKeyValue<K, V>: Send + Sync {
    /// Decides whether [`prepare`](PrepareKeyValue::prepare) applies to `pair`.
    ///
    /// Must not have side effects.
    fn should_prepare(&self, pair: &KeyValue<K, V>) -> bool;

    /// Mutates `pair` in place.
    ///
    /// Applying a preparer to already prepared data must not change it any
    /// further. Returning an error refuses the pair and aborts the load it
    /// belongs to.
    fn prepare(&self, pair: &mut KeyValue<K, V>) -> Result<(), Error>;
}

/// Keys exempted from a preparer. Grows only.
#[derive(Debug, Clone)]
pub struct SkipSet<K> {
    keys: HashSet<K>,
}

impl<K> Default for SkipSet<K> {
    fn default() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash> SkipSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K) -> &mut Self {
        self.keys.insert(key);
        self
    }

    pub fn extend<I: IntoIterator<Item = K>>(&mut self, keys: I) -> &mut Self {
        self.keys.extend(keys);
        self
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Skip-list registration shared by every preparer that owns a [`SkipSet`].
pub trait SkipKeys<K: Eq + Hash> {
    fn skip_set(&self) -> &SkipSet<K>;
    fn skip_set_mut(&mut self) -> &mut SkipSet<K>;

    /// Exempts `key` from this preparer.
    fn add_key_to_skip(&mut self, key: K) -> &mut Self {
        self.skip_set_mut().insert(key);
        self
    }

    /// Exempts every key in `keys` from this preparer.
    fn add_keys_to_skip<I: IntoIterator<Item = K>>(&mut self, keys: I) -> &mut Self {
        self.skip_set_mut().extend(keys);
        self
    }

    /// Consuming form of [`add_key_to_skip`](SkipKeys::add_key_to_skip).
    fn skip_key(mut self, key: K) -> Self
    where
        Self: Sized,
    {
        self.add_key_to_skip(key);
        self
    }

    /// Consuming form of [`add_keys_to_skip`](SkipKeys::add_keys_to_skip).
    fn skip_keys<I: IntoIterator<Item = K>>(mut self, keys: I) -> Self
    where
        Self: Sized,
    {
        self.add_keys_to_skip(keys);
        self
    }

    fn is_skipped(&self, key: &K) -> bool {
        self.skip_set().contains(key)
    }
}
