//! A settings container that prepares every pair before storing it.
use std::collections::{BTreeMap, btree_map};

use tracing::trace;

use crate::{
    KeyValue, SettingPair, Values,
    error::Error,
    observable::{KeyValueObservable, Observer, ObserverList},
};

/// Settings keyed by dotted path, each holding a multi-value.
///
/// Every pair goes through the registered observers exactly once on
/// [`put`](SettingsMap::put). A pair an observer refuses is not stored.
#[derive(Debug, Clone, Default)]
pub struct SettingsMap {
    entries: BTreeMap<String, Values>,
    observers: ObserverList<String, Values>,
}

impl SettingsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares `key`/`values` and stores the result, replacing any previous
    /// value under the prepared key.
    pub fn put(&mut self, key: impl Into<String>, values: Values) -> Result<(), Error> {
        let mut pair = KeyValue::new(key.into(), values);
        self.prepare_key_value(&mut pair)?;

        trace!(key = %pair.key, "Storing setting");
        let (key, values) = pair.into_parts();
        self.entries.insert(key, values);
        Ok(())
    }

    /// Shorthand for [`put`](SettingsMap::put) with a single present value.
    pub fn put_str(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), Error> {
        self.put(key, Some(vec![Some(value.into())]))
    }

    pub fn put_pair(&mut self, pair: SettingPair) -> Result<(), Error> {
        let (key, values) = pair.into_parts();
        self.put(key, values)
    }

    pub fn get(&self, key: &str) -> Option<&Values> {
        self.entries.get(key)
    }

    /// The first present element stored under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)?
            .as_ref()?
            .first()?
            .as_deref()
    }

    /// Whether `key` holds a truthy first value (`true`, `yes`, `on`, `1`).
    pub fn flag(&self, key: &str) -> bool {
        self.first(key).is_some_and(is_truthy)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Values> {
        self.entries.iter()
    }

    pub fn observers(&self) -> &ObserverList<String, Values> {
        &self.observers
    }
}

impl KeyValueObservable<String, Values> for SettingsMap {
    fn add_observer(&mut self, observer: Observer<String, Values>) -> Result<(), Error> {
        self.observers.add_observer(observer)
    }

    fn remove_observer(
        &mut self,
        observer: &Observer<String, Values>,
    ) -> Option<Observer<String, Values>> {
        self.observers.remove_observer(observer)
    }

    fn prepare_key_value(&self, pair: &mut SettingPair) -> Result<(), Error> {
        self.observers.prepare_key_value(pair)
    }
}

impl<'a> IntoIterator for &'a SettingsMap {
    type Item = (&'a String, &'a Values);
    type IntoIter = btree_map::Iter<'a, String, Values>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1"
    )
}
