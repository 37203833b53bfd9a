use std::{fmt::Display, hash::Hash};

use tracing::warn;

use crate::{
    KeyValue,
    error::Error,
    key_value::EmptyValue,
    prepare::{PrepareKeyValue, SkipKeys, SkipSet},
};

/// The settings key that switches the empty-value policy to warn mode.
///
/// It is pre-registered in the skip list of every empty-value preparer, so
/// the flag itself is never rejected for being empty.
pub const ALLOW_EMPTY_VALUES_KEY: &str = "allow_empty_values";

/// Enforces a non-empty-value policy.
///
/// With `allow_empty` set, an empty value is logged as a warning and left as
/// is. Otherwise preparation fails with [`Error::EmptyValue`] naming the key.
#[derive(Debug, Clone)]
pub struct HandleEmptyValues<K = String> {
    allow_empty: bool,
    skip: SkipSet<K>,
}

impl<K> HandleEmptyValues<K>
where
    K: Eq + Hash + for<'a> From<&'a str>,
{
    pub fn new(allow_empty: bool) -> Self {
        let mut skip = SkipSet::new();
        skip.insert(K::from(ALLOW_EMPTY_VALUES_KEY));

        Self { allow_empty, skip }
    }
}

impl<K> HandleEmptyValues<K> {
    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }
}

impl<K: Eq + Hash> SkipKeys<K> for HandleEmptyValues<K> {
    fn skip_set(&self) -> &SkipSet<K> {
        &self.skip
    }

    fn skip_set_mut(&mut self) -> &mut SkipSet<K> {
        &mut self.skip
    }
}

impl<K, V> PrepareKeyValue<K, V> for HandleEmptyValues<K>
where
    K: Display + Eq + Hash + Send + Sync,
    V: EmptyValue,
{
    fn should_prepare(&self, pair: &KeyValue<K, V>) -> bool {
        !self.is_skipped(&pair.key)
    }

    fn prepare(&self, pair: &mut KeyValue<K, V>) -> Result<(), Error> {
        if !pair.value.is_empty_value() {
            return Ok(());
        }

        if self.allow_empty {
            warn!(key = %pair.key, "Empty value allowed by '{ALLOW_EMPTY_VALUES_KEY}'");
            return Ok(());
        }

        Err(Error::EmptyValue {
            key: pair.key.to_string(),
        })
    }
}

/// Rejects every empty value. Same as `HandleEmptyValues::new(false)`, with
/// no way to switch to warn mode.
#[derive(Debug, Clone)]
pub struct NoEmptyValues<K = String>(HandleEmptyValues<K>);

impl<K> NoEmptyValues<K>
where
    K: Eq + Hash + for<'a> From<&'a str>,
{
    pub fn new() -> Self {
        Self(HandleEmptyValues::new(false))
    }
}

impl<K> Default for NoEmptyValues<K>
where
    K: Eq + Hash + for<'a> From<&'a str>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> SkipKeys<K> for NoEmptyValues<K> {
    fn skip_set(&self) -> &SkipSet<K> {
        self.0.skip_set()
    }

    fn skip_set_mut(&mut self) -> &mut SkipSet<K> {
        self.0.skip_set_mut()
    }
}

impl<K, V> PrepareKeyValue<K, V> for NoEmptyValues<K>
where
    K: Display + Eq + Hash + Send + Sync,
    V: EmptyValue,
{
    fn should_prepare(&self, pair: &KeyValue<K, V>) -> bool {
        self.0.should_prepare(pair)
    }

    fn prepare(&self, pair: &mut KeyValue<K, V>) -> Result<(), Error> {
        self.0.prepare(pair)
    }
}
