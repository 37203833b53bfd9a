//! Registration of preparers on a settings container.
use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{KeyValue, error::Error, prepare::PrepareKeyValue};

/// A shared, registered preparer.
pub type Observer<K, V> = Arc<dyn PrepareKeyValue<K, V>>;

/// Implemented by settings containers that run preparers on every incoming
/// pair before storing it.
///
/// Observers run in registration order. Registering the same observer
/// instance twice is rejected with [`Error::DuplicateObserver`].
pub trait KeyValueObservable<K, V> {
    fn add_observer(&mut self, observer: Observer<K, V>) -> Result<(), Error>;

    /// Removes `observer` and returns the registered instance, or `None`
    /// if it was never registered.
    fn remove_observer(&mut self, observer: &Observer<K, V>) -> Option<Observer<K, V>>;

    /// Runs every registered observer whose `should_prepare` accepts `pair`.
    ///
    /// Stops at the first observer that refuses the pair.
    fn prepare_key_value(&self, pair: &mut KeyValue<K, V>) -> Result<(), Error>;
}

/// An ordered list of observers, embedded by containers to implement
/// [`KeyValueObservable`].
pub struct ObserverList<K, V> {
    observers: Vec<Observer<K, V>>,
}

impl<K, V> ObserverList<K, V> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn contains(&self, observer: &Observer<K, V>) -> bool {
        self.observers.iter().any(|o| Arc::ptr_eq(o, observer))
    }
}

impl<K, V> Default for ObserverList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for ObserverList<K, V> {
    fn clone(&self) -> Self {
        Self {
            observers: self.observers.clone(),
        }
    }
}

impl<K, V> fmt::Debug for ObserverList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<K, V> KeyValueObservable<K, V> for ObserverList<K, V> {
    fn add_observer(&mut self, observer: Observer<K, V>) -> Result<(), Error> {
        if self.contains(&observer) {
            return Err(Error::DuplicateObserver);
        }

        self.observers.push(observer);
        debug!(observers = self.observers.len(), "Registered key/value observer");
        Ok(())
    }

    fn remove_observer(&mut self, observer: &Observer<K, V>) -> Option<Observer<K, V>> {
        let index = self
            .observers
            .iter()
            .position(|o| Arc::ptr_eq(o, observer))?;

        let removed = self.observers.remove(index);
        debug!(observers = self.observers.len(), "Removed key/value observer");
        Some(removed)
    }

    fn prepare_key_value(&self, pair: &mut KeyValue<K, V>) -> Result<(), Error> {
        for observer in &self.observers {
            if observer.should_prepare(pair) {
                observer.prepare(pair)?;
            }
        }

        Ok(())
    }
}
