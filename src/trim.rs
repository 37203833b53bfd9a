use std::hash::Hash;

use tracing::trace;

use crate::{
    KeyValue,
    error::Error,
    key_value::Trim,
    prepare::{PrepareKeyValue, SkipKeys, SkipSet},
};

/// Trims surrounding whitespace from the key and the value of a pair.
///
/// Works for single values (`Option<String>`, `String`) as well as for
/// [`Values`](crate::Values), where every present element is trimmed and
/// absent elements are left alone.
#[derive(Debug, Clone)]
pub struct TrimKeyValue<K = String> {
    skip: SkipSet<K>,
}

impl<K: Eq + Hash> TrimKeyValue<K> {
    pub fn new() -> Self {
        Self {
            skip: SkipSet::new(),
        }
    }
}

impl<K: Eq + Hash> Default for TrimKeyValue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> SkipKeys<K> for TrimKeyValue<K> {
    fn skip_set(&self) -> &SkipSet<K> {
        &self.skip
    }

    fn skip_set_mut(&mut self) -> &mut SkipSet<K> {
        &mut self.skip
    }
}

impl<K, V> PrepareKeyValue<K, V> for TrimKeyValue<K>
where
    K: Trim + Eq + Hash + Send + Sync,
    V: Trim,
{
    fn should_prepare(&self, pair: &KeyValue<K, V>) -> bool {
        !self.is_skipped(&pair.key)
    }

    fn prepare(&self, pair: &mut KeyValue<K, V>) -> Result<(), Error> {
        pair.key.trim_in_place();
        pair.value.trim_in_place();
        trace!("Trimmed key/value pair");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SettingPair, Values};

    fn prepared<V: Trim + Clone>(pair: &KeyValue<String, V>) -> KeyValue<String, V> {
        let mut pair = pair.clone();
        TrimKeyValue::<String>::new().prepare(&mut pair).unwrap();
        pair
    }

    #[test]
    fn test_trim_single_value() {
        let pair = KeyValue::new("  host ".to_string(), Some(" localhost\t".to_string()));
        let pair = prepared(&pair);

        assert_eq!(pair.key, "host");
        assert_eq!(pair.value.as_deref(), Some("localhost"));
    }

    #[test]
    fn test_trim_absent_value_is_untouched() {
        let pair: KeyValue<String, Option<String>> = KeyValue::new(" host".to_string(), None);
        let pair = prepared(&pair);

        assert_eq!(pair.key, "host");
        assert!(pair.value.is_none());
    }

    #[test]
    fn test_trim_multi_value_preserves_shape() {
        let pair = SettingPair::new(
            "paths ".to_string(),
            Some(vec![Some(" /a ".into()), None, Some("/b".into()), Some("  ".into())]),
        );
        let pair = prepared(&pair);

        assert_eq!(pair.key, "paths");
        assert_eq!(
            pair.value,
            Some(vec![Some("/a".into()), None, Some("/b".into()), Some(String::new())])
        );
    }

    #[test]
    fn test_trim_empty_collection() {
        let pair = SettingPair::new("list".to_string(), Some(vec![]));
        assert_eq!(prepared(&pair).value, Some(vec![]));

        let pair = SettingPair::new("list".to_string(), None);
        assert_eq!(prepared(&pair).value, None::<Vec<Option<String>>>);
    }

    #[test]
    fn test_trim_is_idempotent() {
        let pair = SettingPair::from_strs("  key\n", [" one", "two ", " three "]);
        let once = prepared(&pair);
        let twice = prepared(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_trim_skipped_key() {
        let trim = TrimKeyValue::new().skip_key("raw".to_string());
        let pair = SettingPair::from_strs("raw", [" padded "]);

        assert!(!PrepareKeyValue::<String, Values>::should_prepare(&trim, &pair));
        assert!(trim.should_prepare(&SettingPair::from_strs("other", ["x"])));
    }
}
