//! The key/value pair handed to preparers, plus the small value traits the
//! shipped preparers are generic over.

/// Values stored per settings key.
///
/// The outer `None` is an absent value, an inner `None` is an absent element.
pub type Values = Option<Vec<Option<String>>>;

/// The pair type a [`SettingsMap`](crate::SettingsMap) prepares and stores.
pub type SettingPair = KeyValue<String, Values>;

/// A mutable key/value pair, rewritten in place by preparers before it is
/// committed into a settings container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyValue<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> KeyValue<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl SettingPair {
    /// Builds a multi-value pair where every element is present.
    pub fn from_strs<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            key.into(),
            Some(values.into_iter().map(|v| Some(v.into())).collect()),
        )
    }
}

/// Whitespace trimming applied in place.
///
/// Absent values stay absent and collections keep their length and order.
pub trait Trim {
    fn trim_in_place(&mut self);
}

impl Trim for String {
    fn trim_in_place(&mut self) {
        let end = self.trim_end().len();
        self.truncate(end);

        let start = self.len() - self.trim_start().len();
        if start > 0 {
            self.drain(..start);
        }
    }
}

impl<T: Trim> Trim for Option<T> {
    fn trim_in_place(&mut self) {
        if let Some(inner) = self {
            inner.trim_in_place();
        }
    }
}

impl<T: Trim> Trim for Vec<T> {
    fn trim_in_place(&mut self) {
        self.iter_mut().for_each(Trim::trim_in_place);
    }
}

/// Emptiness as seen by the empty-value policy.
///
/// For [`Values`] a value is empty when it is absent, has no elements, or
/// its first element is absent or the empty string.
pub trait EmptyValue {
    fn is_empty_value(&self) -> bool;
}

impl EmptyValue for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyValue for &str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: EmptyValue> EmptyValue for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().is_none_or(EmptyValue::is_empty_value)
    }
}

impl<T: EmptyValue> EmptyValue for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.first().is_none_or(EmptyValue::is_empty_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_string_in_place() {
        let mut value = String::from("  \t padded value \n");
        value.trim_in_place();
        assert_eq!(value, "padded value");

        let mut blank = String::from("   ");
        blank.trim_in_place();
        assert_eq!(blank, "");
    }

    #[test]
    fn test_trim_keeps_inner_whitespace_and_unicode() {
        let mut value = String::from("\u{3000}grüße  welt\u{3000}");
        value.trim_in_place();
        assert_eq!(value, "grüße  welt");
    }

    #[test]
    fn test_trim_preserves_absent_elements() {
        let mut values: Values = Some(vec![Some(" a ".into()), None, Some("b  ".into())]);
        values.trim_in_place();
        assert_eq!(values, Some(vec![Some("a".into()), None, Some("b".into())]));
    }

    #[test]
    fn test_empty_value_triggers() {
        let absent: Values = None;
        let no_elements: Values = Some(vec![]);
        let absent_first: Values = Some(vec![None, Some("x".into())]);
        let empty_first: Values = Some(vec![Some(String::new()), Some("x".into())]);
        let present: Values = Some(vec![Some("x".into()), None]);

        assert!(absent.is_empty_value());
        assert!(no_elements.is_empty_value());
        assert!(absent_first.is_empty_value());
        assert!(empty_first.is_empty_value());
        assert!(!present.is_empty_value());
    }

    #[test]
    fn test_whitespace_only_is_not_empty() {
        let values: Values = Some(vec![Some(" ".into())]);
        assert!(!values.is_empty_value());
    }
}
