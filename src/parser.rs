//! The pluggable parser capability.
//!
//! A [`Parser`] turns raw input into a structured object graph
//! ([`serde_value::Value`]). Typed objects are built from that graph through
//! [`ParserExt`], which follows this sequence:
//!
//! 1. the parser reads its input and selects the configured package,
//! 2. settings keys inside the package are converted to the kind of the node
//!    they replace and assigned at their dotted path (see [`apply_settings`]),
//! 3. the graph is deserialized into the target type,
//! 4. [`Configurable::configure_defaults`] runs on the new object.
//!
//! Implementations registered by name are selected through a
//! [`ParserFactory`](crate::ParserFactory).
use std::{
    collections::{BTreeMap, btree_map::Entry},
    io::Read,
    sync::Arc,
};

use serde::de::DeserializeOwned;
use serde_value::Value;

use crate::{SettingsMap, Values, error::Error};

/// Raw characters handed to a parser.
pub type InputSource = Box<dyn Read + Send>;

/// Converts raw input into a configured object graph.
pub trait Parser: Send {
    /// Sets the package hint: a dotted table path scoping both the parsed
    /// document and the settings applied to it.
    fn set_package(&mut self, package: Option<String>);

    /// Sets the settings used to fill in or override values of the document.
    fn set_settings(&mut self, settings: Option<Arc<SettingsMap>>);

    /// Reads the whole input and returns the configured object graph.
    ///
    /// The input is consumed; a second call sees an exhausted source.
    fn parse(&mut self) -> Result<Value, Error>;
}

/// Post-construction hook for objects built by a parser.
pub trait Configurable {
    /// Fills in whatever the parsed document left unset.
    fn configure_defaults(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

pub trait ParserExt: Parser {
    /// Parses and deserializes into `T`.
    fn parse_into<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let value = self.parse()?;
        Ok(T::deserialize(value)?)
    }

    /// Parses, deserializes into `T` and runs its
    /// [`configure_defaults`](Configurable::configure_defaults) hook.
    fn parse_configured<T: DeserializeOwned + Configurable>(&mut self) -> Result<T, Error> {
        let mut object: T = self.parse_into()?;
        object.configure_defaults()?;
        Ok(object)
    }
}

impl<P: Parser + ?Sized> ParserExt for P {}

/// Assigns every setting under `package` into `root` at its dotted path.
///
/// With a package, only keys starting with `"{package}."` are applied and the
/// prefix is stripped; without one every key is applied. Intermediate tables
/// are created as needed.
///
/// A path the document already holds keeps the kind of its node: a string
/// slot receives the text unchanged, numeric and boolean slots get it parsed
/// and fail with [`Error::InvalidSetting`] when it does not parse. Paths the
/// document lacks are converted with [`convert_values`].
pub fn apply_settings(
    root: &mut Value,
    settings: &SettingsMap,
    package: Option<&str>,
) -> Result<(), Error> {
    for (key, values) in settings {
        let path = match package {
            Some(package) => match key
                .strip_prefix(package)
                .and_then(|rest| rest.strip_prefix('.'))
            {
                Some(rest) => rest,
                None => continue,
            },
            None => key.as_str(),
        };

        assign(root, key, path, values)?;
    }

    Ok(())
}

fn assign(root: &mut Value, key: &str, path: &str, values: &Values) -> Result<(), Error> {
    let mut segments = path.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segment.is_empty() {
            return Err(Error::InvalidSetting {
                key: key.to_string(),
                reason: "empty path segment".to_string(),
            });
        }

        let Value::Map(map) = current else {
            return Err(Error::InvalidSetting {
                key: key.to_string(),
                reason: format!("'{segment}' is nested under a non-table value"),
            });
        };

        let slot = map.entry(Value::String(segment.to_string()));

        if segments.peek().is_none() {
            match slot {
                Entry::Occupied(mut slot) => {
                    let value = convert_like(slot.get(), key, values)?;
                    slot.insert(value);
                }
                Entry::Vacant(slot) => {
                    slot.insert(convert_values(values));
                }
            }
            return Ok(());
        }

        current = slot.or_insert_with(|| Value::Map(BTreeMap::new()));
    }

    Ok(())
}

/// Converts stored setting values into an object graph value, guessing each
/// element's type from its text (bool, integer, float, string).
///
/// A single element becomes a scalar, several become a sequence and an
/// absent value becomes unit.
pub fn convert_values(values: &Values) -> Value {
    match values.as_deref() {
        None | Some([]) => Value::Unit,
        Some([single]) => convert_element(single.as_deref()),
        Some(many) => Value::Seq(many.iter().map(|v| convert_element(v.as_deref())).collect()),
    }
}

fn convert_element(element: Option<&str>) -> Value {
    let Some(text) = element else {
        return Value::Unit;
    };

    if let Ok(b) = text.parse::<bool>() {
        Value::Bool(b)
    } else if let Ok(i) = text.parse::<i64>() {
        Value::I64(i)
    } else if let Ok(f) = text.parse::<f64>() {
        Value::F64(f)
    } else {
        Value::String(text.to_string())
    }
}

/// Converts `values` into the kind of `existing`.
///
/// A sequence node keeps its shape even for a single element; its elements
/// follow the kind of its first item. Tables and unit nodes carry no kind and
/// fall back to [`convert_values`].
fn convert_like(existing: &Value, key: &str, values: &Values) -> Result<Value, Error> {
    let Some(elements) = values.as_deref() else {
        return Ok(Value::Unit);
    };

    let convert_all = |kind: Option<&Value>| -> Result<Value, Error> {
        elements
            .iter()
            .map(|element| match kind {
                Some(kind) => convert_element_like(kind, key, element.as_deref()),
                None => Ok(convert_element(element.as_deref())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq)
    };

    match existing {
        Value::Seq(items) => convert_all(items.first()),
        Value::Map(_) | Value::Unit | Value::Option(None) => Ok(convert_values(values)),
        scalar => match elements {
            [] => Ok(Value::Unit),
            [single] => convert_element_like(scalar, key, single.as_deref()),
            _ => convert_all(Some(scalar)),
        },
    }
}

fn convert_element_like(kind: &Value, key: &str, element: Option<&str>) -> Result<Value, Error> {
    let Some(text) = element else {
        return Ok(Value::Unit);
    };

    let invalid = |expected: &str| Error::InvalidSetting {
        key: key.to_string(),
        reason: format!("'{text}' is not a valid {expected}"),
    };

    Ok(match kind {
        Value::String(_) | Value::Char(_) | Value::Bytes(_) => Value::String(text.to_string()),
        Value::Bool(_) => Value::Bool(text.parse().map_err(|_| invalid("boolean"))?),
        Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => {
            Value::I64(text.parse().map_err(|_| invalid("integer"))?)
        }
        Value::U8(_) | Value::U16(_) | Value::U32(_) | Value::U64(_) => {
            Value::U64(text.parse().map_err(|_| invalid("unsigned integer"))?)
        }
        Value::F32(_) | Value::F64(_) => Value::F64(text.parse().map_err(|_| invalid("float"))?),
        Value::Option(Some(inner)) | Value::Newtype(inner) => {
            return convert_element_like(inner, key, element);
        }
        Value::Unit | Value::Option(None) | Value::Map(_) | Value::Seq(_) => convert_element(element),
    })
}
