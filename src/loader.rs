//! Loading settings from raw input.
//!
//! [`SettingsLoader`] ties the pieces together: it asks the parser factory
//! for a parser, flattens the parsed object graph into dotted keys and
//! stores every pair in a [`SettingsMap`] prepared by the configured
//! preparers. A load either stores every pair or fails as a whole.
//!
//! # Example
//!
//! ```rust
//! use next_settings::{LoaderOptions, SettingsLoader};
//!
//! let loader = SettingsLoader::new(LoaderOptions::default())?;
//! let settings = loader.load_str(r#"
//! name = "  demo  "
//! [server]
//! hosts = ["a", "b"]
//! "#)?;
//!
//! assert_eq!(settings.first("name"), Some("demo"));
//! assert_eq!(settings.get("server.hosts").and_then(|v| v.as_ref()).map(Vec::len), Some(2));
//! # Ok::<(), next_settings::error::Error>(())
//! ```
use std::{collections::HashSet, fs::File, io::Cursor, path::Path, sync::Arc};

use serde::de::DeserializeOwned;
use serde_value::Value;
use tracing::{debug, info};

use crate::{
    ALLOW_EMPTY_VALUES_KEY, HandleEmptyValues, KeyValueObservable, SettingPair, SettingsMap,
    SkipKeys, TrimKeyValue,
    error::Error,
    factory::{DefaultParserFactory, ParserFactory},
    options::LoaderOptions,
    parser::{Configurable, InputSource, ParserExt},
    registry::ParserRegistry,
    settings::is_truthy,
};

#[derive(Debug)]
pub struct SettingsLoader {
    options: LoaderOptions,
    factory: Arc<DefaultParserFactory>,
}

impl SettingsLoader {
    /// Builds a loader with its own factory over every registered parser,
    /// selecting `options.parser` if set.
    pub fn new(options: LoaderOptions) -> Result<Self, Error> {
        let factory =
            DefaultParserFactory::with_selection(ParserRegistry::collect(), options.parser.as_deref())?;

        Ok(Self {
            options,
            factory: Arc::new(factory),
        })
    }

    /// Builds a loader sharing `factory`. `options.parser` is ignored; the
    /// factory's current selection is used.
    pub fn with_factory(options: LoaderOptions, factory: Arc<DefaultParserFactory>) -> Self {
        Self { options, factory }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn factory(&self) -> &Arc<DefaultParserFactory> {
        &self.factory
    }

    /// Parses `input` and stores every value as a prepared setting.
    ///
    /// Fails with [`Error::InvalidSetting`] when two document entries flatten
    /// to the same dotted key, such as the quoted key `"a.b"` next to a table
    /// `[a]` holding `b`. The reserved [`ALLOW_EMPTY_VALUES_KEY`] flag is only
    /// seen inside the configured package.
    pub fn load(&self, input: InputSource) -> Result<SettingsMap, Error> {
        let mut parser = self.factory.parser(input)?;
        parser.set_package(self.options.package.clone());
        let root = parser.parse()?;

        let mut pairs = Vec::new();
        flatten(&root, String::new(), &mut pairs);

        let mut seen = HashSet::new();
        if let Some(pair) = pairs.iter().find(|pair| !seen.insert(pair.key.as_str())) {
            return Err(Error::InvalidSetting {
                key: pair.key.clone(),
                reason: "duplicate key after flattening".to_string(),
            });
        }

        let allow_empty = self.options.allow_empty_values
            || pairs.iter().any(|pair| {
                pair.key == ALLOW_EMPTY_VALUES_KEY
                    && pair
                        .value
                        .as_ref()
                        .and_then(|v| v.first())
                        .and_then(Option::as_deref)
                        .is_some_and(is_truthy)
            });

        let mut settings = self.prepared_map(allow_empty)?;
        for pair in pairs {
            settings.put_pair(pair)?;
        }

        info!(
            settings = settings.len(),
            parser = self.factory.active_parser(),
            "Loaded settings"
        );
        Ok(settings)
    }

    pub fn load_str(&self, contents: &str) -> Result<SettingsMap, Error> {
        self.load(Box::new(Cursor::new(contents.to_string())))
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<SettingsMap, Error> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading settings file");
        self.load(Box::new(File::open(path)?))
    }

    /// Parses `input` straight into `T`, applying `settings` on top of the
    /// document before deserializing.
    pub fn load_into<T>(&self, input: InputSource, settings: Option<Arc<SettingsMap>>) -> Result<T, Error>
    where
        T: DeserializeOwned + Configurable,
    {
        let mut parser = self.factory.parser(input)?;
        parser.set_package(self.options.package.clone());
        parser.set_settings(settings);
        parser.parse_configured()
    }

    fn prepared_map(&self, allow_empty: bool) -> Result<SettingsMap, Error> {
        let skip_keys = self.options.skip_keys.iter().cloned();
        let mut settings = SettingsMap::new();

        if self.options.trim {
            settings.add_observer(Arc::new(TrimKeyValue::<String>::new().skip_keys(skip_keys.clone())))?;
        }
        settings.add_observer(Arc::new(
            HandleEmptyValues::<String>::new(allow_empty).skip_keys(skip_keys),
        ))?;

        Ok(settings)
    }
}

/// Flattens `value` into dotted-key pairs.
///
/// Tables recurse with `key.child`. Sequences of scalars become one
/// multi-value; sequences holding tables or sequences recurse with the
/// element index as segment.
fn flatten(value: &Value, prefix: String, out: &mut Vec<SettingPair>) {
    match value {
        Value::Map(map) => {
            if map.is_empty() && !prefix.is_empty() {
                out.push(SettingPair::new(prefix, Some(Vec::new())));
                return;
            }

            for (key, child) in map {
                let Some(segment) = scalar(key) else {
                    continue;
                };
                flatten(child, join(&prefix, &segment), out);
            }
        }
        Value::Seq(items) if items.iter().any(is_nested) => {
            for (index, item) in items.iter().enumerate() {
                flatten(item, join(&prefix, &index.to_string()), out);
            }
        }
        Value::Seq(items) => {
            out.push(SettingPair::new(prefix, Some(items.iter().map(scalar).collect())));
        }
        Value::Option(Some(inner)) | Value::Newtype(inner) => flatten(inner, prefix, out),
        other => out.push(SettingPair::new(prefix, Some(vec![scalar(other)]))),
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn is_nested(value: &Value) -> bool {
    match value {
        Value::Map(_) | Value::Seq(_) => true,
        Value::Option(Some(inner)) | Value::Newtype(inner) => is_nested(inner),
        _ => false,
    }
}

fn scalar(value: &Value) -> Option<String> {
    Some(match value {
        Value::Bool(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Char(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
        Value::Option(Some(inner)) | Value::Newtype(inner) => return scalar(inner),
        Value::Unit | Value::Option(None) | Value::Map(_) | Value::Seq(_) => return None,
    })
}
