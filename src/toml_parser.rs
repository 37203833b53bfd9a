use std::{collections::BTreeMap, fmt, io::Read, sync::Arc};

use serde_value::Value;
use tracing::debug;

use crate::{
    SettingsMap,
    error::Error,
    parser::{InputSource, Parser, apply_settings},
    registry::{FromInput, ParserName},
    submit_parser,
};

/// The built-in parser: reads a TOML document into an object graph.
///
/// The package hint selects a nested table by dotted path, e.g. `"app.db"`
/// parses only the `[app.db]` table.
pub struct TomlParser {
    input: InputSource,
    package: Option<String>,
    settings: Option<Arc<SettingsMap>>,
}

impl TomlParser {
    pub fn new(input: InputSource) -> Self {
        Self {
            input,
            package: None,
            settings: None,
        }
    }

    fn select_package(root: Value, package: &str) -> Result<Value, Error> {
        let mut current = root;

        for segment in package.split('.') {
            let Value::Map(mut map) = current else {
                return Err(Error::MissingPackage(package.to_string()));
            };

            current = map
                .remove(&Value::String(segment.to_string()))
                .ok_or_else(|| Error::MissingPackage(package.to_string()))?;
        }

        match current {
            Value::Map(_) => Ok(current),
            _ => Err(Error::MissingPackage(package.to_string())),
        }
    }
}

impl fmt::Debug for TomlParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TomlParser")
            .field("package", &self.package)
            .field("settings", &self.settings.as_ref().map(|s| s.len()))
            .finish_non_exhaustive()
    }
}

impl ParserName for TomlParser {
    const NAME: &'static str = "toml";
}

impl FromInput for TomlParser {
    fn from_input(input: InputSource) -> Result<Self, Error> {
        Ok(Self::new(input))
    }
}

impl Parser for TomlParser {
    fn set_package(&mut self, package: Option<String>) {
        self.package = package.filter(|p| !p.is_empty());
    }

    fn set_settings(&mut self, settings: Option<Arc<SettingsMap>>) {
        self.settings = settings;
    }

    fn parse(&mut self) -> Result<Value, Error> {
        let mut contents = String::new();
        self.input.read_to_string(&mut contents)?;

        let mut root = if contents.trim().is_empty() {
            Value::Map(BTreeMap::new())
        } else {
            toml::from_str::<Value>(&contents)?
        };

        if let Some(package) = &self.package {
            root = Self::select_package(root, package)?;
        }

        if let Some(settings) = &self.settings {
            apply_settings(&mut root, settings, self.package.as_deref())?;
        }

        debug!(package = ?self.package, "Parsed TOML input");
        Ok(root)
    }
}

submit_parser!(TomlParser);
