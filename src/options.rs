//! Options controlling how settings are loaded.
//!
//! Options can be built in code with [`LoaderOptionsBuilder`], read from a
//! TOML file, and overridden from the environment:
//!
//! ```toml
//! parser = "toml"
//! package = "app"
//! trim = true
//! allow_empty_values = false
//! skip_keys = ["motd"]
//! ```
use std::{env, path::Path};

use derive_builder::Builder;
use serde::Deserialize;

use crate::{error::Error, factory::PARSER_ENV_VAR};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(default, setter(into), build_fn(error = "crate::error::Error"))]
#[serde(default, deny_unknown_fields)]
pub struct LoaderOptions {
    /// Name of the parser to select; the built-in TOML parser when unset.
    #[builder(setter(into, strip_option))]
    pub parser: Option<String>,

    /// Package hint handed to the parser: a dotted table path. Everything
    /// outside it is dropped before loading, including a root-level
    /// `allow_empty_values` flag; set the flag inside the package table.
    #[builder(setter(into, strip_option))]
    pub package: Option<String>,

    /// Trim whitespace from every key and value.
    pub trim: bool,

    /// Log empty values instead of failing the load.
    pub allow_empty_values: bool,

    /// Keys exempted from trimming and from the empty-value policy.
    ///
    /// Each preparer matches against the key as it reaches it. Trimming runs
    /// first and sees the raw key; the empty-value policy sees the trimmed one.
    pub skip_keys: Vec<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            parser: None,
            package: None,
            trim: true,
            allow_empty_values: false,
            skip_keys: Vec::new(),
        }
    }
}

impl LoaderOptions {
    pub fn builder() -> LoaderOptionsBuilder {
        LoaderOptionsBuilder::default()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Replaces `parser` with the value of [`PARSER_ENV_VAR`] when it is set
    /// and not blank.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(parser) = env::var(PARSER_ENV_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            self.parser = Some(parser);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LoaderOptions::default();
        assert!(options.trim);
        assert!(!options.allow_empty_values);
        assert!(options.parser.is_none());
        assert_eq!(options, LoaderOptions::from_toml_str("").unwrap());
    }

    #[test]
    fn test_builder() {
        let options = LoaderOptions::builder()
            .parser("toml")
            .allow_empty_values(true)
            .skip_keys(vec!["motd".to_string()])
            .build()
            .unwrap();

        assert_eq!(options.parser.as_deref(), Some("toml"));
        assert!(options.allow_empty_values);
        assert!(options.trim);
        assert_eq!(options.skip_keys, vec!["motd"]);
    }

    #[test]
    fn test_from_toml() {
        let options = LoaderOptions::from_toml_str(
            r#"
package = "app"
trim = false
skip_keys = ["a", "b"]
"#,
        )
        .unwrap();

        assert_eq!(options.package.as_deref(), Some("app"));
        assert!(!options.trim);
        assert_eq!(options.skip_keys, vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_option_rejected() {
        assert!(matches!(
            LoaderOptions::from_toml_str("trimm = true"),
            Err(Error::TomlDeserialization(_))
        ));
    }
}
