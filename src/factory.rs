//! Selection and construction of the active parser.
//!
//! [`DefaultParserFactory`] is built once by the application and shared by
//! reference (or `Arc`) with everything that creates parsers. It always has
//! a parser bound: the built-in [`TomlParser`](crate::TomlParser) unless an
//! alternative was selected by name.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use next_settings::{DefaultParserFactory, Parser, ParserFactory, ParserRegistry};
//!
//! let factory = DefaultParserFactory::new(ParserRegistry::collect())?;
//! assert_eq!(factory.active_parser(), "toml");
//!
//! let mut parser = factory.parser(Box::new(Cursor::new("port = 80")))?;
//! let value = parser.parse()?;
//! # let _ = value;
//!
//! // Unknown names are rejected and the previous selection stays active.
//! assert!(factory.set_parser_class("yaml").is_err());
//! assert_eq!(factory.active_parser(), "toml");
//! # Ok::<(), next_settings::error::Error>(())
//! ```
use std::env;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{
    TomlParser,
    error::Error,
    parser::{InputSource, Parser},
    registry::{FromInput, ParserConstructor, ParserName, ParserRegistry, construct},
};

/// Environment variable naming the parser to select at startup.
pub const PARSER_ENV_VAR: &str = "NEXT_SETTINGS_PARSER";

/// Produces parsers bound to an input source.
pub trait ParserFactory {
    fn parser(&self, input: InputSource) -> Result<Box<dyn Parser>, Error>;
}

/// The selected implementation: its name and constructor, always swapped
/// together.
#[derive(Clone, Copy)]
struct ParserBinding {
    name: &'static str,
    constructor: ParserConstructor,
}

pub struct DefaultParserFactory {
    registry: ParserRegistry,
    binding: RwLock<ParserBinding>,
}

impl DefaultParserFactory {
    /// Binds the built-in TOML parser.
    pub fn new(registry: ParserRegistry) -> Result<Self, Error> {
        Self::with_selection(registry, None)
    }

    /// Binds the parser registered under `selection`, or the built-in TOML
    /// parser when `selection` is `None`.
    ///
    /// The built-in parser is added to `registry` if it is missing.
    pub fn with_selection(
        mut registry: ParserRegistry,
        selection: Option<&str>,
    ) -> Result<Self, Error> {
        if !registry.contains(TomlParser::NAME) {
            registry.register::<TomlParser>();
        }

        let (name, constructor) = registry.resolve(selection.unwrap_or(TomlParser::NAME))?;
        info!(parser = name, "Selected parser");

        Ok(Self {
            registry,
            binding: RwLock::new(ParserBinding { name, constructor }),
        })
    }

    /// Like [`with_selection`](DefaultParserFactory::with_selection), reading
    /// the selection from [`PARSER_ENV_VAR`]. An unset or blank variable
    /// selects the built-in parser.
    pub fn from_env(registry: ParserRegistry) -> Result<Self, Error> {
        let selection = env::var(PARSER_ENV_VAR)
            .ok()
            .filter(|name| !name.trim().is_empty());

        Self::with_selection(registry, selection.as_deref().map(str::trim))
    }

    /// Selects the parser registered under `name` for all following
    /// [`parser`](ParserFactory::parser) calls.
    ///
    /// Fails with [`Error::UnknownParser`] without touching the current
    /// selection when nothing is registered under `name`.
    pub fn set_parser_class(&self, name: &str) -> Result<(), Error> {
        let (name, constructor) = self.registry.resolve(name)?;
        self.bind(ParserBinding { name, constructor });
        Ok(())
    }

    /// Selects `P` directly. `P` does not need to be in the registry.
    pub fn set_parser<P>(&self)
    where
        P: Parser + ParserName + FromInput + 'static,
    {
        self.bind(ParserBinding {
            name: P::NAME,
            constructor: construct::<P>,
        });
    }

    /// Name of the currently selected parser.
    pub fn active_parser(&self) -> &'static str {
        self.binding.read().name
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    fn bind(&self, binding: ParserBinding) {
        let previous = std::mem::replace(&mut *self.binding.write(), binding);
        info!(parser = binding.name, previous = previous.name, "Switched parser");
    }
}

impl ParserFactory for DefaultParserFactory {
    fn parser(&self, input: InputSource) -> Result<Box<dyn Parser>, Error> {
        let binding = *self.binding.read();
        debug!(parser = binding.name, "Constructing parser");

        (binding.constructor)(input).map_err(|err| Error::ParserConstruction {
            parser: binding.name.to_string(),
            source: Box::new(err),
        })
    }
}

impl std::fmt::Debug for DefaultParserFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultParserFactory")
            .field("active", &self.active_parser())
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, sync::Arc, thread};

    use super::*;

    struct Failing;

    impl Parser for Failing {
        fn set_package(&mut self, _package: Option<String>) {}
        fn set_settings(&mut self, _settings: Option<Arc<crate::SettingsMap>>) {}
        fn parse(&mut self) -> Result<serde_value::Value, Error> {
            Ok(serde_value::Value::Unit)
        }
    }

    impl ParserName for Failing {
        const NAME: &'static str = "failing";
    }

    impl FromInput for Failing {
        fn from_input(_input: InputSource) -> Result<Self, Error> {
            Err(Error::Io(std::io::Error::other("input closed")))
        }
    }

    fn input() -> InputSource {
        Box::new(Cursor::new(b"a = 1".to_vec()))
    }

    #[test]
    fn test_default_binding() {
        let factory = DefaultParserFactory::new(ParserRegistry::new()).unwrap();
        assert_eq!(factory.active_parser(), "toml");
        assert!(factory.parser(input()).unwrap().parse().is_ok());
    }

    #[test]
    fn test_unknown_selection_fails_at_construction() {
        let result = DefaultParserFactory::with_selection(ParserRegistry::new(), Some("nope"));
        assert!(matches!(result, Err(Error::UnknownParser(name)) if name == "nope"));
    }

    #[test]
    fn test_construction_failure_is_wrapped() {
        let factory = DefaultParserFactory::new(ParserRegistry::new()).unwrap();
        factory.set_parser::<Failing>();
        assert_eq!(factory.active_parser(), "failing");

        match factory.parser(input()) {
            Err(Error::ParserConstruction { parser, source }) => {
                assert_eq!(parser, "failing");
                assert!(source.to_string().contains("input closed"));
            }
            Err(other) => panic!("Expected ParserConstruction, got {other:?}"),
            Ok(_) => panic!("Expected ParserConstruction, got a parser"),
        }
    }

    #[test]
    fn test_concurrent_switching_keeps_binding_consistent() {
        let mut registry = ParserRegistry::new();
        registry.register::<Failing>();
        let factory = Arc::new(DefaultParserFactory::new(registry).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let factory = Arc::clone(&factory);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let name = if i % 2 == 0 { "toml" } else { "failing" };
                        factory.set_parser_class(name).unwrap();

                        match factory.parser(input()) {
                            Ok(_) => {}
                            Err(Error::ParserConstruction { parser, .. }) => {
                                assert_eq!(parser, "failing")
                            }
                            Err(other) => panic!("Unexpected error: {other:?}"),
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
