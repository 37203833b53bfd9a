//! Parser implementations registered by name.
//!
//! Parsers are registered at link time with [`submit_parser!`] or
//! `#[derive(ParserPlugin)]`, and collected into a [`ParserRegistry`] when
//! the application builds its factory. Registries can also be filled by hand.
use std::{collections::HashMap, fmt};

use tracing::{debug, warn};

use crate::{
    error::Error,
    parser::{InputSource, Parser},
};

/// Builds a parser bound to an input source.
pub type ParserConstructor = fn(InputSource) -> Result<Box<dyn Parser>, Error>;

/// The name a parser implementation is selected by.
pub trait ParserName {
    const NAME: &'static str;
}

/// The single-input-source constructor every selectable parser provides.
pub trait FromInput: Sized {
    fn from_input(input: InputSource) -> Result<Self, Error>;
}

pub(crate) fn construct<P>(input: InputSource) -> Result<Box<dyn Parser>, Error>
where
    P: Parser + FromInput + 'static,
{
    Ok(Box::new(P::from_input(input)?))
}

/// A link-time parser registration.
pub struct RegisteredParser {
    pub name: fn() -> &'static str,
    pub constructor: ParserConstructor,
}

impl RegisteredParser {
    pub const fn new<P>() -> Self
    where
        P: Parser + ParserName + FromInput + 'static,
    {
        Self {
            name: || P::NAME,
            constructor: construct::<P>,
        }
    }
}

inventory::collect!(RegisteredParser);

#[macro_export]
macro_rules! submit_parser {
    ($parser_type:ty) => {
        $crate::inventory::submit! {
            $crate::RegisteredParser::new::<$parser_type>()
        }
    };
}

/// Maps parser names to their constructors.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    constructors: HashMap<&'static str, ParserConstructor>,
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every parser registered with [`submit_parser!`]
    /// or `#[derive(ParserPlugin)]`.
    ///
    /// When two registrations share a name the first one collected wins.
    pub fn collect() -> Self {
        let mut registry = Self::new();

        for registration in inventory::iter::<RegisteredParser> {
            let name = (registration.name)();
            if registry.constructors.contains_key(name) {
                warn!(parser = name, "Ignoring duplicate parser registration");
                continue;
            }

            registry.constructors.insert(name, registration.constructor);
        }

        debug!(parsers = registry.constructors.len(), "Collected parser registrations");
        registry
    }

    /// Registers `P` under its [`ParserName`], replacing any previous entry.
    pub fn register<P>(&mut self) -> &mut Self
    where
        P: Parser + ParserName + FromInput + 'static,
    {
        self.register_fn(P::NAME, construct::<P>)
    }

    /// Registers a constructor under `name`, replacing any previous entry.
    pub fn register_fn(&mut self, name: &'static str, constructor: ParserConstructor) -> &mut Self {
        if self.constructors.insert(name, constructor).is_some() {
            debug!(parser = name, "Replaced parser registration");
        }
        self
    }

    /// Looks up the constructor registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<(&'static str, ParserConstructor), Error> {
        self.constructors
            .get_key_value(name)
            .map(|(name, constructor)| (*name, *constructor))
            .ok_or_else(|| Error::UnknownParser(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.constructors.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parsers", &self.names())
            .finish()
    }
}
