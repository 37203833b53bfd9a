pub mod empty;
pub mod error;
pub mod factory;
pub mod key_value;
pub mod loader;
pub mod observable;
pub mod options;
pub mod parser;
pub mod prepare;
pub mod registry;
pub mod settings;
pub mod toml_parser;
pub mod trim;

pub use empty::{ALLOW_EMPTY_VALUES_KEY, HandleEmptyValues, NoEmptyValues};
pub use error::Error;
pub use factory::{DefaultParserFactory, PARSER_ENV_VAR, ParserFactory};
pub use key_value::{EmptyValue, KeyValue, SettingPair, Trim, Values};
pub use loader::SettingsLoader;
pub use observable::{KeyValueObservable, Observer, ObserverList};
pub use options::{LoaderOptions, LoaderOptionsBuilder};
pub use parser::{Configurable, InputSource, Parser, ParserExt};
pub use prepare::{PrepareKeyValue, SkipKeys, SkipSet};
pub use registry::{FromInput, ParserConstructor, ParserName, ParserRegistry, RegisteredParser};
pub use settings::SettingsMap;
pub use toml_parser::TomlParser;
pub use trim::TrimKeyValue;

// re-export derive macro
pub use next_settings_macros::ParserPlugin;

#[doc(hidden)]
pub use inventory;
