//! Integration tests for parser registration and selection.

use std::{
    collections::BTreeMap,
    io::{Cursor, Read},
    sync::Arc,
};

use next_settings::{
    DefaultParserFactory, FromInput, InputSource, PARSER_ENV_VAR, Parser, ParserExt,
    ParserFactory, ParserName, ParserPlugin, ParserRegistry, SettingsMap, TomlParser,
    error::Error, parser::apply_settings,
};
use serde::Deserialize;
use serde_value::Value;

/// Parses `key = value` lines into a flat table.
#[derive(ParserPlugin)]
#[parser(name = "lines")]
struct LinesParser {
    input: InputSource,
    settings: Option<Arc<SettingsMap>>,
}

impl FromInput for LinesParser {
    fn from_input(input: InputSource) -> Result<Self, Error> {
        Ok(Self {
            input,
            settings: None,
        })
    }
}

impl Parser for LinesParser {
    fn set_package(&mut self, _package: Option<String>) {}

    fn set_settings(&mut self, settings: Option<Arc<SettingsMap>>) {
        self.settings = settings;
    }

    fn parse(&mut self) -> Result<Value, Error> {
        let mut contents = String::new();
        self.input.read_to_string(&mut contents)?;

        let mut map = BTreeMap::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            map.insert(
                Value::String(key.trim().to_string()),
                Value::String(value.trim().to_string()),
            );
        }

        let mut root = Value::Map(map);
        if let Some(settings) = &self.settings {
            apply_settings(&mut root, settings, None)?;
        }
        Ok(root)
    }
}

/// Implements the parser capability but is never registered.
struct Unregistered;

impl Parser for Unregistered {
    fn set_package(&mut self, _package: Option<String>) {}
    fn set_settings(&mut self, _settings: Option<Arc<SettingsMap>>) {}
    fn parse(&mut self) -> Result<Value, Error> {
        Ok(Value::Map(BTreeMap::new()))
    }
}

impl ParserName for Unregistered {
    const NAME: &'static str = "unregistered";
}

impl FromInput for Unregistered {
    fn from_input(_input: InputSource) -> Result<Self, Error> {
        Ok(Self)
    }
}

#[derive(Debug, Deserialize)]
struct Greeting {
    greeting: String,
    target: String,
}

fn input(text: &str) -> InputSource {
    Box::new(Cursor::new(text.to_string()))
}

#[test]
fn test_default_factory_uses_toml() {
    let factory = DefaultParserFactory::new(ParserRegistry::collect()).unwrap();
    assert_eq!(factory.active_parser(), TomlParser::NAME);

    let mut parser = factory
        .parser(input("greeting = \"hi\"\ntarget = \"world\""))
        .unwrap();
    let greeting: Greeting = parser.parse_into().unwrap();

    assert_eq!(greeting.greeting, "hi");
    assert_eq!(greeting.target, "world");
}

#[test]
fn test_derived_parser_is_collected() {
    let registry = ParserRegistry::collect();

    assert!(registry.contains("lines"));
    assert!(registry.contains("toml"));
    assert!(!registry.contains(Unregistered::NAME));
}

#[test]
fn test_select_parser_by_name() {
    let factory = DefaultParserFactory::new(ParserRegistry::collect()).unwrap();
    factory.set_parser_class("lines").unwrap();
    assert_eq!(factory.active_parser(), "lines");

    let mut parser = factory.parser(input("greeting = hello\ntarget=you\n")).unwrap();
    let greeting: Greeting = parser.parse_into().unwrap();

    assert_eq!(greeting.greeting, "hello");
    assert_eq!(greeting.target, "you");
}

#[test]
fn test_startup_selection() {
    let factory =
        DefaultParserFactory::with_selection(ParserRegistry::collect(), Some("lines")).unwrap();
    assert_eq!(factory.active_parser(), "lines");
}

#[test]
fn test_failed_switch_keeps_previous_selection() {
    let factory = DefaultParserFactory::new(ParserRegistry::collect()).unwrap();
    factory.set_parser_class("lines").unwrap();

    let result = factory.set_parser_class(Unregistered::NAME);
    assert!(matches!(result, Err(Error::UnknownParser(name)) if name == "unregistered"));
    assert_eq!(factory.active_parser(), "lines");

    let value = factory.parser(input("a = b")).unwrap().parse().unwrap();
    assert_eq!(
        value,
        Value::Map(BTreeMap::from([(
            Value::String("a".into()),
            Value::String("b".into())
        )]))
    );
}

#[test]
fn test_select_unregistered_type_directly() {
    let factory = DefaultParserFactory::new(ParserRegistry::new()).unwrap();
    factory.set_parser::<Unregistered>();

    assert_eq!(factory.active_parser(), "unregistered");
    assert_eq!(
        factory.parser(input("ignored")).unwrap().parse().unwrap(),
        Value::Map(BTreeMap::new())
    );
}

#[test]
fn test_settings_reach_selected_parser() {
    let factory = DefaultParserFactory::new(ParserRegistry::collect()).unwrap();
    factory.set_parser_class("lines").unwrap();

    let mut settings = SettingsMap::new();
    settings.put_str("target", "everyone").unwrap();

    let mut parser = factory.parser(input("greeting = hey\ntarget = nobody")).unwrap();
    parser.set_settings(Some(Arc::new(settings)));
    let greeting: Greeting = parser.parse_into().unwrap();

    assert_eq!(greeting.target, "everyone");
}

#[test]
fn test_selection_from_environment() {
    // Only test in this binary touching the variable.
    unsafe { std::env::set_var(PARSER_ENV_VAR, " lines ") };
    let factory = DefaultParserFactory::from_env(ParserRegistry::collect());

    unsafe { std::env::set_var(PARSER_ENV_VAR, "missing") };
    let missing = DefaultParserFactory::from_env(ParserRegistry::collect());

    unsafe { std::env::remove_var(PARSER_ENV_VAR) };
    let unset = DefaultParserFactory::from_env(ParserRegistry::collect());

    assert_eq!(factory.unwrap().active_parser(), "lines");
    assert!(matches!(missing, Err(Error::UnknownParser(name)) if name == "missing"));
    assert_eq!(unset.unwrap().active_parser(), "toml");
}
