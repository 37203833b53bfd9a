use std::{io::Cursor, sync::Arc};

use next_settings::{
    Configurable, DefaultParserFactory, LoaderOptions, ParserRegistry, SettingsLoader,
    error::Error,
};
use serde::Deserialize;

/// A simple server configuration.
#[derive(Debug, Deserialize)]
struct ServerConfig {
    host: String,
    port: u16,
    #[serde(default)]
    max_connections: u32,
}

impl Configurable for ServerConfig {
    fn configure_defaults(&mut self) -> Result<(), Error> {
        if self.max_connections == 0 {
            self.max_connections = 100;
        }
        Ok(())
    }
}

const SETTINGS: &str = r#"
[server]
host = "  127.0.0.1 "
port = 8080
aliases = [" api ", "www"]
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build the factory once; it selects the parser named in
    // NEXT_SETTINGS_PARSER, or the built-in TOML parser.
    let factory = Arc::new(DefaultParserFactory::from_env(ParserRegistry::collect())?);
    println!("Active parser: {}", factory.active_parser());

    // Load flat settings. Keys and values are trimmed and empty values are
    // rejected before anything is stored.
    let loader = SettingsLoader::with_factory(LoaderOptions::default(), Arc::clone(&factory));
    let settings = loader.load_str(SETTINGS)?;

    println!("Loaded settings:");
    for (key, values) in &settings {
        println!("  {key} = {values:?}");
    }

    // Parse a typed object, with the loaded settings applied on top.
    let typed = SettingsLoader::with_factory(
        LoaderOptions::builder().package("server").build()?,
        Arc::clone(&factory),
    );
    let server: ServerConfig =
        typed.load_into(Box::new(Cursor::new(SETTINGS)), Some(Arc::new(settings)))?;
    println!("{:#?}", server);

    // An empty value aborts the load
    match loader.load_str("[server]\nhost = \"   \"\n") {
        Ok(_) => println!("Load succeeded"),
        Err(e) => println!("Load failed (expected): {}", e),
    }

    Ok(())
}
