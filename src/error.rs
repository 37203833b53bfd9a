use thiserror::Error;

/// Boxed cause carried by [`Error::ParserConstruction`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization: {0}")]
    Serialization(#[from] serde_value::SerializerError),

    #[error("Deserialization: {0}")]
    Deserialization(#[from] serde_value::DeserializerError),

    #[error("TOML Deserialization: {0}")]
    TomlDeserialization(#[from] toml::de::Error),

    #[error("Missing option: {0}")]
    UninitializedOption(#[from] derive_builder::UninitializedFieldError),

    /// A value failed the non-empty policy of a
    /// [`HandleEmptyValues`](crate::HandleEmptyValues) or
    /// [`NoEmptyValues`](crate::NoEmptyValues) preparer.
    ///
    /// This aborts the settings load it was raised from. Set the
    /// [`ALLOW_EMPTY_VALUES_KEY`](crate::ALLOW_EMPTY_VALUES_KEY) flag (or
    /// `allow_empty_values` in [`LoaderOptions`](crate::LoaderOptions)) to
    /// downgrade it to a warning.
    #[error("Empty value for key '{key}'; set '{flag}' to allow empty values", flag = crate::ALLOW_EMPTY_VALUES_KEY)]
    EmptyValue { key: String },

    /// The same observer instance was registered twice on one container.
    #[error("Observer is already registered")]
    DuplicateObserver,

    /// No parser implementation is registered under the requested name.
    ///
    /// The contained string is the requested name.
    #[error("Parser not registered: {0}")]
    UnknownParser(String),

    /// A registered parser failed while being constructed for an input.
    #[error("Failed to construct parser '{parser}': {source}")]
    ParserConstruction {
        parser: String,
        #[source]
        source: BoxError,
    },

    /// The package hint passed to a parser does not name a table in the
    /// parsed document.
    #[error("Package not found in input: {0}")]
    MissingPackage(String),

    /// A settings key could not be placed into the parsed object graph.
    #[error("Cannot assign setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },
}
