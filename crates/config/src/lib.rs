//! Raw GraphQL configuration model and loader.
//!
//! This crate owns the schema-faithful representation of a graphql-config
//! file (`.graphqlrc`, `graphql.config.*` and the legacy `.graphqlconfig`
//! family): deserialization from YAML/JSON, the recognized-filename priority
//! list, and glob matching with graphql-config semantics.
//!
//! The raw model deliberately preserves "not specified" (`None`) versus
//! "specified as empty" (`Some(vec![])`) so that root/project inheritance can
//! be resolved faithfully by higher layers.

mod error;
mod loader;
mod matching;
mod raw;

pub use error::{ConfigError, Result};
pub use loader::{
    find_config_file_in_directory, is_config_file_name, is_legacy_config_file_name,
    load_raw_config, parse_raw_config, CONFIG_FILE_NAMES, LEGACY_CONFIG_FILE_NAMES,
    MODERN_CONFIG_FILE_NAMES,
};
pub use matching::{clear_match_cache, matches};
pub use raw::{
    ExtensionsMap, Patterns, RawConfig, RawProjectConfig, RemoteSchemaPointer, SchemaPointer,
    SchemaPointers,
};
