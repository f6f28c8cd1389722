//! GraphQL project resolution.
//!
//! Ties the raw config model, environment interpolation and the composite
//! type registry together into the read API consumers actually use:
//!
//! - [`ConfigProvider`] discovers config files under a root, caches parsed
//!   [`Config`]s keyed by modification timestamps, and reloads (debounced)
//!   when the file system changes
//! - [`Config`] / [`ProjectConfig`] answer "which project owns this file"
//!   via glob-based file-set matching
//! - [`SchemaSnapshots`] caches merged type registries per project,
//!   invalidated by the provider's generation counter

mod config;
mod discovery;
mod endpoints;
mod error;
mod project;
mod provider;
mod schema;
mod watch;

pub use config::Config;
pub use discovery::{find_config_files, find_dot_env_files};
pub use endpoints::ConfigEndpoint;
pub use error::{ProjectError, Result};
pub use project::{MatchOutcome, ProjectConfig};
pub use provider::{
    ConfigProvider, DocumentFlusher, MissingVariableHook, NoopFlusher, ReloadPolicy,
};
pub use schema::{build_schema_snapshot, collect_schema_sources, SchemaSnapshot, SchemaSnapshots};
pub use watch::ConfigWatcher;

/// Name given to the implicit project of a config file that declares no
/// named sub-projects.
pub const DEFAULT_PROJECT_NAME: &str = "default";
