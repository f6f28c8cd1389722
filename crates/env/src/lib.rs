//! Environment variable interpolation for GraphQL config files.
//!
//! Config files reference environment variables in two dialects:
//!
//! - modern: `${NAME}` or `${NAME:"default"}` (graphql-config)
//! - legacy: `${env:NAME}` (.graphqlconfig)
//!
//! Interpolation never fails. Malformed or unresolvable placeholders pass
//! through verbatim; a missing variable falls back to its default, then to
//! the original placeholder text.

mod interpolate;
mod resolver;
mod snapshot;

pub use interpolate::{
    contains_variables, interpolate, invalidate_parse_cache, placeholder_names, Dialect,
};
pub use resolver::{OnMissingVariable, VariableChain, VariableResolver, DOT_ENV_FILE_NAMES};
pub use snapshot::{bump_environment_version, current_environment_version, EnvironmentSnapshot};
