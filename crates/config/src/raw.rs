use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tool-specific extensions payload. graphql-config leaves this map
/// schema-free by design; consumers (e.g. the `endpoints` entry) parse
/// sub-shapes out of it at their own risk.
pub type ExtensionsMap = HashMap<String, serde_json::Value>;

/// The deserialized, schema-faithful contents of a config file.
///
/// Root-level pointers double as the single unnamed project when no
/// `projects` map is declared, and as inheritable defaults for every named
/// project otherwise. All fields are optional so that "not specified"
/// stays distinguishable from "specified as empty".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaPointers>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Patterns>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Patterns>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Patterns>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ExtensionsMap>,

    /// Named sub-projects, in declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<IndexMap<String, RawProjectConfig>>,
}

/// One named project inside a multi-project config file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaPointers>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Patterns>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Patterns>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Patterns>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ExtensionsMap>,
}

/// Schema pointer(s): a single pointer or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaPointers {
    Single(SchemaPointer),
    Multiple(Vec<SchemaPointer>),
}

impl SchemaPointers {
    /// All pointers as a slice-like vec, regardless of the declared shape.
    #[must_use]
    pub fn pointers(&self) -> Vec<&SchemaPointer> {
        match self {
            Self::Single(pointer) => vec![pointer],
            Self::Multiple(pointers) => pointers.iter().collect(),
        }
    }
}

/// A single schema pointer: either a remote endpoint declaration or a local
/// path/glob. Both shapes may still contain unexpanded `${...}` placeholders;
/// remote-vs-local is decided post-interpolation via [`SchemaPointer::looks_remote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaPointer {
    Remote(RemoteSchemaPointer),
    Path(String),
}

/// Remote endpoint shape of a schema pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSchemaPointer {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub introspect: Option<bool>,
}

impl SchemaPointer {
    /// The raw (uninterpolated) pointer text: the URL for remote pointers,
    /// the path/glob for local ones.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        match self {
            Self::Remote(remote) => &remote.url,
            Self::Path(path) => path,
        }
    }

    /// Whether an (already interpolated) pointer string denotes a remote
    /// endpoint rather than a local path, by URL-scheme sniffing.
    #[must_use]
    pub fn looks_remote(text: &str) -> bool {
        text.starts_with("http://")
            || text.starts_with("https://")
            || text.starts_with("ws://")
            || text.starts_with("wss://")
    }
}

/// Glob pattern(s): a single pattern or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    Single(String),
    Multiple(Vec<String>),
}

impl Patterns {
    /// All patterns, regardless of the declared shape.
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Single(pattern) => vec![pattern.as_str()],
            Self::Multiple(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }

    /// True for an explicitly empty list (`[]`), which is distinct from an
    /// absent field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Multiple(patterns) if patterns.is_empty())
    }
}
