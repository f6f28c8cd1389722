//! Composite type registry for GraphQL schemas split across files.
//!
//! Schemas are commonly declared as fragments scattered over many files:
//! partial type definitions plus `extend` statements. This crate reassembles
//! them into one coherent registry with deterministic, first-wins conflict
//! resolution. Redefinitions are collected as structured errors, never
//! thrown, so a broken file cannot take down the whole schema.

mod composite;
mod error;
mod merge;

pub use composite::{CompositeDefinition, RegistryBuilder};
pub use error::RegistryError;

use apollo_compiler::ast;
use apollo_compiler::Node;
use indexmap::IndexMap;

/// The merged output: one final definition per type name, an optional merged
/// schema definition, and every redefinition error encountered.
///
/// `types` preserves the order names were first encountered in, so building
/// twice from the same document sequence yields identical registries.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    pub types: IndexMap<String, ast::Definition>,
    pub schema: Option<Node<ast::SchemaDefinition>>,
    pub errors: Vec<RegistryError>,
}

impl TypeRegistry {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ast::Definition> {
        self.types.get(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
