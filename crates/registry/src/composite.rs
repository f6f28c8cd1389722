use apollo_compiler::ast;
use indexmap::IndexMap;

use crate::merge::build_registry;
use crate::TypeRegistry;

/// Per-name accumulator: the base (non-extension) definitions seen for a
/// name, in encounter order, plus every extension targeting it.
///
/// The first base definition is authoritative; later ones are redefinitions
/// and only contribute errors at build time. Extensions never conflict with
/// each other and are all folded in.
#[derive(Debug, Clone, Default)]
pub struct CompositeDefinition {
    pub definitions: Vec<ast::Definition>,
    pub extensions: Vec<ast::Definition>,
}

impl CompositeDefinition {
    #[must_use]
    pub fn base(&self) -> Option<&ast::Definition> {
        self.definitions.first()
    }
}

/// Accumulates type-system definitions from many parsed documents and
/// merges them into a single [`TypeRegistry`].
///
/// Buckets are keyed by type name, created lazily on first encounter, plus
/// one implicit unnamed bucket for `schema { ... }` declarations. Insertion
/// order is preserved throughout so repeated builds from the same document
/// sequence are identical.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: IndexMap<String, CompositeDefinition>,
    schema: CompositeDefinition,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports every type-system definition from a parsed document.
    /// Executable definitions (operations, fragments) are skipped.
    pub fn merge_document(&mut self, document: &ast::Document) {
        for definition in &document.definitions {
            self.add(definition.clone());
        }
    }

    /// Adds a single definition, dispatching on its syntactic kind: base
    /// definitions and extensions land in separate buckets for the same
    /// name, never ambiguously.
    pub fn add(&mut self, definition: ast::Definition) {
        use ast::Definition;

        let (name, is_extension) = match &definition {
            Definition::OperationDefinition(_) | Definition::FragmentDefinition(_) => return,
            Definition::SchemaDefinition(_) => {
                self.schema.definitions.push(definition);
                return;
            }
            Definition::SchemaExtension(_) => {
                self.schema.extensions.push(definition);
                return;
            }
            Definition::ObjectTypeExtension(node) => (node.name.to_string(), true),
            Definition::InterfaceTypeExtension(node) => (node.name.to_string(), true),
            Definition::InputObjectTypeExtension(node) => (node.name.to_string(), true),
            Definition::EnumTypeExtension(node) => (node.name.to_string(), true),
            Definition::UnionTypeExtension(node) => (node.name.to_string(), true),
            Definition::ScalarTypeExtension(node) => (node.name.to_string(), true),
            Definition::ObjectTypeDefinition(node) => (node.name.to_string(), false),
            Definition::InterfaceTypeDefinition(node) => (node.name.to_string(), false),
            Definition::InputObjectTypeDefinition(node) => (node.name.to_string(), false),
            Definition::EnumTypeDefinition(node) => (node.name.to_string(), false),
            Definition::UnionTypeDefinition(node) => (node.name.to_string(), false),
            Definition::ScalarTypeDefinition(node) => (node.name.to_string(), false),
            Definition::DirectiveDefinition(node) => (node.name.to_string(), false),
        };

        let bucket = self.bucket(&name);
        if is_extension {
            bucket.extensions.push(definition);
        } else {
            bucket.definitions.push(definition);
        }
    }

    fn bucket(&mut self, name: &str) -> &mut CompositeDefinition {
        self.types.entry(name.to_string()).or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.schema.definitions.is_empty()
            && self.schema.extensions.is_empty()
    }

    /// Merges every accumulated bucket into a final registry, collecting
    /// redefinition errors along the way.
    #[must_use]
    pub fn build(self) -> TypeRegistry {
        build_registry(self.types, self.schema)
    }
}
