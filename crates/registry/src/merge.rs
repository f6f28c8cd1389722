use apollo_compiler::ast;
use apollo_compiler::Name;
use apollo_compiler::Node;
use indexmap::IndexMap;

use crate::composite::CompositeDefinition;
use crate::error::RegistryError;
use crate::TypeRegistry;

/// Merges accumulated buckets into the final registry. Iteration follows
/// bucket insertion order so output and error ordering are deterministic.
pub(crate) fn build_registry(
    types: IndexMap<String, CompositeDefinition>,
    schema: CompositeDefinition,
) -> TypeRegistry {
    let mut registry = TypeRegistry::default();

    for (name, bucket) in types {
        let Some(mut base) = bucket.base().cloned() else {
            tracing::debug!(name, "extension-only type has no base definition, skipping");
            continue;
        };

        // Later base definitions lose their children but still contribute
        // their directives, like every other source of the name.
        for duplicate in &bucket.definitions[1..] {
            registry.errors.push(redefinition_error(&base, &name));
            extend_directives(&mut base, duplicate);
        }

        let merged = merge_type(&name, base, &bucket.extensions, &mut registry.errors);
        registry.types.insert(name, merged);
    }

    merge_schema(&schema, &mut registry);
    registry
}

fn redefinition_error(base: &ast::Definition, name: &str) -> RegistryError {
    if matches!(base, ast::Definition::DirectiveDefinition(_)) {
        RegistryError::DirectiveRedefinition {
            name: name.to_string(),
        }
    } else {
        RegistryError::TypeRedefinition {
            name: name.to_string(),
        }
    }
}

/// Appends `source`'s applied directives to `target`, whatever their kinds.
fn extend_directives(target: &mut ast::Definition, source: &ast::Definition) {
    use ast::Definition;

    let extra: Vec<Node<ast::Directive>> = match source {
        Definition::ObjectTypeDefinition(node) => node.directives.iter().cloned().collect(),
        Definition::InterfaceTypeDefinition(node) => node.directives.iter().cloned().collect(),
        Definition::InputObjectTypeDefinition(node) => node.directives.iter().cloned().collect(),
        Definition::EnumTypeDefinition(node) => node.directives.iter().cloned().collect(),
        Definition::UnionTypeDefinition(node) => node.directives.iter().cloned().collect(),
        Definition::ScalarTypeDefinition(node) => node.directives.iter().cloned().collect(),
        _ => return,
    };
    if extra.is_empty() {
        return;
    }
    match target {
        Definition::ObjectTypeDefinition(node) => node.make_mut().directives.0.extend(extra),
        Definition::InterfaceTypeDefinition(node) => node.make_mut().directives.0.extend(extra),
        Definition::InputObjectTypeDefinition(node) => node.make_mut().directives.0.extend(extra),
        Definition::EnumTypeDefinition(node) => node.make_mut().directives.0.extend(extra),
        Definition::UnionTypeDefinition(node) => node.make_mut().directives.0.extend(extra),
        Definition::ScalarTypeDefinition(node) => node.make_mut().directives.0.extend(extra),
        _ => {}
    }
}

/// Folds extensions into the authoritative base definition. Extensions whose
/// syntactic kind does not match the base are ignored.
fn merge_type(
    name: &str,
    base: ast::Definition,
    extensions: &[ast::Definition],
    errors: &mut Vec<RegistryError>,
) -> ast::Definition {
    use ast::Definition;

    match base {
        Definition::ObjectTypeDefinition(node) => {
            Definition::ObjectTypeDefinition(merge_object(name, node, extensions, errors))
        }
        Definition::InterfaceTypeDefinition(node) => {
            Definition::InterfaceTypeDefinition(merge_interface(name, node, extensions, errors))
        }
        Definition::InputObjectTypeDefinition(node) => {
            Definition::InputObjectTypeDefinition(merge_input_object(name, node, extensions, errors))
        }
        Definition::EnumTypeDefinition(node) => {
            Definition::EnumTypeDefinition(merge_enum(name, node, extensions, errors))
        }
        Definition::UnionTypeDefinition(node) => {
            Definition::UnionTypeDefinition(merge_union(name, node, extensions, errors))
        }
        Definition::ScalarTypeDefinition(node) => {
            Definition::ScalarTypeDefinition(merge_scalar(node, extensions))
        }
        // Directive definitions have no extension form.
        other => other,
    }
}

fn merge_object(
    name: &str,
    mut node: Node<ast::ObjectTypeDefinition>,
    extensions: &[ast::Definition],
    errors: &mut Vec<RegistryError>,
) -> Node<ast::ObjectTypeDefinition> {
    let def = node.make_mut();
    let mut field_names: Vec<Name> = def.fields.iter().map(|f| f.name.clone()).collect();

    for extension in extensions {
        let ast::Definition::ObjectTypeExtension(ext) = extension else {
            continue;
        };
        def.directives.0.extend(ext.directives.iter().cloned());
        for interface in &ext.implements_interfaces {
            if !def.implements_interfaces.contains(interface) {
                def.implements_interfaces.push(interface.clone());
            }
        }
        for field in &ext.fields {
            if field_names.contains(&field.name) {
                errors.push(RegistryError::MemberRedefinition {
                    name: name.to_string(),
                    member: field.name.to_string(),
                });
            } else {
                field_names.push(field.name.clone());
                def.fields.push(field.clone());
            }
        }
    }
    node
}

fn merge_interface(
    name: &str,
    mut node: Node<ast::InterfaceTypeDefinition>,
    extensions: &[ast::Definition],
    errors: &mut Vec<RegistryError>,
) -> Node<ast::InterfaceTypeDefinition> {
    let def = node.make_mut();
    let mut field_names: Vec<Name> = def.fields.iter().map(|f| f.name.clone()).collect();

    for extension in extensions {
        let ast::Definition::InterfaceTypeExtension(ext) = extension else {
            continue;
        };
        def.directives.0.extend(ext.directives.iter().cloned());
        for interface in &ext.implements_interfaces {
            if !def.implements_interfaces.contains(interface) {
                def.implements_interfaces.push(interface.clone());
            }
        }
        for field in &ext.fields {
            if field_names.contains(&field.name) {
                errors.push(RegistryError::MemberRedefinition {
                    name: name.to_string(),
                    member: field.name.to_string(),
                });
            } else {
                field_names.push(field.name.clone());
                def.fields.push(field.clone());
            }
        }
    }
    node
}

fn merge_input_object(
    name: &str,
    mut node: Node<ast::InputObjectTypeDefinition>,
    extensions: &[ast::Definition],
    errors: &mut Vec<RegistryError>,
) -> Node<ast::InputObjectTypeDefinition> {
    let def = node.make_mut();
    let mut field_names: Vec<Name> = def.fields.iter().map(|f| f.name.clone()).collect();

    for extension in extensions {
        let ast::Definition::InputObjectTypeExtension(ext) = extension else {
            continue;
        };
        def.directives.0.extend(ext.directives.iter().cloned());
        for field in &ext.fields {
            if field_names.contains(&field.name) {
                errors.push(RegistryError::MemberRedefinition {
                    name: name.to_string(),
                    member: field.name.to_string(),
                });
            } else {
                field_names.push(field.name.clone());
                def.fields.push(field.clone());
            }
        }
    }
    node
}

fn merge_enum(
    name: &str,
    mut node: Node<ast::EnumTypeDefinition>,
    extensions: &[ast::Definition],
    errors: &mut Vec<RegistryError>,
) -> Node<ast::EnumTypeDefinition> {
    let def = node.make_mut();
    let mut value_names: Vec<Name> = def.values.iter().map(|v| v.value.clone()).collect();

    for extension in extensions {
        let ast::Definition::EnumTypeExtension(ext) = extension else {
            continue;
        };
        def.directives.0.extend(ext.directives.iter().cloned());
        for value in &ext.values {
            if value_names.contains(&value.value) {
                errors.push(RegistryError::MemberRedefinition {
                    name: name.to_string(),
                    member: value.value.to_string(),
                });
            } else {
                value_names.push(value.value.clone());
                def.values.push(value.clone());
            }
        }
    }
    node
}

fn merge_union(
    name: &str,
    mut node: Node<ast::UnionTypeDefinition>,
    extensions: &[ast::Definition],
    errors: &mut Vec<RegistryError>,
) -> Node<ast::UnionTypeDefinition> {
    let def = node.make_mut();

    for extension in extensions {
        let ast::Definition::UnionTypeExtension(ext) = extension else {
            continue;
        };
        def.directives.0.extend(ext.directives.iter().cloned());
        for member in &ext.members {
            if def.members.contains(member) {
                errors.push(RegistryError::MemberRedefinition {
                    name: name.to_string(),
                    member: member.to_string(),
                });
            } else {
                def.members.push(member.clone());
            }
        }
    }
    node
}

fn merge_scalar(
    mut node: Node<ast::ScalarTypeDefinition>,
    extensions: &[ast::Definition],
) -> Node<ast::ScalarTypeDefinition> {
    let def = node.make_mut();
    for extension in extensions {
        if let ast::Definition::ScalarTypeExtension(ext) = extension {
            def.directives.0.extend(ext.directives.iter().cloned());
        }
    }
    node
}

/// Merges the implicit schema bucket: root operation mappings are gathered
/// across every `schema` definition and extension, first-wins per operation
/// kind; a second `schema` base declaration is a redefinition error.
fn merge_schema(bucket: &CompositeDefinition, registry: &mut TypeRegistry) {
    let mut bases = bucket.definitions.iter().filter_map(|definition| {
        if let ast::Definition::SchemaDefinition(node) = definition {
            Some(node)
        } else {
            None
        }
    });
    let Some(first) = bases.next() else {
        return;
    };
    for _ in bases {
        registry.errors.push(RegistryError::SchemaRedefinition);
    }

    let mut root_operations = Vec::new();
    let mut extra_directives = Vec::new();
    let mut seen: Vec<ast::OperationType> = Vec::new();

    for (index, definition) in bucket
        .definitions
        .iter()
        .chain(bucket.extensions.iter())
        .enumerate()
    {
        let (operations, directives) = match definition {
            ast::Definition::SchemaDefinition(node) => (&node.root_operations, &node.directives),
            ast::Definition::SchemaExtension(node) => (&node.root_operations, &node.directives),
            _ => continue,
        };

        for root_operation in operations {
            let (operation_type, _) = root_operation.as_ref();
            if seen.contains(operation_type) {
                registry.errors.push(RegistryError::OperationTypeRedefinition {
                    operation: operation_name(*operation_type).to_string(),
                });
            } else {
                seen.push(*operation_type);
                root_operations.push(root_operation.clone());
            }
        }

        // The first base definition's own directives come with the clone.
        if index > 0 {
            extra_directives.extend(directives.iter().cloned());
        }
    }

    let mut merged = first.clone();
    let def = merged.make_mut();
    def.root_operations = root_operations;
    def.directives.0.extend(extra_directives);
    registry.schema = Some(merged);
}

fn operation_name(operation: ast::OperationType) -> &'static str {
    match operation {
        ast::OperationType::Query => "query",
        ast::OperationType::Mutation => "mutation",
        ast::OperationType::Subscription => "subscription",
    }
}
