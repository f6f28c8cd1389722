use thiserror::Error;

/// Structured redefinition errors collected while building a registry.
///
/// These are never fatal: the first declaration always wins and the build
/// continues; errors attach to the finished registry for downstream
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("schema is defined more than once")]
    SchemaRedefinition,

    #[error("duplicate {operation} root operation type")]
    OperationTypeRedefinition { operation: String },

    #[error("directive @{name} is defined more than once")]
    DirectiveRedefinition { name: String },

    #[error("type {name} is defined more than once")]
    TypeRedefinition { name: String },

    #[error("duplicate member {member} on type {name}")]
    MemberRedefinition { name: String, member: String },
}

impl RegistryError {
    /// Stable machine-readable code for diagnostics consumers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaRedefinition => "schema-redefinition",
            Self::OperationTypeRedefinition { .. } => "operation-type-redefinition",
            Self::DirectiveRedefinition { .. } => "directive-redefinition",
            Self::TypeRedefinition { .. } => "type-redefinition",
            Self::MemberRedefinition { .. } => "member-redefinition",
        }
    }
}
