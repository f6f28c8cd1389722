use crate::resolver::VariableResolver;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static ENVIRONMENT_VERSION: AtomicU64 = AtomicU64::new(0);

/// Bumps the global environment version. Called whenever variable values may
/// have changed (config reload, override update), so that readers holding a
/// snapshot can tell it is out of date.
pub fn bump_environment_version() -> u64 {
    ENVIRONMENT_VERSION.fetch_add(1, Ordering::SeqCst) + 1
}

#[must_use]
pub fn current_environment_version() -> u64 {
    ENVIRONMENT_VERSION.load(Ordering::SeqCst)
}

/// An immutable point-in-time capture of variable name to resolved value.
///
/// Interpolation results derived from a snapshot stay valid exactly as long
/// as [`EnvironmentSnapshot::is_current`] holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    version: u64,
    variables: HashMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Captures the given variable names through `resolver` at the current
    /// environment version. Unresolved names are simply absent.
    pub fn capture<R, I, S>(names: I, resolver: &R) -> Self
    where
        R: VariableResolver + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut variables = HashMap::new();
        for name in names {
            let name = name.as_ref();
            if let Some(value) = resolver.resolve(name) {
                variables.insert(name.to_string(), value);
            }
        }
        Self {
            version: current_environment_version(),
            variables,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: current_environment_version(),
            variables: HashMap::new(),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether this snapshot still reflects the current environment.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.version == current_environment_version()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl VariableResolver for EnvironmentSnapshot {
    fn resolve(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }
}
