use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` file names tried in each directory, highest priority first.
pub const DOT_ENV_FILE_NAMES: &[&str] = &[
    ".env.local",
    ".env.development.local",
    ".env.development",
    ".env.dev.local",
    ".env.dev",
    ".env",
];

/// Source of variable values. A blank value counts as absent so that the
/// next step in a resolution chain gets a chance.
pub trait VariableResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> VariableResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Callback invoked when no other step resolves a variable. Hosts plug an
/// interactive prompt in here; headless callers leave it unset.
pub type OnMissingVariable = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// The standard resolution chain, tried in order, first non-blank value wins:
///
/// 1. explicit overrides set via [`VariableChain::with_override`]
/// 2. `.env` files, walking from `dir` up to (and including) `root`, trying
///    [`DOT_ENV_FILE_NAMES`] in order within each directory
/// 3. the process environment
/// 4. the optional missing-variable callback
pub struct VariableChain {
    dir: PathBuf,
    root: PathBuf,
    overrides: HashMap<String, String>,
    on_missing: Option<OnMissingVariable>,
}

impl std::fmt::Debug for VariableChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableChain")
            .field("dir", &self.dir)
            .field("root", &self.root)
            .field("overrides", &self.overrides.keys())
            .field("has_on_missing", &self.on_missing.is_some())
            .finish()
    }
}

impl VariableChain {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            root: root.into(),
            overrides: HashMap::new(),
            on_missing: None,
        }
    }

    #[must_use]
    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    #[must_use]
    pub fn with_on_missing(mut self, on_missing: OnMissingVariable) -> Self {
        self.on_missing = Some(on_missing);
        self
    }

    fn resolve_from_dot_env(&self, name: &str) -> Option<String> {
        for dir in walk_up(&self.dir, &self.root) {
            for file_name in DOT_ENV_FILE_NAMES {
                let path = dir.join(file_name);
                if !path.is_file() {
                    continue;
                }
                let Ok(entries) = dotenvy::from_path_iter(&path) else {
                    tracing::debug!(path = %path.display(), "skipping unreadable .env file");
                    continue;
                };
                for entry in entries {
                    let Ok((key, value)) = entry else { continue };
                    if key != name {
                        continue;
                    }
                    // A blank definition does not end the walk; the next
                    // file or chain link still gets a chance.
                    if let Some(resolved) = non_blank(value) {
                        return Some(resolved);
                    }
                }
            }
        }
        None
    }
}

impl VariableResolver for VariableChain {
    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(name).cloned().and_then(non_blank) {
            return Some(value);
        }
        if let Some(value) = self.resolve_from_dot_env(name) {
            return Some(value);
        }
        if let Some(value) = std::env::var(name).ok().and_then(non_blank) {
            return Some(value);
        }
        self.on_missing
            .as_ref()
            .and_then(|callback| callback(name))
            .and_then(non_blank)
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Directories from `dir` up to `root`, inclusive. Empty when `dir` is not
/// under `root`.
fn walk_up<'a>(dir: &'a Path, root: &'a Path) -> Vec<&'a Path> {
    let mut dirs = Vec::new();
    let mut current = dir;
    loop {
        if !current.starts_with(root) {
            break;
        }
        dirs.push(current);
        if current == root {
            break;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::{interpolate, Dialect};
    use anyhow::Result;

    #[test]
    fn override_beats_dot_env() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".env"), "TOKEN=from_file\n")?;

        let chain =
            VariableChain::new(dir.path(), dir.path()).with_override("TOKEN", "from_override");
        assert_eq!(chain.resolve("TOKEN"), Some("from_override".to_string()));
        Ok(())
    }

    #[test]
    fn dot_env_file_priority_within_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".env"), "WHICH=plain\n")?;
        std::fs::write(dir.path().join(".env.local"), "WHICH=local\n")?;

        let chain = VariableChain::new(dir.path(), dir.path());
        assert_eq!(chain.resolve("WHICH"), Some("local".to_string()));
        Ok(())
    }

    #[test]
    fn walks_up_to_root_for_dot_env() -> Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("packages").join("web");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(root.path().join(".env"), "AT_ROOT=yes\n")?;

        let chain = VariableChain::new(&nested, root.path());
        assert_eq!(chain.resolve("AT_ROOT"), Some("yes".to_string()));
        Ok(())
    }

    #[test]
    fn does_not_read_dot_env_above_root() -> Result<()> {
        let outer = tempfile::tempdir()?;
        let root = outer.path().join("project");
        std::fs::create_dir_all(&root)?;
        std::fs::write(outer.path().join(".env"), "OUTSIDE=leaked\n")?;

        let chain = VariableChain::new(&root, &root);
        assert_eq!(chain.resolve("OUTSIDE"), None);
        Ok(())
    }

    #[test]
    fn blank_values_fall_through() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".env.local"), "TOKEN=\n")?;
        std::fs::write(dir.path().join(".env"), "TOKEN=fallback\n")?;

        let chain = VariableChain::new(dir.path(), dir.path()).with_override("TOKEN", "  ");
        assert_eq!(chain.resolve("TOKEN"), Some("fallback".to_string()));
        Ok(())
    }

    #[test]
    fn on_missing_is_the_last_resort() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let chain = VariableChain::new(dir.path(), dir.path())
            .with_on_missing(Box::new(|name| Some(format!("prompted:{name}"))));
        assert_eq!(
            chain.resolve("NOWHERE_ELSE"),
            Some("prompted:NOWHERE_ELSE".to_string())
        );
        Ok(())
    }

    #[test]
    fn chain_plugs_into_interpolation() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".env"), "API_URL=https://api.example.com\n")?;

        let chain = VariableChain::new(dir.path(), dir.path());
        assert_eq!(
            interpolate("${API_URL}/graphql", Dialect::Modern, &chain),
            "https://api.example.com/graphql"
        );
        Ok(())
    }
}
