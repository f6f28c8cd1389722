use graphql_config::is_config_file_name;
use graphql_env::DOT_ENV_FILE_NAMES;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Enumerates every recognized config file under `root`, honoring ignore
/// files but including hidden entries (the whole `.graphqlrc` family is
/// dotfiles). Results are sorted for deterministic reload order.
#[must_use]
pub fn find_config_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).hidden(false).build().flatten() {
        let is_file = entry.file_type().is_some_and(|file_type| file_type.is_file());
        if !is_file {
            continue;
        }
        let name_matches = entry
            .file_name()
            .to_str()
            .is_some_and(is_config_file_name);
        if name_matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}

/// Enumerates every `.env`-family file under `root`. These feed the variable
/// resolution chain, so their timestamps participate in reload staleness
/// checks alongside the config files themselves.
#[must_use]
pub fn find_dot_env_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).hidden(false).build().flatten() {
        let is_file = entry.file_type().is_some_and(|file_type| file_type.is_file());
        if !is_file {
            continue;
        }
        let name_matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| DOT_ENV_FILE_NAMES.contains(&name));
        if name_matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn finds_configs_at_any_depth() -> Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("packages").join("api");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(root.path().join(".graphqlrc.yml"), "schema: a.graphql")?;
        std::fs::write(nested.join("graphql.config.json"), "{}")?;
        std::fs::write(nested.join("unrelated.yml"), "")?;

        let files = find_config_files(root.path());
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect();
        assert_eq!(files.len(), 2);
        assert!(names.contains(&".graphqlrc.yml"));
        assert!(names.contains(&"graphql.config.json"));
        Ok(())
    }

    #[test]
    fn finds_dot_env_files_but_not_lookalikes() -> Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("app");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(root.path().join(".env"), "A=1\n")?;
        std::fs::write(nested.join(".env.local"), "B=2\n")?;
        std::fs::write(nested.join(".environment"), "C=3\n")?;

        let files = find_dot_env_files(root.path());
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&".env"));
        assert!(names.contains(&".env.local"));
        Ok(())
    }

    #[test]
    fn results_are_sorted() -> Result<()> {
        let root = tempfile::tempdir()?;
        let b = root.path().join("b");
        let a = root.path().join("a");
        std::fs::create_dir_all(&a)?;
        std::fs::create_dir_all(&b)?;
        std::fs::write(b.join(".graphqlrc"), "schema: x.graphql")?;
        std::fs::write(a.join(".graphqlrc"), "schema: y.graphql")?;

        let files = find_config_files(root.path());
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        Ok(())
    }
}
