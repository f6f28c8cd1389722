use crate::error::{ConfigError, Result};
use crate::raw::RawConfig;
use std::path::{Path, PathBuf};

/// Modern config file names, highest priority first.
pub const MODERN_CONFIG_FILE_NAMES: &[&str] = &[
    ".graphqlrc",
    ".graphqlrc.json",
    ".graphqlrc.yml",
    ".graphqlrc.yaml",
    "graphql.config.json",
    "graphql.config.yaml",
    "graphql.config.yml",
];

/// Legacy config file names, highest priority first. Always lower priority
/// than every modern name within the same directory.
pub const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[
    ".graphqlconfig",
    ".graphqlconfig.json",
    ".graphqlconfig.yml",
    ".graphqlconfig.yaml",
];

/// Every recognized config file name, in same-directory priority order
/// (modern names before legacy ones).
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".graphqlrc",
    ".graphqlrc.json",
    ".graphqlrc.yml",
    ".graphqlrc.yaml",
    "graphql.config.json",
    "graphql.config.yaml",
    "graphql.config.yml",
    ".graphqlconfig",
    ".graphqlconfig.json",
    ".graphqlconfig.yml",
    ".graphqlconfig.yaml",
];

/// Whether a file name is a recognized config file name (exact match, no
/// prefix or suffix tolerance).
#[must_use]
pub fn is_config_file_name(name: &str) -> bool {
    CONFIG_FILE_NAMES.contains(&name)
}

/// Whether a file name belongs to the legacy `.graphqlconfig` family.
#[must_use]
pub fn is_legacy_config_file_name(name: &str) -> bool {
    LEGACY_CONFIG_FILE_NAMES.contains(&name)
}

/// Finds the highest-priority config file directly in `dir`, if any.
///
/// Only regular files count; a directory named `.graphqlrc` is ignored.
#[must_use]
pub fn find_config_file_in_directory(dir: &Path) -> Option<PathBuf> {
    for name in CONFIG_FILE_NAMES {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Reads and parses a config file from disk.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_raw_config(path: &Path) -> Result<RawConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_raw_config(path, &text)
}

/// Parses config file contents, picking the format from the file name.
///
/// `.json` files must be JSON; `.yml`/`.yaml` files must be YAML; the
/// extensionless `.graphqlrc` and `.graphqlconfig` accept either (YAML is
/// tried first since it is a superset of most JSON documents in practice).
pub fn parse_raw_config(path: &Path, text: &str) -> Result<RawConfig> {
    let file_name = path.file_name().and_then(|name| name.to_str());
    match file_name {
        Some(name) if name.ends_with(".json") => {
            serde_json::from_str(text).map_err(|err| invalid(path, &err))
        }
        Some(name) if name.ends_with(".yml") || name.ends_with(".yaml") => {
            serde_yaml::from_str(text).map_err(|err| invalid(path, &err))
        }
        Some(".graphqlrc" | ".graphqlconfig") => serde_yaml::from_str(text)
            .or_else(|yaml_err| {
                serde_json::from_str(text).map_err(|_| invalid(path, &yaml_err))
            }),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn invalid(path: &Path, err: &dyn std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn name_recognition_is_exact() {
        assert!(is_config_file_name(".graphqlrc"));
        assert!(is_config_file_name("graphql.config.yml"));
        assert!(is_config_file_name(".graphqlconfig.yaml"));
        assert!(!is_config_file_name(".graphqlrc.toml"));
        assert!(!is_config_file_name("my.graphqlrc"));
        assert!(!is_config_file_name("graphql.config"));
    }

    #[test]
    fn legacy_names_sort_after_modern_names() {
        for legacy in LEGACY_CONFIG_FILE_NAMES {
            assert!(is_legacy_config_file_name(legacy));
            let legacy_rank = CONFIG_FILE_NAMES.iter().position(|n| n == legacy).unwrap();
            for modern in MODERN_CONFIG_FILE_NAMES {
                let modern_rank = CONFIG_FILE_NAMES.iter().position(|n| n == modern).unwrap();
                assert!(modern_rank < legacy_rank);
            }
        }
    }

    #[test]
    fn find_prefers_modern_over_legacy() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(".graphqlconfig"), "schema: legacy.graphql")?;
        std::fs::write(dir.path().join(".graphqlrc.yml"), "schema: modern.graphql")?;

        let found = find_config_file_in_directory(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), ".graphqlrc.yml");
        Ok(())
    }

    #[test]
    fn find_respects_priority_within_modern_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("graphql.config.json"), "{}")?;
        std::fs::write(dir.path().join(".graphqlrc.json"), "{}")?;

        let found = find_config_file_in_directory(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), ".graphqlrc.json");
        Ok(())
    }

    #[test]
    fn find_ignores_directories_with_config_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir(dir.path().join(".graphqlrc"))?;
        assert!(find_config_file_in_directory(dir.path()).is_none());
        Ok(())
    }

    #[test]
    fn extensionless_accepts_yaml_and_json() -> Result<()> {
        let path = Path::new("/project/.graphqlrc");

        let from_yaml = parse_raw_config(path, "schema: schema.graphql")?;
        assert!(from_yaml.schema.is_some());

        let from_json = parse_raw_config(path, r#"{"schema": "schema.graphql"}"#)?;
        assert!(from_json.schema.is_some());
        Ok(())
    }

    #[test]
    fn json_suffix_rejects_yaml_body() {
        let path = Path::new("/project/.graphqlrc.json");
        let err = parse_raw_config(path, "schema: schema.graphql").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn unknown_suffix_is_unsupported() {
        let path = Path::new("/project/.graphqlrc.toml");
        let err = parse_raw_config(path, "schema = 'x'").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn load_reads_from_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(".graphqlrc.yml");
        std::fs::write(&path, "schema: schema.graphql\ndocuments: '**/*.graphql'")?;

        let raw = load_raw_config(&path)?;
        assert_eq!(
            raw.documents.unwrap().patterns(),
            vec!["**/*.graphql"]
        );
        Ok(())
    }
}
