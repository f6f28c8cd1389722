use crate::project::ProjectConfig;
use crate::DEFAULT_PROJECT_NAME;
use graphql_config::{is_legacy_config_file_name, Patterns, RawConfig, SchemaPointer};
use graphql_env::{placeholder_names, Dialect, EnvironmentSnapshot, VariableResolver};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// A loaded config file: its directory (anchor for relative paths), the
/// backing file (`None` for contributed/virtual configs) and the resolved
/// project map.
///
/// Value type: `projects` is computed once at construction and never mutated;
/// any change produces a new `Config`. When the raw config declares no named
/// sub-projects the map holds exactly one entry named
/// [`DEFAULT_PROJECT_NAME`].
#[derive(Debug)]
pub struct Config {
    dir: PathBuf,
    file: Option<PathBuf>,
    raw: RawConfig,
    projects: IndexMap<String, ProjectConfig>,
}

impl Config {
    /// Builds a config whose environment snapshot is captured through
    /// `resolver` at construction time.
    pub fn new<R>(dir: impl Into<PathBuf>, file: Option<PathBuf>, raw: RawConfig, resolver: &R) -> Self
    where
        R: VariableResolver + ?Sized,
    {
        let dir = dir.into();
        let dialect = match &file {
            Some(path) => dialect_for(path),
            None => Dialect::Modern,
        };
        let environment =
            EnvironmentSnapshot::capture(referenced_variables(&raw, dialect), resolver);

        let mut projects = IndexMap::new();
        match raw.projects.as_ref().filter(|map| !map.is_empty()) {
            Some(named) => {
                for (name, project) in named {
                    projects.insert(
                        name.clone(),
                        ProjectConfig::resolve(
                            name.clone(),
                            dir.clone(),
                            dialect,
                            &raw,
                            Some(project),
                            environment.clone(),
                        ),
                    );
                }
            }
            None => {
                projects.insert(
                    DEFAULT_PROJECT_NAME.to_string(),
                    ProjectConfig::resolve(
                        DEFAULT_PROJECT_NAME,
                        dir.clone(),
                        dialect,
                        &raw,
                        None,
                        environment,
                    ),
                );
            }
        }

        Self {
            dir,
            file,
            raw,
            projects,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The physical config file, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    #[must_use]
    pub fn raw(&self) -> &RawConfig {
        &self.raw
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectConfig> {
        self.projects.values()
    }

    #[must_use]
    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.get(name)
    }

    #[must_use]
    pub fn default_project(&self) -> Option<&ProjectConfig> {
        self.projects
            .get(DEFAULT_PROJECT_NAME)
            .or_else(|| self.projects.values().next())
    }

    /// The project owning `file`: the first project (declaration order)
    /// whose globs match it, falling back to the first project that declares
    /// no include/exclude constraints at all.
    #[must_use]
    pub fn project_for_file(&self, file: &Path) -> Option<&ProjectConfig> {
        self.projects
            .values()
            .find(|project| project.matches(file))
            .or_else(|| self.projects.values().find(|project| project.is_catch_all()))
    }
}

fn dialect_for(file: &Path) -> Dialect {
    let is_legacy = file
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(is_legacy_config_file_name);
    if is_legacy {
        Dialect::Legacy
    } else {
        Dialect::Modern
    }
}

/// Every variable name referenced anywhere in the raw config: schema
/// pointers and their headers, documents/include/exclude patterns, and any
/// string inside the extensions payload.
fn referenced_variables(raw: &RawConfig, dialect: Dialect) -> Vec<String> {
    let mut names = Vec::new();
    let mut add = |text: &str| {
        for name in placeholder_names(text, dialect) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    };

    add_schema(raw.schema.as_ref(), &mut add);
    add_patterns(raw.documents.as_ref(), &mut add);
    add_patterns(raw.include.as_ref(), &mut add);
    add_patterns(raw.exclude.as_ref(), &mut add);
    if let Some(extensions) = &raw.extensions {
        for value in extensions.values() {
            add_json_strings(value, &mut add);
        }
    }

    if let Some(projects) = &raw.projects {
        for project in projects.values() {
            add_schema(project.schema.as_ref(), &mut add);
            add_patterns(project.documents.as_ref(), &mut add);
            add_patterns(project.include.as_ref(), &mut add);
            add_patterns(project.exclude.as_ref(), &mut add);
            if let Some(extensions) = &project.extensions {
                for value in extensions.values() {
                    add_json_strings(value, &mut add);
                }
            }
        }
    }

    names
}

fn add_patterns(patterns: Option<&Patterns>, add: &mut dyn FnMut(&str)) {
    if let Some(patterns) = patterns {
        for pattern in patterns.patterns() {
            add(pattern);
        }
    }
}

fn add_schema(schema: Option<&graphql_config::SchemaPointers>, add: &mut dyn FnMut(&str)) {
    let Some(schema) = schema else { return };
    for pointer in schema.pointers() {
        add(pointer.raw_text());
        if let SchemaPointer::Remote(remote) = pointer {
            for value in remote.headers.iter().flat_map(|headers| headers.values()) {
                add(value);
            }
        }
    }
}

fn add_json_strings(value: &serde_json::Value, add: &mut dyn FnMut(&str)) {
    match value {
        serde_json::Value::String(text) => add(text),
        serde_json::Value::Array(items) => {
            for item in items {
                add_json_strings(item, add);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                add_json_strings(item, add);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_config::parse_raw_config;

    fn none_resolver(_: &str) -> Option<String> {
        None
    }

    fn config_from_yaml(yaml: &str) -> Config {
        let path = PathBuf::from("/workspace/.graphqlrc.yml");
        let raw = parse_raw_config(&path, yaml).unwrap();
        Config::new("/workspace", Some(path), raw, &none_resolver)
    }

    #[test]
    fn single_project_config_gets_a_default_entry() {
        let config = config_from_yaml("schema: schema.graphql");

        assert_eq!(config.projects().count(), 1);
        assert!(config.project(DEFAULT_PROJECT_NAME).is_some());
        assert_eq!(
            config.default_project().unwrap().name(),
            DEFAULT_PROJECT_NAME
        );
    }

    #[test]
    fn named_projects_keep_declaration_order() {
        let config = config_from_yaml(
            r"
projects:
  backend:
    schema: server/schema.graphql
  frontend:
    schema: client/schema.graphql
",
        );

        let names: Vec<_> = config.projects().map(ProjectConfig::name).collect();
        assert_eq!(names, vec!["backend", "frontend"]);
        assert!(config.project(DEFAULT_PROJECT_NAME).is_none());
    }

    #[test]
    fn project_for_file_prefers_explicit_match() {
        let config = config_from_yaml(
            r"
projects:
  app:
    schema: app/schema.graphql
    include: ['app/**']
  fallback:
    schema: fallback/schema.graphql
",
        );

        let owner = config
            .project_for_file(Path::new("/workspace/app/query.graphql"))
            .unwrap();
        assert_eq!(owner.name(), "app");

        let fallback = config
            .project_for_file(Path::new("/workspace/elsewhere/query.graphql"))
            .unwrap();
        assert_eq!(fallback.name(), "fallback");
    }

    #[test]
    fn no_match_and_no_catch_all_resolves_to_none() {
        let config = config_from_yaml(
            r"
projects:
  app:
    schema: app/schema.graphql
    include: ['app/**']
",
        );

        assert!(config
            .project_for_file(Path::new("/workspace/lib/query.graphql"))
            .is_none());
    }

    #[test]
    fn legacy_file_name_selects_legacy_dialect() {
        let path = PathBuf::from("/workspace/.graphqlconfig");
        let raw = parse_raw_config(&path, "schema: schema.graphql").unwrap();
        let config = Config::new("/workspace", Some(path), raw, &none_resolver);

        assert_eq!(
            config.default_project().unwrap().dialect(),
            Dialect::Legacy
        );
    }

    #[test]
    fn environment_snapshot_captures_referenced_names() {
        let resolver = |name: &str| (name == "SCHEMA_PATH").then(|| "real.graphql".to_string());
        let path = PathBuf::from("/workspace/.graphqlrc.yml");
        let raw = parse_raw_config(&path, "schema: '${SCHEMA_PATH}'").unwrap();
        let config = Config::new("/workspace", Some(path), raw, &resolver);

        let project = config.default_project().unwrap();
        assert_eq!(project.environment().get("SCHEMA_PATH"), Some("real.graphql"));
        assert_eq!(project.local_schema_patterns(), vec!["real.graphql"]);
    }
}
