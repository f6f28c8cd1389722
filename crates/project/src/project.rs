use graphql_config::{
    ExtensionsMap, Patterns, RawConfig, RawProjectConfig, SchemaPointer, SchemaPointers,
};
use graphql_env::{contains_variables, interpolate, Dialect, EnvironmentSnapshot};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Decisive match-cache states. "Unknown" is the absence of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matching,
    Excluded,
}

/// The resolved, environment-aware view of one project.
///
/// Root-level raw values are folded in at construction (project value wins,
/// root value is the fallback; an explicitly empty list stays empty rather
/// than being coalesced with the root's). Match decisions are memoized per
/// file behind a read-write lock since they sit on hot read paths.
#[derive(Debug)]
pub struct ProjectConfig {
    name: String,
    dir: PathBuf,
    dialect: Dialect,
    schema: Option<SchemaPointers>,
    documents: Option<Patterns>,
    include: Option<Patterns>,
    exclude: Option<Patterns>,
    extensions: ExtensionsMap,
    environment: EnvironmentSnapshot,
    match_cache: RwLock<HashMap<PathBuf, MatchOutcome>>,
}

impl ProjectConfig {
    /// Resolves a project against its root config. `project` is `None` for
    /// the implicit default project of a single-project file.
    pub(crate) fn resolve(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        dialect: Dialect,
        root: &RawConfig,
        project: Option<&RawProjectConfig>,
        environment: EnvironmentSnapshot,
    ) -> Self {
        let mut extensions = root.extensions.clone().unwrap_or_default();
        if let Some(project_extensions) = project.and_then(|p| p.extensions.as_ref()) {
            // Key-wise merge, project entries shadow root entries.
            extensions.extend(project_extensions.clone());
        }

        Self {
            name: name.into(),
            dir: dir.into(),
            dialect,
            schema: project
                .and_then(|p| p.schema.clone())
                .or_else(|| root.schema.clone()),
            documents: project
                .and_then(|p| p.documents.clone())
                .or_else(|| root.documents.clone()),
            include: project
                .and_then(|p| p.include.clone())
                .or_else(|| root.include.clone()),
            exclude: project
                .and_then(|p| p.exclude.clone())
                .or_else(|| root.exclude.clone()),
            extensions,
            environment,
            match_cache: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory of the owning config file; anchor for relative paths.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn schema(&self) -> Option<&SchemaPointers> {
        self.schema.as_ref()
    }

    #[must_use]
    pub fn documents(&self) -> Option<&Patterns> {
        self.documents.as_ref()
    }

    #[must_use]
    pub fn include(&self) -> Option<&Patterns> {
        self.include.as_ref()
    }

    #[must_use]
    pub fn exclude(&self) -> Option<&Patterns> {
        self.exclude.as_ref()
    }

    #[must_use]
    pub fn extensions(&self) -> &ExtensionsMap {
        &self.extensions
    }

    #[must_use]
    pub fn environment(&self) -> &EnvironmentSnapshot {
        &self.environment
    }

    /// Interpolated local (non-remote) schema pointers.
    #[must_use]
    pub fn local_schema_patterns(&self) -> Vec<String> {
        let Some(schema) = &self.schema else {
            return Vec::new();
        };
        schema
            .pointers()
            .into_iter()
            .filter_map(|pointer| match pointer {
                SchemaPointer::Remote(_) => None,
                SchemaPointer::Path(text) => {
                    let expanded = self.expand(text);
                    if SchemaPointer::looks_remote(&expanded) {
                        None
                    } else {
                        Some(expanded)
                    }
                }
            })
            .collect()
    }

    /// Whether this project declares no include/exclude constraints and thus
    /// acts as a catch-all fallback for files nothing else claims.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        !non_empty(self.include.as_ref()) && !non_empty(self.exclude.as_ref())
    }

    /// Whether `file` belongs to this project's file set. Memoized.
    ///
    /// Decision order, first decisive answer wins: schema/documents globs
    /// include the file; a non-empty `exclude` match rejects it; a non-empty
    /// `include` decides the rest; with neither declared the file is out
    /// (the catch-all behavior lives in [`Config::project_for_file`]).
    ///
    /// [`Config::project_for_file`]: crate::Config::project_for_file
    #[must_use]
    pub fn matches(&self, file: &Path) -> bool {
        if let Ok(cache) = self.match_cache.read() {
            if let Some(outcome) = cache.get(file) {
                return *outcome == MatchOutcome::Matching;
            }
        }

        let outcome = self.classify(file);
        if let Ok(mut cache) = self.match_cache.write() {
            cache.insert(file.to_path_buf(), outcome);
        }
        outcome == MatchOutcome::Matching
    }

    fn classify(&self, file: &Path) -> MatchOutcome {
        let relative = self.relative_path(file);

        for pattern in self.local_schema_patterns() {
            if graphql_config::matches(&relative, &pattern) {
                return MatchOutcome::Matching;
            }
        }
        if let Some(documents) = &self.documents {
            for pattern in documents.patterns() {
                if graphql_config::matches(&relative, &self.expand(pattern)) {
                    return MatchOutcome::Matching;
                }
            }
        }

        if let Some(exclude) = &self.exclude {
            if !exclude.is_empty() {
                for pattern in exclude.patterns() {
                    if graphql_config::matches(&relative, &self.expand(pattern)) {
                        return MatchOutcome::Excluded;
                    }
                }
            }
        }

        if non_empty(self.include.as_ref()) {
            if let Some(include) = &self.include {
                for pattern in include.patterns() {
                    if graphql_config::matches(&relative, &self.expand(pattern)) {
                        return MatchOutcome::Matching;
                    }
                }
            }
            return MatchOutcome::Excluded;
        }

        MatchOutcome::Excluded
    }

    /// Forward-slash path relative to the project directory; files outside
    /// the directory are matched against their full normalized path.
    fn relative_path(&self, file: &Path) -> String {
        let relative = file.strip_prefix(&self.dir).unwrap_or(file);
        relative.to_string_lossy().replace('\\', "/")
    }

    fn expand(&self, text: &str) -> String {
        if contains_variables(text, self.dialect) {
            interpolate(text, self.dialect, &self.environment)
        } else {
            text.trim().to_string()
        }
    }
}

fn non_empty(patterns: Option<&Patterns>) -> bool {
    patterns.is_some_and(|p| !p.is_empty())
}
