use crate::project::ProjectConfig;
use apollo_compiler::parser::Parser;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use graphql_registry::{RegistryBuilder, TypeRegistry};
use ignore::WalkBuilder;
use std::path::PathBuf;
use std::sync::Arc;

/// A merged type registry built at a known provider generation. Consumers
/// compare generations instead of re-diffing file sets.
#[derive(Debug)]
pub struct SchemaSnapshot {
    generation: u64,
    registry: TypeRegistry,
}

impl SchemaSnapshot {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn is_superseded(&self, current_generation: u64) -> bool {
        self.generation < current_generation
    }
}

/// Parses each source and merges all type-system definitions into one
/// registry. Sources that fail to parse contribute their recoverable
/// partial document; schema building never aborts on a broken file.
pub fn build_schema_snapshot<I, P, S>(sources: I, generation: u64) -> SchemaSnapshot
where
    I: IntoIterator<Item = (P, S)>,
    P: AsRef<std::path::Path>,
    S: AsRef<str>,
{
    let mut builder = RegistryBuilder::new();
    let mut parser = Parser::new();
    for (path, text) in sources {
        let document = match parser.parse_ast(text.as_ref(), path.as_ref()) {
            Ok(document) => document,
            Err(with_errors) => {
                tracing::debug!(
                    path = %path.as_ref().display(),
                    "schema source has syntax errors, merging partial document"
                );
                with_errors.partial
            }
        };
        builder.merge_document(&document);
    }
    SchemaSnapshot {
        generation,
        registry: builder.build(),
    }
}

/// Reads the on-disk schema files of a project: every file under the project
/// directory matching one of its local schema patterns.
#[must_use]
pub fn collect_schema_sources(project: &ProjectConfig) -> Vec<(PathBuf, String)> {
    let patterns = project.local_schema_patterns();
    if patterns.is_empty() {
        return Vec::new();
    }

    let mut sources = Vec::new();
    for entry in WalkBuilder::new(project.dir()).hidden(false).build().flatten() {
        if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
            continue;
        }
        let path = entry.into_path();
        let relative = path
            .strip_prefix(project.dir())
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        if !patterns
            .iter()
            .any(|pattern| graphql_config::matches(&relative, pattern))
        {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => sources.push((path, text)),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable schema file");
            }
        }
    }
    sources.sort_by(|a, b| a.0.cmp(&b.0));
    sources
}

/// Per-project snapshot cache keyed by the provider's modification counter.
///
/// A build result never replaces a newer snapshot: when a superseding build
/// finished first, the stale result is discarded and the newer one returned.
#[derive(Debug, Default)]
pub struct SchemaSnapshots {
    snapshots: DashMap<String, Arc<SchemaSnapshot>>,
}

impl SchemaSnapshots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, project: &str) -> Option<Arc<SchemaSnapshot>> {
        self.snapshots.get(project).map(|snapshot| Arc::clone(&snapshot))
    }

    /// Returns the cached snapshot when it is at least as new as
    /// `generation`; otherwise runs `build` and stores the result.
    pub fn get_or_build<F>(&self, project: &str, generation: u64, build: F) -> Arc<SchemaSnapshot>
    where
        F: FnOnce() -> TypeRegistry,
    {
        if let Some(existing) = self.snapshots.get(project) {
            if existing.generation >= generation {
                return Arc::clone(&existing);
            }
        }

        let built = Arc::new(SchemaSnapshot {
            generation,
            registry: build(),
        });
        match self.snapshots.entry(project.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().generation > built.generation {
                    Arc::clone(occupied.get())
                } else {
                    occupied.insert(Arc::clone(&built));
                    built
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&built));
                built
            }
        }
    }

    pub fn invalidate(&self, project: &str) {
        self.snapshots.remove(project);
    }

    pub fn clear(&self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_registry_from_multiple_sources() {
        let snapshot = build_schema_snapshot(
            [
                ("base.graphql", "type Query { a: String }"),
                ("ext.graphql", "extend type Query { b: String }"),
            ],
            7,
        );

        assert_eq!(snapshot.generation(), 7);
        assert!(snapshot.registry().get("Query").is_some());
        assert!(!snapshot.registry().has_errors());
    }

    #[test]
    fn broken_source_contributes_partial_document() {
        let snapshot = build_schema_snapshot(
            [
                ("good.graphql", "type Query { a: String }"),
                ("bad.graphql", "type Broken {"),
            ],
            1,
        );
        assert!(snapshot.registry().get("Query").is_some());
    }

    #[test]
    fn cache_reuses_snapshots_per_generation() {
        let cache = SchemaSnapshots::new();
        let first = cache.get_or_build("app", 1, TypeRegistry::default);
        let again = cache.get_or_build("app", 1, || panic!("must not rebuild"));
        assert!(Arc::ptr_eq(&first, &again));

        let newer = cache.get_or_build("app", 2, TypeRegistry::default);
        assert_eq!(newer.generation(), 2);
        assert!(first.is_superseded(newer.generation()));
    }

    #[test]
    fn stale_build_does_not_clobber_newer_snapshot() {
        let cache = SchemaSnapshots::new();
        let newer = cache.get_or_build("app", 5, TypeRegistry::default);
        let raced = cache.get_or_build("app", 3, TypeRegistry::default);
        assert!(Arc::ptr_eq(&newer, &raced));
    }
}
