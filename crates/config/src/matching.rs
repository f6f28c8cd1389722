//! Glob matching with graphql-config semantics.
//!
//! Differences from a plain glob crate call:
//! - brace groups (`*.{ts,tsx}`) are expanded before matching
//! - patterns are normalized (leading `./` and `/` stripped, `//` collapsed)
//! - a pattern without a separator matches against the file's base name
//! - a relative pattern also matches when the path merely ends with it
//!   (`foo/*.graphql` matches `src/foo/bar.graphql`)

use dashmap::DashMap;
use glob::{MatchOptions, Pattern};
use std::sync::LazyLock;

static MATCH_CACHE: LazyLock<DashMap<(String, String), bool>> = LazyLock::new(DashMap::new);

/// Whether `path` (workspace-relative, `/`-separated) matches `pattern`.
///
/// Invalid patterns never match. Results are memoized per (path, pattern)
/// pair until [`clear_match_cache`] drops them.
#[must_use]
pub fn matches(path: &str, pattern: &str) -> bool {
    let key = (path.to_string(), pattern.to_string());
    if let Some(cached) = MATCH_CACHE.get(&key) {
        return *cached;
    }
    let result = matches_uncached(path, pattern);
    MATCH_CACHE.insert(key, result);
    result
}

/// Drops all memoized match results.
pub fn clear_match_cache() {
    MATCH_CACHE.clear();
}

fn matches_uncached(path: &str, pattern: &str) -> bool {
    let path = normalize_path(path);
    expand_braces(pattern)
        .iter()
        .any(|expanded| matches_single(&path, expanded))
}

fn matches_single(path: &str, pattern: &str) -> bool {
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };

    if !pattern.contains('/') {
        // matchBase: a bare pattern matches the file's base name at any depth.
        let base_name = path.rsplit('/').next().unwrap_or(path);
        return Pattern::new(pattern)
            .is_ok_and(|glob| glob.matches_with(base_name, options));
    }

    let Ok(glob) = Pattern::new(pattern) else {
        tracing::debug!(pattern, "ignoring invalid glob pattern");
        return false;
    };
    if glob.matches_with(path, options) {
        return true;
    }

    // A relative pattern also matches deeper in the tree, as if prefixed
    // with `**/`.
    if !pattern.starts_with("**/") {
        if let Ok(prefixed) = Pattern::new(&format!("**/{pattern}")) {
            return prefixed.matches_with(path, options);
        }
    }
    false
}

fn normalize_path(path: &str) -> String {
    normalize_pattern(&path.replace('\\', "/"))
}

/// Normalizes a glob pattern: strips a leading `./` or `/`, collapses
/// consecutive slashes.
fn normalize_pattern(pattern: &str) -> String {
    let mut normalized = pattern
        .strip_prefix("./")
        .or_else(|| pattern.strip_prefix('/'))
        .unwrap_or(pattern)
        .to_string();

    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }

    normalized
}

/// Expands brace groups like `src/**/*.{ts,tsx}` into separate patterns.
/// Nested or multiple groups are expanded left to right.
fn expand_braces(pattern: &str) -> Vec<String> {
    let normalized = normalize_pattern(pattern);

    if let (Some(start), Some(end)) = (normalized.find('{'), normalized.find('}')) {
        if start < end {
            let before = &normalized[..start];
            let after = &normalized[end + 1..];
            return normalized[start + 1..end]
                .split(',')
                .flat_map(|option| expand_braces(&format!("{before}{}{after}", option.trim())))
                .collect();
        }
    }

    vec![normalized]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_relative_match() {
        assert!(matches("src/schema.graphql", "src/schema.graphql"));
        assert!(!matches("src/schema.graphql", "src/other.graphql"));
    }

    #[test]
    fn globstar_spans_directories() {
        assert!(matches("src/a/b/query.graphql", "src/**/*.graphql"));
        assert!(matches("src/query.graphql", "src/**/*.graphql"));
        assert!(!matches("lib/query.graphql", "src/**/*.graphql"));
    }

    #[test]
    fn single_star_does_not_cross_separators() {
        assert!(matches("src/query.graphql", "src/*.graphql"));
        assert!(!matches("src/nested/query.graphql", "src/*.graphql"));
    }

    #[test]
    fn base_name_match_for_separator_free_patterns() {
        assert!(matches("deep/nested/dir/schema.graphql", "*.graphql"));
        assert!(matches("deep/nested/dir/schema.graphql", "schema.graphql"));
        assert!(!matches("deep/nested/dir/schema.gql", "*.graphql"));
    }

    #[test]
    fn relative_pattern_matches_at_depth() {
        assert!(matches("src/foo/bar.graphql", "foo/*.graphql"));
        assert!(matches("foo/bar.graphql", "foo/*.graphql"));
        assert!(!matches("src/foobar/baz.graphql", "foo/*.graphql"));
    }

    #[test]
    fn brace_expansion() {
        assert!(matches("src/query.ts", "src/**/*.{ts,tsx}"));
        assert!(matches("src/view.tsx", "src/**/*.{ts,tsx}"));
        assert!(!matches("src/style.css", "src/**/*.{ts,tsx}"));
    }

    #[test]
    fn brace_expansion_with_spaces() {
        assert!(matches("src/view.tsx", "src/**/*.{ts, tsx}"));
    }

    #[test]
    fn multiple_brace_groups() {
        assert!(matches("app/pages/home.jsx", "{app,lib}/**/*.{js,jsx}"));
        assert!(!matches("vendor/pages/home.jsx", "{app,lib}/**/*.{js,jsx}"));
    }

    #[test]
    fn pattern_normalization() {
        assert!(matches("src/query.graphql", "./src/*.graphql"));
        assert!(matches("src/query.graphql", "/src/*.graphql"));
        assert!(matches("src/query.graphql", "src//*.graphql"));
    }

    #[test]
    fn path_normalization() {
        assert!(matches("./src/query.graphql", "src/*.graphql"));
        assert!(matches(r"src\query.graphql", "src/*.graphql"));
    }

    #[test]
    fn invalid_pattern_never_matches() {
        assert!(!matches("src/a.graphql", "src/[unclosed.graphql"));
    }
}
