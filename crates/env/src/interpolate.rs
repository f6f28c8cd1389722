use crate::resolver::VariableResolver;
use dashmap::DashMap;
use std::sync::{Arc, LazyLock};

/// Placeholder syntax dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `${NAME}` / `${NAME:"default"}`
    Modern,
    /// `${env:NAME}`, no default syntax
    Legacy,
}

/// A parsed placeholder: the byte range of the full `${...}` occurrence in
/// the source text, plus the variable name and optional default.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    start: usize,
    end: usize,
    name: String,
    default: Option<String>,
}

static PARSE_CACHE: LazyLock<DashMap<(String, Dialect), Arc<Vec<Placeholder>>>> =
    LazyLock::new(DashMap::new);

/// Drops all cached parse results. Called when the owning config reloads.
pub fn invalidate_parse_cache() {
    PARSE_CACHE.clear();
}

/// Whether `text` contains at least one well-formed placeholder in `dialect`.
///
/// Used to treat a schema pointer as a literal path when no expansion is
/// needed.
#[must_use]
pub fn contains_variables(text: &str, dialect: Dialect) -> bool {
    !parse_placeholders(text, dialect).is_empty()
}

/// The distinct variable names referenced by `text`, in occurrence order.
#[must_use]
pub fn placeholder_names(text: &str, dialect: Dialect) -> Vec<String> {
    let mut names = Vec::new();
    for placeholder in parse_placeholders(text, dialect).iter() {
        if !names.contains(&placeholder.name) {
            names.push(placeholder.name.clone());
        }
    }
    names
}

/// Replaces every placeholder in `text` with `resolver(name)`, falling back
/// to the placeholder's default and then to the original placeholder text.
/// The result is trimmed of leading and trailing whitespace.
pub fn interpolate<R: VariableResolver + ?Sized>(
    text: &str,
    dialect: Dialect,
    resolver: &R,
) -> String {
    let placeholders = parse_placeholders(text, dialect);
    if placeholders.is_empty() {
        return text.trim().to_string();
    }

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    for placeholder in placeholders.iter() {
        output.push_str(&text[cursor..placeholder.start]);
        match resolver.resolve(&placeholder.name) {
            Some(value) => output.push_str(&value),
            None => match &placeholder.default {
                Some(default) => output.push_str(default),
                None => output.push_str(&text[placeholder.start..placeholder.end]),
            },
        }
        cursor = placeholder.end;
    }
    output.push_str(&text[cursor..]);
    output.trim().to_string()
}

fn parse_placeholders(text: &str, dialect: Dialect) -> Arc<Vec<Placeholder>> {
    let key = (text.to_string(), dialect);
    if let Some(cached) = PARSE_CACHE.get(&key) {
        return Arc::clone(&cached);
    }
    let parsed = Arc::new(scan(text, dialect));
    PARSE_CACHE.insert(key, Arc::clone(&parsed));
    parsed
}

/// Single left-to-right scan. Unclosed `${` sequences produce no placeholder
/// and the remaining text stays verbatim.
fn scan(text: &str, dialect: Dialect) -> Vec<Placeholder> {
    let mut placeholders = Vec::new();
    let mut offset = 0;

    while let Some(open) = text[offset..].find("${") {
        let start = offset + open;
        let Some(close) = text[start + 2..].find('}') else {
            break;
        };
        let end = start + 2 + close + 1;
        let inner = &text[start + 2..end - 1];

        if let Some(placeholder) = classify(inner, dialect, start, end) {
            placeholders.push(placeholder);
        }
        offset = end;
    }

    placeholders
}

fn classify(inner: &str, dialect: Dialect, start: usize, end: usize) -> Option<Placeholder> {
    match dialect {
        Dialect::Legacy => {
            let name = inner.strip_prefix("env:")?;
            Some(Placeholder {
                start,
                end,
                name: name.trim().to_string(),
                default: None,
            })
        }
        Dialect::Modern => match inner.split_once(':') {
            Some((name, default)) => Some(Placeholder {
                start,
                end,
                name: name.trim().to_string(),
                default: Some(unquote(default.trim()).to_string()),
            }),
            None => Some(Placeholder {
                start,
                end,
                name: inner.trim().to_string(),
                default: None,
            }),
        },
    }
}

/// Strips one layer of matching double quotes, leaving the content untouched.
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn none_resolver(_: &str) -> Option<String> {
        None
    }

    fn map_resolver(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn resolves_modern_placeholder() {
        let vars = map_resolver(&[("API_URL", "https://api.example.com")]);
        let resolver = |name: &str| vars.get(name).cloned();
        assert_eq!(
            interpolate("${API_URL}/graphql", Dialect::Modern, &resolver),
            "https://api.example.com/graphql"
        );
    }

    #[test]
    fn missing_variable_falls_back_to_default() {
        assert_eq!(
            interpolate("text${unknown:default_value}", Dialect::Modern, &none_resolver),
            "textdefault_value"
        );
    }

    #[test]
    fn quoted_default_loses_one_quote_layer() {
        assert_eq!(
            interpolate("${HOST:\"localhost\"}", Dialect::Modern, &none_resolver),
            "localhost"
        );
        assert_eq!(
            interpolate("${HOST:\"\"quoted\"\"}", Dialect::Modern, &none_resolver),
            "\"quoted\""
        );
    }

    #[test]
    fn missing_variable_without_default_stays_verbatim() {
        assert_eq!(
            interpolate("${PATH}", Dialect::Modern, &none_resolver),
            "${PATH}"
        );
    }

    #[test]
    fn unclosed_placeholder_stays_verbatim() {
        assert_eq!(
            interpolate("prefix ${OPEN", Dialect::Modern, &none_resolver),
            "prefix ${OPEN"
        );
    }

    #[test]
    fn legacy_dialect_requires_env_prefix() {
        let vars = map_resolver(&[("HOME", "/home/user")]);
        let resolver = |name: &str| vars.get(name).cloned();

        assert_eq!(
            interpolate("${env:HOME}", Dialect::Legacy, &resolver),
            "/home/user"
        );
        // Without the prefix the text is not a legacy placeholder at all.
        assert_eq!(interpolate("${HOME}", Dialect::Legacy, &resolver), "${HOME}");
    }

    #[test]
    fn legacy_syntax_under_modern_dialect_is_name_env_with_default() {
        let vars = map_resolver(&[("HOME", "/home/user")]);
        let resolver = |name: &str| vars.get(name).cloned();
        // Modern parsing sees name `env` with default `HOME`; it never
        // resolves the HOME variable.
        assert_eq!(interpolate("${env:HOME}", Dialect::Modern, &resolver), "HOME");
    }

    #[test]
    fn result_is_trimmed() {
        assert_eq!(
            interpolate("  ${X:value}  ", Dialect::Modern, &none_resolver),
            "value"
        );
        assert_eq!(interpolate("  plain  ", Dialect::Modern, &none_resolver), "plain");
    }

    #[test]
    fn multiple_placeholders_in_one_string() {
        let vars = map_resolver(&[("A", "1"), ("B", "2")]);
        let resolver = |name: &str| vars.get(name).cloned();
        assert_eq!(
            interpolate("${A}-${MISSING:x}-${B}", Dialect::Modern, &resolver),
            "1-x-2"
        );
    }

    #[test]
    fn contains_variables_reflects_parse_result() {
        assert!(contains_variables("${A}", Dialect::Modern));
        assert!(!contains_variables("plain text", Dialect::Modern));
        assert!(!contains_variables("${open", Dialect::Modern));
        assert!(!contains_variables("${HOME}", Dialect::Legacy));
        assert!(contains_variables("${env:HOME}", Dialect::Legacy));
    }

    #[test]
    fn placeholder_names_deduplicates_in_order() {
        assert_eq!(
            placeholder_names("${B}${A}${B}", Dialect::Modern),
            vec!["B".to_string(), "A".to_string()]
        );
    }
}
