use crate::project::ProjectConfig;
use graphql_env::{contains_variables, interpolate, Dialect, EnvironmentSnapshot};
use std::collections::HashMap;

/// A named remote GraphQL endpoint from a project's `extensions.endpoints`
/// entry. All fields are environment-expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEndpoint {
    pub name: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub introspect: bool,
}

impl ProjectConfig {
    /// Endpoints declared under `extensions.endpoints`. Two shapes are
    /// accepted per entry: a bare URL string, or an object with `url`,
    /// optional `headers` and optional `introspect`.
    ///
    /// Re-evaluated on every call: interpolation results depend on the
    /// current environment snapshot, which changes across reloads.
    #[must_use]
    pub fn endpoints(&self) -> Vec<ConfigEndpoint> {
        let Some(serde_json::Value::Object(entries)) = self.extensions().get("endpoints") else {
            return Vec::new();
        };

        let mut endpoints = Vec::new();
        for (name, value) in entries {
            match value {
                serde_json::Value::String(url) => endpoints.push(ConfigEndpoint {
                    name: name.clone(),
                    url: expand(url, self.dialect(), self.environment()),
                    headers: HashMap::new(),
                    introspect: false,
                }),
                serde_json::Value::Object(fields) => {
                    let Some(serde_json::Value::String(url)) = fields.get("url") else {
                        tracing::debug!(endpoint = %name, "endpoint entry has no url, skipping");
                        continue;
                    };
                    let mut headers = HashMap::new();
                    if let Some(serde_json::Value::Object(raw_headers)) = fields.get("headers") {
                        for (key, header) in raw_headers {
                            if let serde_json::Value::String(text) = header {
                                headers.insert(
                                    key.clone(),
                                    expand(text, self.dialect(), self.environment()),
                                );
                            }
                        }
                    }
                    endpoints.push(ConfigEndpoint {
                        name: name.clone(),
                        url: expand(url, self.dialect(), self.environment()),
                        headers,
                        introspect: fields
                            .get("introspect")
                            .and_then(serde_json::Value::as_bool)
                            .unwrap_or(false),
                    });
                }
                _ => {
                    tracing::debug!(endpoint = %name, "unsupported endpoint entry shape, skipping");
                }
            }
        }
        endpoints
    }
}

fn expand(text: &str, dialect: Dialect, environment: &EnvironmentSnapshot) -> String {
    if contains_variables(text, dialect) {
        interpolate(text, dialect, environment)
    } else {
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_config::parse_raw_config;
    use std::path::PathBuf;

    fn project_with_endpoints(yaml: &str, resolver: impl Fn(&str) -> Option<String>) -> crate::Config {
        let path = PathBuf::from("/workspace/.graphqlrc.yml");
        let raw = parse_raw_config(&path, yaml).unwrap();
        crate::Config::new("/workspace", Some(path), raw, &resolver)
    }

    #[test]
    fn string_shorthand_and_object_shapes() {
        let config = project_with_endpoints(
            r#"
schema: schema.graphql
extensions:
  endpoints:
    dev: "http://localhost:4000/graphql"
    prod:
      url: "https://api.example.com/graphql"
      headers:
        Authorization: "Bearer token"
      introspect: true
"#,
            |_| None,
        );

        let endpoints = config.default_project().unwrap().endpoints();
        assert_eq!(endpoints.len(), 2);

        let dev = endpoints.iter().find(|e| e.name == "dev").unwrap();
        assert_eq!(dev.url, "http://localhost:4000/graphql");
        assert!(!dev.introspect);
        assert!(dev.headers.is_empty());

        let prod = endpoints.iter().find(|e| e.name == "prod").unwrap();
        assert_eq!(prod.url, "https://api.example.com/graphql");
        assert!(prod.introspect);
        assert_eq!(
            prod.headers.get("Authorization"),
            Some(&"Bearer token".to_string())
        );
    }

    #[test]
    fn url_and_headers_are_interpolated() {
        let config = project_with_endpoints(
            r#"
schema: schema.graphql
extensions:
  endpoints:
    default:
      url: "${API_URL}"
      headers:
        Authorization: "Bearer ${API_TOKEN:anonymous}"
"#,
            |name| (name == "API_URL").then(|| "https://api.example.com".to_string()),
        );

        let endpoints = config.default_project().unwrap().endpoints();
        assert_eq!(endpoints[0].url, "https://api.example.com");
        assert_eq!(
            endpoints[0].headers.get("Authorization"),
            Some(&"Bearer anonymous".to_string())
        );
    }

    #[test]
    fn missing_endpoints_extension_yields_empty() {
        let config = project_with_endpoints("schema: schema.graphql", |_| None);
        assert!(config.default_project().unwrap().endpoints().is_empty());
    }
}
