use crate::error::Result;
use crate::provider::ConfigProvider;
use graphql_config::is_config_file_name;
use notify::RecommendedWatcher;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult, Debouncer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Bridges file-system events to the provider: any debounced event touching
/// a recognized config file or a `.env` file triggers `schedule_reload`.
/// Watching stops when the watcher is dropped.
pub struct ConfigWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ConfigWatcher {
    pub fn start(provider: Arc<ConfigProvider>, debounce: Duration) -> Result<Self> {
        let root = provider.root().to_path_buf();
        let trigger = Arc::clone(&provider);

        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    if events.iter().any(|event| is_relevant(&event.path)) {
                        trigger.schedule_reload();
                    }
                }
                Err(error) => tracing::warn!(%error, "file watcher error"),
            }
        })?;
        debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;

        tracing::debug!(root = %root.display(), "watching for config changes");
        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

fn is_relevant(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| is_config_file_name(name) || name.starts_with(".env"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_env_files_are_relevant() {
        assert!(is_relevant(Path::new("/p/.graphqlrc.yml")));
        assert!(is_relevant(Path::new("/p/graphql.config.json")));
        assert!(is_relevant(Path::new("/p/.env.local")));
        assert!(!is_relevant(Path::new("/p/schema.graphql")));
        assert!(!is_relevant(Path::new("/p/src/main.rs")));
    }
}
