use crate::config::Config;
use crate::discovery::{find_config_files, find_dot_env_files};
use dashmap::DashMap;
use graphql_env::VariableChain;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;

/// How `schedule_reload` reacts to triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Reload synchronously on every trigger. Used by tests and other
    /// deterministic callers.
    Immediate,
    /// Coalesce bursts: each trigger cancels the previously scheduled
    /// reload and arms a fresh timer.
    Debounced(Duration),
}

/// Collaborator that persists unsaved in-memory edits of config files before
/// a reload reads bytes from disk.
pub trait DocumentFlusher: Send + Sync {
    fn flush_documents(&self, paths: &[PathBuf]);
}

/// Last-resort variable source consulted when overrides, `.env` files and
/// the process environment all come up empty. Hosts plug a prompt in here.
pub type MissingVariableHook = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Flusher for hosts without an editor buffer layer.
#[derive(Debug, Default)]
pub struct NoopFlusher;

impl DocumentFlusher for NoopFlusher {
    fn flush_documents(&self, _paths: &[PathBuf]) {}
}

#[derive(Debug)]
struct ConfigEntry {
    timestamp: Option<SystemTime>,
    /// `None` is a tombstone: the file exists but failed to parse. It keeps
    /// its slot so a broken file does not flap between discovered and
    /// forgotten across reloads.
    config: Option<Arc<Config>>,
}

/// Discovers, caches and incrementally reloads all configs under a root.
///
/// Cache entries are keyed by config file path and swapped only when the
/// on-disk modification timestamp differs, so a no-op reload preserves
/// `Arc<Config>` identity and emits no change notification. `.env` file
/// timestamps are tracked too: an environment change re-captures every
/// config's snapshot. Readers go
/// through [`ConfigProvider::config_for_file`] and
/// [`ConfigProvider::resolve_project_config`]; both walk parent directories
/// using a per-directory lookup cache.
pub struct ConfigProvider {
    root: PathBuf,
    policy: ReloadPolicy,
    flusher: Arc<dyn DocumentFlusher>,
    overrides: HashMap<String, String>,
    on_missing: Option<MissingVariableHook>,
    entries: DashMap<PathBuf, ConfigEntry>,
    dir_cache: DashMap<PathBuf, Option<PathBuf>>,
    env_timestamps: Mutex<HashMap<PathBuf, Option<SystemTime>>>,
    modification_count: AtomicU64,
    generation: watch::Sender<u64>,
    reload_lock: Mutex<()>,
    pending: Mutex<Option<tokio::task::JoinHandle<()>>>,
    runtime: Option<tokio::runtime::Handle>,
}

impl std::fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("root", &self.root)
            .field("policy", &self.policy)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl ConfigProvider {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, policy: ReloadPolicy) -> Self {
        Self::with_flusher(root, policy, Arc::new(NoopFlusher))
    }

    #[must_use]
    pub fn with_flusher(
        root: impl Into<PathBuf>,
        policy: ReloadPolicy,
        flusher: Arc<dyn DocumentFlusher>,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            root: root.into(),
            policy,
            flusher,
            overrides: HashMap::new(),
            on_missing: None,
            entries: DashMap::new(),
            dir_cache: DashMap::new(),
            env_timestamps: Mutex::new(HashMap::new()),
            modification_count: AtomicU64::new(0),
            generation,
            reload_lock: Mutex::new(()),
            pending: Mutex::new(None),
            runtime: tokio::runtime::Handle::try_current().ok(),
        }
    }

    /// Explicit variable values that outrank `.env` files and the process
    /// environment in every config's resolution chain.
    #[must_use]
    pub fn with_variable_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Installs the last-resort hook consulted for variables nothing else
    /// resolves.
    #[must_use]
    pub fn with_missing_variable_hook(mut self, hook: MissingVariableHook) -> Self {
        self.on_missing = Some(hook);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Monotonic counter, bumped once per reload that actually changed
    /// something.
    #[must_use]
    pub fn modification_count(&self) -> u64 {
        self.modification_count.load(Ordering::SeqCst)
    }

    /// Change-notification stream carrying the modification count.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Requests a reload according to the configured policy. Without a tokio
    /// runtime the debounce degrades to an immediate reload.
    pub fn schedule_reload(self: &Arc<Self>) {
        match (self.policy, &self.runtime) {
            (ReloadPolicy::Debounced(delay), Some(handle)) => {
                let provider = Arc::clone(self);
                let task = handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    provider.reload();
                });
                let mut pending = lock(&self.pending);
                if let Some(superseded) = pending.replace(task) {
                    superseded.abort();
                }
            }
            _ => {
                self.reload();
            }
        }
    }

    /// Waits until the next completed reload, up to `timeout`. Returns
    /// `false` on timeout; the caller then reads the last good cached state.
    pub async fn wait_for_reload(&self, timeout: Duration) -> bool {
        let mut receiver = self.generation.subscribe();
        matches!(
            tokio::time::timeout(timeout, receiver.changed()).await,
            Ok(Ok(()))
        )
    }

    /// Re-scans the root and refreshes every cache entry whose timestamp
    /// changed. Returns whether anything changed. Concurrent callers
    /// serialize on one lock; the loser re-runs against fresh timestamps and
    /// no-ops.
    #[tracing::instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    pub fn reload(&self) -> bool {
        let _guard = lock(&self.reload_lock);

        let candidates = find_config_files(&self.root);
        self.flusher.flush_documents(&candidates);

        let removed: Vec<PathBuf> = self
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|path| !candidates.contains(path))
            .collect();

        // Configs capture their environment snapshot at load time, so any
        // `.env` change makes every entry stale, not just the edited one
        // (a file deeper in the tree may be read by a chain higher up).
        let environment_changed = self.refresh_env_timestamps();

        let mut stale: Vec<(PathBuf, Option<SystemTime>)> = Vec::new();
        for path in candidates {
            let timestamp = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
            let unchanged = !environment_changed
                && timestamp.is_some()
                && self
                    .entries
                    .get(&path)
                    .is_some_and(|entry| entry.timestamp == timestamp);
            if !unchanged {
                stale.push((path, timestamp));
            }
        }

        if removed.is_empty() && stale.is_empty() {
            tracing::debug!("reload is a no-op");
            return false;
        }

        // Interpolation results may change with the new file contents.
        graphql_env::invalidate_parse_cache();
        graphql_env::bump_environment_version();
        graphql_config::clear_match_cache();

        for path in removed {
            tracing::debug!(path = %path.display(), "evicting deleted config");
            self.entries.remove(&path);
        }

        for (path, timestamp) in stale {
            let entry = self.load_entry(&path, timestamp);
            self.entries.insert(path, entry);
        }

        self.dir_cache.clear();
        let count = self.modification_count.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.generation.send(count);
        tracing::debug!(modification_count = count, "configs reloaded");
        true
    }

    /// Re-stamps every `.env` file under the root. Returns whether the set
    /// of files or any timestamp differs from the previous reload.
    fn refresh_env_timestamps(&self) -> bool {
        let mut current: HashMap<PathBuf, Option<SystemTime>> = HashMap::new();
        for path in find_dot_env_files(&self.root) {
            let timestamp = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
            current.insert(path, timestamp);
        }

        let mut stored = lock(&self.env_timestamps);
        if *stored == current {
            false
        } else {
            *stored = current;
            true
        }
    }

    fn load_entry(&self, path: &Path, timestamp: Option<SystemTime>) -> ConfigEntry {
        let dir = path.parent().unwrap_or(&self.root).to_path_buf();
        match graphql_config::load_raw_config(path) {
            Ok(raw) => {
                let chain = self.variable_chain(&dir);
                let config = Config::new(dir, Some(path.to_path_buf()), raw, &chain);
                ConfigEntry {
                    timestamp,
                    config: Some(Arc::new(config)),
                }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "config failed to load, keeping tombstone");
                ConfigEntry {
                    timestamp,
                    config: None,
                }
            }
        }
    }

    /// The resolution chain used for one config: the provider's overrides
    /// and missing-variable hook around the standard `.env`/process walk.
    fn variable_chain(&self, dir: &Path) -> VariableChain {
        let mut chain =
            VariableChain::new(dir, &self.root).with_overrides(self.overrides.clone());
        if let Some(hook) = &self.on_missing {
            let hook = Arc::clone(hook);
            chain = chain.with_on_missing(Box::new(move |name| hook(name)));
        }
        chain
    }

    /// All currently loaded configs, ordered by config file path.
    #[must_use]
    pub fn configs(&self) -> Vec<Arc<Config>> {
        let mut configs: Vec<(PathBuf, Arc<Config>)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .config
                    .clone()
                    .map(|config| (entry.key().clone(), config))
            })
            .collect();
        configs.sort_by(|a, b| a.0.cmp(&b.0));
        configs.into_iter().map(|(_, config)| config).collect()
    }

    /// The config file present in `dir`, by modern-then-legacy priority.
    /// Cached per directory until the next effective reload.
    #[must_use]
    pub fn find_config_file_in_directory(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(cached) = self.dir_cache.get(dir) {
            return cached.clone();
        }
        let found = graphql_config::find_config_file_in_directory(dir);
        self.dir_cache.insert(dir.to_path_buf(), found.clone());
        found
    }

    /// The nearest loaded config governing `file`, walking parent
    /// directories up to the root. Unparseable configs are skipped rather
    /// than stopping the walk.
    #[must_use]
    pub fn config_for_file(&self, file: &Path) -> Option<Arc<Config>> {
        for dir in self.ancestor_dirs(file) {
            if let Some(config) = self.loaded_config_in(&dir) {
                return Some(config);
            }
        }
        None
    }

    /// The (config, project name) pair owning `file`: the first ancestor
    /// directory whose config either explicitly matches the file or carries
    /// a catch-all project. Files outside every config resolve to `None`.
    #[must_use]
    pub fn resolve_project_config(&self, file: &Path) -> Option<(Arc<Config>, String)> {
        for dir in self.ancestor_dirs(file) {
            let Some(config) = self.loaded_config_in(&dir) else {
                continue;
            };
            if let Some(project) = config.project_for_file(file) {
                let name = project.name().to_string();
                return Some((config, name));
            }
        }
        None
    }

    fn loaded_config_in(&self, dir: &Path) -> Option<Arc<Config>> {
        let path = self.find_config_file_in_directory(dir)?;
        self.entries.get(&path).and_then(|entry| entry.config.clone())
    }

    /// Directories from the file's parent up to (and including) the root.
    fn ancestor_dirs(&self, file: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        let mut current = if file.is_dir() {
            Some(file)
        } else {
            file.parent()
        };
        while let Some(dir) = current {
            if !dir.starts_with(&self.root) {
                break;
            }
            dirs.push(dir.to_path_buf());
            if dir == self.root {
                break;
            }
            current = dir.parent();
        }
        dirs
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
