use thiserror::Error;

/// Config loading and schema reading are lenient by design (tombstones,
/// skipped files); only the watcher setup can fail hard.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to start file watcher")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, ProjectError>;
