//! Errores del registro de jobs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    /// Definición de job mal formada. `source` identifica el archivo (o el
    /// nombre del job cuando se parsea texto en memoria).
    #[error("configuration error in {source_name}:{line}: {message}")]
    Configuration { source_name: String, line: usize, message: String },
    #[error("job '{0}' is already registered")]
    DuplicateJob(String),
    #[error("unknown job '{0}'")]
    UnknownJob(String),
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

impl JobError {
    pub(crate) fn config(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        Self::Configuration { source_name: source_name.to_string(),
                              line,
                              message: message.into() }
    }
}
