//! Errores del forward model: serialización del manifest y lectura de status.

use std::path::PathBuf;

use thiserror::Error;

/// Fallos al construir o escribir el manifest. Todos se detectan antes de
/// tocar el disco salvo `Io`.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("job '{0}' has no executable")]
    MissingExecutable(String),
    #[error("environment variable '{0}' is part of a reference cycle")]
    CyclicEnvironment(String),
    #[error("manifest encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not write {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// Fallos al leer el status del runner. La ausencia del archivo NO es un
/// error (ver `StatusLoad::Absent`).
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("malformed status file {path}: {source}")]
    Malformed { path: PathBuf, #[source] source: serde_json::Error },
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}
