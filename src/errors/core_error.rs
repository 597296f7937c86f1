use ert_forward::{SerializationError, StatusError};
use ert_jobs::JobError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error de jobs: {0}")]
    Job(#[from] JobError),
    #[error("Error al serializar el forward model: {0}")]
    Serialization(#[from] SerializationError),
    #[error("Error al leer el status: {0}")]
    Status(#[from] StatusError),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
}

impl CoreError {
    /// Código de salida para la CLI: 2 para errores de entrada del usuario,
    /// 1 para el resto.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Job(_) | CoreError::Config(_) => 2,
            _ => 1,
        }
    }
}
