//! ertflow: descripción de jobs del forward model, manifest y status.
//!
//! Este crate actúa como fachada de los crates del workspace:
//! - `ert_jobs`: definiciones de jobs, parser de configuración y registro.
//! - `ert_forward`: forward model, sustitución, manifest `jobs.json` y
//!   lectura de `status.json`.
//!
//! Además expone `config` (variables de entorno) y `errors::CoreError`, que
//! agrupa los errores de ambos crates para los binarios.

pub mod config;
pub mod errors;

pub use ert_forward;
pub use ert_jobs;

use std::path::Path;

use ert_jobs::JobRegistry;
use errors::CoreError;
use log::debug;

/// Carga todas las definiciones de `job_dir` en un registro nuevo.
pub fn load_registry(job_dir: &Path, license_root: Option<&Path>) -> Result<JobRegistry, CoreError> {
    if !job_dir.is_dir() {
        return Err(CoreError::Config(format!("job directory {} does not exist", job_dir.display())));
    }
    let mut registry = JobRegistry::new();
    let loaded = registry.load_dir(job_dir, license_root)?;
    debug!("{loaded} jobs loaded from {}", job_dir.display());
    Ok(registry)
}
