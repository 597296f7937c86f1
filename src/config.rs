//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone una estructura
//! inmutable (`CONFIG`) con los valores por defecto de la CLI: directorio de
//! jobs, raíz de licencias y parámetros de polling del status.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;

pub const ENV_JOB_DIR: &str = "ERT_JOB_DIR";
pub const ENV_LICENSE_ROOT: &str = "ERT_LICENSE_ROOT";
pub const ENV_STATUS_RETRIES: &str = "ERT_STATUS_RETRIES";
pub const ENV_STATUS_INTERVAL_MS: &str = "ERT_STATUS_INTERVAL_MS";

const DEFAULT_STATUS_RETRIES: u32 = 10;
const DEFAULT_STATUS_INTERVAL_MS: u64 = 500;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directorio con las definiciones de jobs (`ERT_JOB_DIR`).
    pub job_dir: Option<PathBuf>,
    /// Raíz bajo la cual se calcula `license_path` de cada job.
    pub license_root: Option<PathBuf>,
    /// Reintentos adicionales al esperar `status.json`.
    pub status_retries: u32,
    pub status_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { job_dir: None,
               license_root: None,
               status_retries: DEFAULT_STATUS_RETRIES,
               status_interval: Duration::from_millis(DEFAULT_STATUS_INTERVAL_MS) }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables. Valores numéricos inválidos caen al default con un aviso.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let number = |key: &str, default: u64| match lookup(key) {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                                                      warn!("{key}='{raw}' is not a number, using {default}");
                                                      default
                                                  }),
            None => default,
        };

        let retries = number(ENV_STATUS_RETRIES, u64::from(DEFAULT_STATUS_RETRIES));
        Self { job_dir: path(ENV_JOB_DIR),
               license_root: path(ENV_LICENSE_ROOT),
               status_retries: u32::try_from(retries).unwrap_or(u32::MAX),
               status_interval: Duration::from_millis(number(ENV_STATUS_INTERVAL_MS, DEFAULT_STATUS_INTERVAL_MS)) }
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
