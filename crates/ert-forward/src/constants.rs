//! Nombres fijos del contrato con el runner externo.

/// Manifest escrito en el directorio de la corrida y leído por el runner.
pub const JOBS_FILE: &str = "jobs.json";

/// Status que el runner escribe (no atómicamente) en el mismo directorio.
pub const STATUS_FILE: &str = "status.json";

/// Separador usado al unir entradas de `global_update_path`.
pub const PATH_SEPARATOR: &str = ":";
