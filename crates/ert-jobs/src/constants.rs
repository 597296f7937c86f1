//! Constantes del formato declarativo de jobs.

/// Nombre asignado cuando un job no trae nombre explícito ni archivo de
/// origen del que derivarlo.
pub const DEFAULT_JOB_NAME: &str = "default_job_name";

/// Prefijo de comentario dentro de un archivo de configuración de job.
pub const COMMENT_PREFIX: &str = "--";

pub const MAX_RUNNING: &str = "MAX_RUNNING";
pub const STDIN: &str = "STDIN";
pub const STDOUT: &str = "STDOUT";
pub const STDERR: &str = "STDERR";
pub const EXECUTABLE: &str = "EXECUTABLE";
pub const TARGET_FILE: &str = "TARGET_FILE";
pub const ERROR_FILE: &str = "ERROR_FILE";
pub const START_FILE: &str = "START_FILE";
pub const ARGLIST: &str = "ARGLIST";
pub const ENV: &str = "ENV";
pub const MAX_RUNNING_MINUTES: &str = "MAX_RUNNING_MINUTES";
pub const MIN_ARG: &str = "MIN_ARG";
pub const MAX_ARG: &str = "MAX_ARG";
pub const ARG_TYPE: &str = "ARG_TYPE";
pub const DEFAULT: &str = "DEFAULT";
