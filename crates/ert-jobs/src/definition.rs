//! Definición estática de un job externo del forward model.
//!
//! Un `JobDefinition` se construye una sola vez al cargar la configuración
//! (ver `parser`) y es de sólo lectura a partir de ahí. Los campos opcionales
//! se guardan tal cual vienen del archivo; los defaults documentados se
//! aplican en los accessors para que el serializador y los tests vean el
//! mismo valor.

use std::path::Path;

use indexmap::IndexMap;

use crate::arg_type::ArgType;
use crate::errors::JobError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    pub(crate) name: String,
    pub(crate) executable: Option<String>,
    pub(crate) target_file: Option<String>,
    pub(crate) error_file: Option<String>,
    pub(crate) start_file: Option<String>,
    pub(crate) stdin: Option<String>,
    pub(crate) stdout: Option<String>,
    pub(crate) stderr: Option<String>,
    pub(crate) arglist: Vec<String>,
    pub(crate) environment: IndexMap<String, String>,
    pub(crate) max_running_minutes: u32,
    pub(crate) max_running: u32,
    pub(crate) license_path: Option<String>,
    pub(crate) min_arg: Option<u32>,
    pub(crate) max_arg: Option<u32>,
    pub(crate) arg_types: Vec<ArgType>,
    pub(crate) private_defaults: IndexMap<String, String>,
}

impl JobDefinition {
    /// Job vacío con nombre dado; todos los opcionales en su default.
    pub(crate) fn empty(name: &str) -> Self {
        Self { name: name.to_string(),
               executable: None,
               target_file: None,
               error_file: None,
               start_file: None,
               stdin: None,
               stdout: None,
               stderr: None,
               arglist: Vec::new(),
               environment: IndexMap::new(),
               max_running_minutes: 0,
               max_running: 0,
               license_path: None,
               min_arg: None,
               max_arg: None,
               arg_types: Vec::new(),
               private_defaults: IndexMap::new() }
    }

    /// Carga un job desde su archivo de configuración. Sin `name` explícito,
    /// el nombre del archivo pasa a ser el nombre del job.
    pub fn from_file(path: &Path, name: Option<&str>, license_root: Option<&Path>) -> Result<Self, JobError> {
        let text = std::fs::read_to_string(path).map_err(|source| JobError::Io { path: path.to_path_buf(),
                                                                                  source })?;
        let file_name = path.file_name().map(|f| f.to_string_lossy().into_owned());
        let name = name.map(str::to_string).or(file_name);
        crate::parser::parse_job(&text,
                                 &path.display().to_string(),
                                 name.as_deref(),
                                 path.parent(),
                                 license_root)
    }

    /// Parsea una definición desde texto en memoria. Sin `name` se usa
    /// `DEFAULT_JOB_NAME`.
    pub fn parse(text: &str, name: Option<&str>, license_root: Option<&Path>) -> Result<Self, JobError> {
        let source_name = name.unwrap_or(crate::constants::DEFAULT_JOB_NAME).to_string();
        crate::parser::parse_job(text, &source_name, name, None, license_root)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executable(&self) -> Option<&str> {
        self.executable.as_deref()
    }

    pub fn target_file(&self) -> Option<&str> {
        self.target_file.as_deref()
    }

    pub fn error_file(&self) -> Option<&str> {
        self.error_file.as_deref()
    }

    pub fn start_file(&self) -> Option<&str> {
        self.start_file.as_deref()
    }

    pub fn stdin_file(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    /// Stdout configurado o `<name>.stdout`.
    pub fn stdout_file(&self) -> String {
        self.stdout.clone().unwrap_or_else(|| format!("{}.stdout", self.name))
    }

    /// Stderr configurado o `<name>.stderr`.
    pub fn stderr_file(&self) -> String {
        self.stderr.clone().unwrap_or_else(|| format!("{}.stderr", self.name))
    }

    pub fn arglist(&self) -> &[String] {
        &self.arglist
    }

    pub fn environment(&self) -> &IndexMap<String, String> {
        &self.environment
    }

    pub fn max_running_minutes(&self) -> u32 {
        self.max_running_minutes
    }

    pub fn max_running(&self) -> u32 {
        self.max_running
    }

    pub fn license_path(&self) -> Option<&str> {
        self.license_path.as_deref()
    }

    pub fn min_arg(&self) -> Option<u32> {
        self.min_arg
    }

    pub fn max_arg(&self) -> Option<u32> {
        self.max_arg
    }

    /// Tipos declarados, densos por índice (huecos = `STRING`). Vacío si el
    /// job no declara ningún `ARG_TYPE`.
    pub fn arg_types(&self) -> &[ArgType] {
        &self.arg_types
    }

    /// Valores `DEFAULT <KEY> <VALUE>` del job.
    pub fn private_defaults(&self) -> &IndexMap<String, String> {
        &self.private_defaults
    }
}
