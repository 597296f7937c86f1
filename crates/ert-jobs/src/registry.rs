//! Registro de jobs disponibles (append-only durante la carga).

use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use crate::definition::JobDefinition;
use crate::errors::JobError;

/// Colección nombrada de `JobDefinition`. Conserva el orden de registro.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: IndexMap<String, JobDefinition>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un job bajo su propio nombre. Falla si el nombre ya existe.
    pub fn register(&mut self, definition: JobDefinition) -> Result<(), JobError> {
        let name = definition.name().to_string();
        if self.jobs.contains_key(&name) {
            return Err(JobError::DuplicateJob(name));
        }
        debug!("registering job {name}");
        self.jobs.insert(name, definition);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&JobDefinition, JobError> {
        self.jobs.get(name).ok_or_else(|| JobError::UnknownJob(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Carga cada archivo regular de `dir` como un job (nombre = nombre del
    /// archivo), en orden alfabético. Devuelve cuántos jobs se registraron.
    pub fn load_dir(&mut self, dir: &Path, license_root: Option<&Path>) -> Result<usize, JobError> {
        let io_err = |source| JobError::Io { path: dir.to_path_buf(),
                                             source };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        for path in &files {
            self.register(JobDefinition::from_file(path, None, license_root)?)?;
        }
        debug!("loaded {} jobs from {}", files.len(), dir.display());
        Ok(files.len())
    }
}
