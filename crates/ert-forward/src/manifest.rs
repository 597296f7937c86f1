//! Manifest (`jobs.json`) consumido por el runner externo.
//!
//! Los nombres de campo son el contrato con runners existentes y no deben
//! cambiar: `jobList`, `argList`, `global_environment`, `global_update_path`,
//! `DATA_ROOT`. La construcción es pura (`ForwardModel::manifest`); la
//! escritura sólo ocurre si todo el manifest pudo resolverse, de modo que
//! nunca queda un manifest parcial en disco.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ert_jobs::{ArgType, JobDefinition};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::constants::JOBS_FILE;
use crate::env_varlist::EnvironmentVarlist;
use crate::errors::SerializationError;
use crate::model::{ForwardModel, JobOccurrence};
use crate::substitution::{substitute_layers, SubstitutionList};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "DATA_ROOT")]
    pub data_root: String,
    pub global_environment: IndexMap<String, String>,
    #[serde(default)]
    pub global_update_path: IndexMap<String, String>,
    #[serde(rename = "jobList")]
    pub job_list: Vec<JobRecord>,
    pub run_id: String,
    #[serde(default)]
    pub ert_pid: String,
}

/// Un job resuelto, listo para el runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,
    pub executable: String,
    pub target_file: Option<String>,
    pub error_file: Option<String>,
    pub start_file: Option<String>,
    pub stdout: String,
    pub stderr: String,
    pub stdin: Option<String>,
    pub license_path: Option<String>,
    pub max_running_minutes: u32,
    pub max_running: u32,
    #[serde(rename = "argList")]
    pub arg_list: Vec<String>,
    pub environment: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_arg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_arg: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arg_types: Vec<ArgType>,
}

impl Manifest {
    pub fn path_in(run_path: &Path) -> PathBuf {
        run_path.join(JOBS_FILE)
    }

    /// Escribe el manifest en `<run_path>/jobs.json`, reemplazando cualquier
    /// manifest previo. Se escribe a un temporal del mismo directorio y se
    /// renombra; si algo falla el temporal se borra al soltarlo.
    pub fn write_to(&self, run_path: &Path) -> Result<PathBuf, SerializationError> {
        let path = Self::path_in(run_path);
        let body = serde_json::to_string_pretty(self)?;
        let io_err = |source| SerializationError::Io { path: path.clone(),
                                                       source };

        let mut tmp = NamedTempFile::new_in(run_path).map_err(io_err)?;
        tmp.write_all(body.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        debug!("manifest for run {} written to {} ({} jobs)", self.run_id, path.display(), self.job_list.len());
        Ok(path)
    }

    /// Lee un manifest previamente escrito.
    pub fn load(run_path: &Path) -> Result<Self, SerializationError> {
        let path = Self::path_in(run_path);
        let text = fs::read_to_string(&path).map_err(|source| SerializationError::Io { path: path.clone(),
                                                                                      source })?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ForwardModel<'_> {
    /// Resuelve todas las ocurrencias y arma el manifest en memoria.
    pub fn manifest(&self,
                    run_id: &str,
                    data_root: &str,
                    global_args: &SubstitutionList,
                    varlist: &EnvironmentVarlist)
                    -> Result<Manifest, SerializationError> {
        let global_environment = varlist.expanded()?;
        let job_list = self.occurrences()
                           .iter()
                           .map(|occ| self.resolve_occurrence(occ, global_args))
                           .collect::<Result<Vec<_>, _>>()?;

        Ok(Manifest { data_root: data_root.to_string(),
                      global_environment,
                      global_update_path: varlist.update_path_section(),
                      job_list,
                      run_id: run_id.to_string(),
                      ert_pid: std::process::id().to_string() })
    }

    /// Construye el manifest y lo escribe en `run_path`. Si la construcción
    /// falla no se escribe nada.
    pub fn write_manifest(&self,
                          run_path: &Path,
                          run_id: &str,
                          data_root: &str,
                          global_args: &SubstitutionList,
                          varlist: &EnvironmentVarlist)
                          -> Result<PathBuf, SerializationError> {
        let manifest = self.manifest(run_id, data_root, global_args, varlist)?;
        manifest.write_to(run_path)
    }

    fn resolve_occurrence(&self,
                          occ: &JobOccurrence<'_>,
                          global_args: &SubstitutionList)
                          -> Result<JobRecord, SerializationError> {
        let job = occ.job();
        let defaults: SubstitutionList = job.private_defaults().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let layers = [occ.private_args(), &defaults, global_args];
        let subst = |text: &str| substitute_layers(text, &layers);
        let subst_opt = |value: Option<&str>| value.map(subst);

        let executable = job.executable()
                            .map(subst)
                            .filter(|exe| !exe.trim().is_empty())
                            .ok_or_else(|| SerializationError::MissingExecutable(job.name().to_string()))?;

        let suffix = self.stream_suffix(occ);
        let stream = |base: String| match suffix {
            Some(i) => format!("{base}.{i}"),
            None => base,
        };

        Ok(JobRecord { name: job.name().to_string(),
                       executable,
                       target_file: subst_opt(job.target_file()),
                       error_file: subst_opt(job.error_file()),
                       start_file: subst_opt(job.start_file()),
                       stdout: stream(subst(job.stdout_file().as_str())),
                       stderr: stream(subst(job.stderr_file().as_str())),
                       stdin: subst_opt(job.stdin_file()),
                       license_path: job.license_path().map(str::to_string),
                       max_running_minutes: job.max_running_minutes(),
                       max_running: job.max_running(),
                       arg_list: job.arglist().iter().map(|a| subst(a.as_str())).collect(),
                       environment: job_environment(job, &subst),
                       min_arg: job.min_arg(),
                       max_arg: job.max_arg(),
                       arg_types: job.arg_types().to_vec() })
    }
}

/// Entorno propio del job (no hereda el global). `None` si no declara ninguno.
fn job_environment(job: &JobDefinition, subst: &dyn Fn(&str) -> String) -> Option<IndexMap<String, String>> {
    if job.environment().is_empty() {
        return None;
    }
    Some(job.environment().iter().map(|(k, v)| (k.clone(), subst(v.as_str()))).collect())
}
