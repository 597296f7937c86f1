//! Lectura del `status.json` que escribe el runner.
//!
//! El archivo aparece en un momento arbitrario después de escribir el
//! manifest, y el runner no lo escribe de forma atómica. Por eso:
//! - archivo ausente → `StatusLoad::Absent` (estado normal, no error);
//! - archivo vacío o truncado → `StatusLoad::NotReady` (reintentar en el
//!   siguiente poll);
//! - contenido presente pero inválido → `StatusError::Malformed`.
//!
//! Los timestamps llegan como segundos epoch (float o null) y se exponen
//! como `DateTime<Utc>`; un null queda en `None`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::STATUS_FILE;
use crate::errors::StatusError;

/// Estado de un job según el runner. Valores desconocidos se conservan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    #[default]
    Waiting,
    Pending,
    Running,
    Success,
    Failure,
    Other(String),
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Waiting => "Waiting",
            JobState::Pending => "Pending",
            JobState::Running => "Running",
            JobState::Success => "Success",
            JobState::Failure => "Failure",
            JobState::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failure)
    }
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Waiting" => JobState::Waiting,
            "Pending" => JobState::Pending,
            "Running" => JobState::Running,
            "Success" => JobState::Success,
            "Failure" => JobState::Failure,
            _ => JobState::Other(value),
        }
    }
}

impl From<JobState> for String {
    fn from(value: JobState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: JobState,
    #[serde(default, with = "epoch_seconds")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "epoch_seconds")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub current_memory_usage: Option<u64>,
    #[serde(default)]
    pub max_memory_usage: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardModelStatus {
    #[serde(default)]
    pub run_id: String,
    #[serde(default, with = "epoch_seconds")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "epoch_seconds")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub jobs: Vec<JobStatus>,
}

/// Resultado de un intento de lectura del status.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLoad {
    /// Todavía no existe `status.json`.
    Absent,
    /// Existe pero está vacío o a medio escribir.
    NotReady,
    Ready(ForwardModelStatus),
}

impl StatusLoad {
    pub fn ready(self) -> Option<ForwardModelStatus> {
        match self {
            StatusLoad::Ready(status) => Some(status),
            _ => None,
        }
    }
}

impl ForwardModelStatus {
    pub fn path_in(run_path: &Path) -> PathBuf {
        run_path.join(STATUS_FILE)
    }

    /// Intenta leer `<run_path>/status.json`. Seguro de llamar repetidamente
    /// antes de que el runner haya escrito nada.
    pub fn try_load(run_path: &Path) -> Result<StatusLoad, StatusError> {
        let path = Self::path_in(run_path);
        // Bytes y no `String`: un corte a mitad de un carácter UTF-8 es otra
        // forma de archivo incompleto.
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StatusLoad::Absent),
            Err(source) => return Err(StatusError::Io { path, source }),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(StatusLoad::NotReady);
        }
        match serde_json::from_slice::<ForwardModelStatus>(&bytes) {
            Ok(status) => Ok(StatusLoad::Ready(status)),
            Err(e) if e.is_eof() => {
                debug!("status file {} is incomplete, retry later", path.display());
                Ok(StatusLoad::NotReady)
            }
            Err(source) => Err(StatusError::Malformed { path, source }),
        }
    }

    /// Repite `try_load` hasta `retries` veces adicionales mientras el status
    /// no esté listo, durmiendo `interval` entre intentos.
    pub fn poll(run_path: &Path, retries: u32, interval: Duration) -> Result<StatusLoad, StatusError> {
        let mut attempt = 0;
        loop {
            let load = Self::try_load(run_path)?;
            if matches!(load, StatusLoad::Ready(_)) || attempt >= retries {
                if !matches!(load, StatusLoad::Ready(_)) {
                    warn!("status for {} not available after {} attempts", run_path.display(), attempt + 1);
                }
                return Ok(load);
            }
            attempt += 1;
            std::thread::sleep(interval);
        }
    }

    pub fn job(&self, name: &str) -> Option<&JobStatus> {
        self.jobs.iter().find(|j| j.name == name)
    }

    pub fn failed_jobs(&self) -> impl Iterator<Item = &JobStatus> {
        self.jobs.iter().filter(|j| j.status == JobState::Failure)
    }

    /// La corrida terminó: el runner fijó `end_time`, o todos los jobs
    /// alcanzaron un estado terminal.
    pub fn is_complete(&self) -> bool {
        self.end_time.is_some() || (!self.jobs.is_empty() && self.jobs.iter().all(|j| j.status.is_terminal()))
    }
}

/// (De)serialización de `Option<DateTime<Utc>>` como segundos epoch en float.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_f64(ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1e9),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(secs) = Option::<f64>::deserialize(deserializer)? else { return Ok(None) };
        from_epoch(secs).map(Some)
                        .ok_or_else(|| de::Error::custom(format!("timestamp {secs} out of range")))
    }

    pub(super) fn from_epoch(secs: f64) -> Option<DateTime<Utc>> {
        if !secs.is_finite() {
            return None;
        }
        let whole = secs.floor();
        let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
        DateTime::<Utc>::from_timestamp(whole as i64, nanos)
    }
}
