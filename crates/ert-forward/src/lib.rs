//! ert-forward: ensamblado del forward model, manifest y status.
//!
//! Flujo típico de una corrida:
//! 1. `ForwardModel::new(&registry)` + `add_job` por cada job del pipeline.
//! 2. `write_manifest` resuelve sustituciones y escribe `jobs.json` en el
//!    directorio de la corrida.
//! 3. El runner externo ejecuta los jobs y escribe `status.json`.
//! 4. `ForwardModelStatus::try_load` (o `poll`) lo lee de vuelta.

pub mod constants;
pub mod env_varlist;
pub mod errors;
pub mod manifest;
pub mod model;
pub mod status;
pub mod substitution;

pub use constants::{JOBS_FILE, STATUS_FILE};
pub use env_varlist::EnvironmentVarlist;
pub use errors::{SerializationError, StatusError};
pub use manifest::{JobRecord, Manifest};
pub use model::{ForwardModel, JobOccurrence};
pub use status::{ForwardModelStatus, JobState, JobStatus, StatusLoad};
pub use substitution::SubstitutionList;
