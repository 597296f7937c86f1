//! Forward model: secuencia ordenada de jobs de una corrida.
//!
//! El modelo toma prestado el `JobRegistry` (inmutable tras la carga), por lo
//! que cada ocurrencia guarda directamente la referencia a su definición.
//! Un mismo job puede repetirse; cada repetición recibe un índice propio por
//! nombre que sólo sirve para desambiguar stdout/stderr.

use std::fmt;

use ert_jobs::{JobDefinition, JobError, JobRegistry};
use log::debug;

use crate::substitution::SubstitutionList;

/// Una invocación concreta de un job dentro del forward model.
#[derive(Debug, Clone)]
pub struct JobOccurrence<'r> {
    job: &'r JobDefinition,
    index: usize,
    private_args: SubstitutionList,
}

impl<'r> JobOccurrence<'r> {
    pub fn name(&self) -> &str {
        self.job.name()
    }

    pub fn job(&self) -> &'r JobDefinition {
        self.job
    }

    /// Índice (base cero) de esta ocurrencia entre las del mismo nombre.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn private_args(&self) -> &SubstitutionList {
        &self.private_args
    }
}

pub struct ForwardModel<'r> {
    registry: &'r JobRegistry,
    occurrences: Vec<JobOccurrence<'r>>,
}

impl<'r> ForwardModel<'r> {
    pub fn new(registry: &'r JobRegistry) -> Self {
        Self { registry,
               occurrences: Vec::new() }
    }

    /// Añade una ocurrencia del job `name`. Falla si el registro no lo conoce.
    pub fn add_job(&mut self, name: &str) -> Result<(), JobError> {
        self.add_job_with_args(name, SubstitutionList::new())
    }

    /// Igual que `add_job` pero con argumentos privados de esta ocurrencia,
    /// que tienen precedencia sobre los `DEFAULT` del job y el contexto global.
    pub fn add_job_with_args(&mut self, name: &str, private_args: SubstitutionList) -> Result<(), JobError> {
        let job = self.registry.lookup(name)?;
        let index = self.occurrence_count(name);
        debug!("forward model: {name} occurrence {index} at position {}", self.occurrences.len());
        self.occurrences.push(JobOccurrence { job,
                                              index,
                                              private_args });
        Ok(())
    }

    pub fn occurrences(&self) -> &[JobOccurrence<'r>] {
        &self.occurrences
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Cuántas veces aparece `name` en el modelo.
    pub fn occurrence_count(&self, name: &str) -> usize {
        self.occurrences.iter().filter(|o| o.name() == name).count()
    }

    /// Sufijo para stdout/stderr: sólo cuando el job aparece más de una vez.
    pub fn stream_suffix(&self, occurrence: &JobOccurrence<'_>) -> Option<usize> {
        (self.occurrence_count(occurrence.name()) > 1).then_some(occurrence.index)
    }
}

impl fmt::Debug for ForwardModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let jobs: Vec<&str> = self.occurrences.iter().map(|o| o.name()).collect();
        f.debug_struct("ForwardModel").field("jobs", &jobs).finish()
    }
}
