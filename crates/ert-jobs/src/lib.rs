//! ert-jobs: definiciones de jobs externos y su registro.
//!
//! Un job se describe en un archivo declarativo (`EXECUTABLE`, `ARGLIST`,
//! `ENV`, límites, tipos de argumento...) que se carga una única vez en un
//! `JobDefinition` inmutable. El `JobRegistry` agrupa las definiciones por
//! nombre y es la fuente que consulta el forward model.

pub mod arg_type;
pub mod constants;
pub mod definition;
pub mod errors;
pub mod parser;
pub mod registry;

pub use arg_type::ArgType;
pub use constants::DEFAULT_JOB_NAME;
pub use definition::JobDefinition;
pub use errors::JobError;
pub use registry::JobRegistry;
