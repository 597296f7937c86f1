//! Errores de núcleo de la aplicación.

pub mod core_error;

pub use core_error::CoreError;
