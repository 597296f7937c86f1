use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Literales booleanos válidos, sin distinguir mayúsculas.
const BOOL_LITERALS: [&str; 6] = ["true", "t", "1", "false", "f", "0"];

/// Tipo declarado de un argumento posicional (`ARG_TYPE <idx> <TIPO>`).
///
/// Los tipos `RUNTIME_*` sólo pueden validarse cuando el runner ejecuta el
/// job; los demás se comprueban al cargar si el argumento es un literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArgType {
    Int,
    Float,
    String,
    Bool,
    RuntimeFile,
    RuntimeInt,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::Int => "INT",
            ArgType::Float => "FLOAT",
            ArgType::String => "STRING",
            ArgType::Bool => "BOOL",
            ArgType::RuntimeFile => "RUNTIME_FILE",
            ArgType::RuntimeInt => "RUNTIME_INT",
        }
    }

    /// Comprueba un argumento literal contra el tipo. Tipos de runtime y
    /// `STRING` aceptan cualquier valor.
    pub fn accepts_literal(&self, value: &str) -> bool {
        match self {
            ArgType::Int => value.parse::<i64>().is_ok(),
            ArgType::Float => value.parse::<f64>().is_ok(),
            ArgType::Bool => BOOL_LITERALS.iter().any(|b| value.eq_ignore_ascii_case(b)),
            ArgType::String | ArgType::RuntimeFile | ArgType::RuntimeInt => true,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INT" => Ok(ArgType::Int),
            "FLOAT" => Ok(ArgType::Float),
            "STRING" => Ok(ArgType::String),
            "BOOL" => Ok(ArgType::Bool),
            "RUNTIME_FILE" => Ok(ArgType::RuntimeFile),
            "RUNTIME_INT" => Ok(ArgType::RuntimeInt),
            other => Err(format!("unknown argument type '{other}'")),
        }
    }
}
