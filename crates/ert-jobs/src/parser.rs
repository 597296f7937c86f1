//! Parser del formato declarativo de jobs (`KEYWORD valor...` por línea).
//!
//! El parseo se hace en dos fases: primero se recorren las líneas y se
//! acumulan los valores crudos en un `JobDefinition`; después `validate`
//! comprueba las invariantes que involucran varias claves (aridad, tipos).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::arg_type::ArgType;
use crate::constants::{self, DEFAULT_JOB_NAME};
use crate::definition::JobDefinition;
use crate::errors::JobError;

/// Divide una línea en tokens respetando comillas simples y dobles. Un token
/// que empieza con `--` fuera de comillas corta la línea (comentario).
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                if !in_token && line[i..].starts_with(constants::COMMENT_PREFIX) {
                    break;
                }
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

pub(crate) fn parse_job(text: &str,
                        source_name: &str,
                        name: Option<&str>,
                        config_dir: Option<&Path>,
                        license_root: Option<&Path>)
                        -> Result<JobDefinition, JobError> {
    let name = name.unwrap_or(DEFAULT_JOB_NAME);
    let mut job = JobDefinition::empty(name);
    let mut declared_types: BTreeMap<usize, ArgType> = BTreeMap::new();
    let mut lines = KeyLines::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let tokens = tokenize(raw);
        let Some((keyword, values)) = tokens.split_first() else { continue };
        let err = |msg: String| JobError::config(source_name, line_no, msg);

        match keyword.as_str() {
            constants::MAX_RUNNING => job.max_running = parse_limit(keyword, values).map_err(err)?,
            constants::MAX_RUNNING_MINUTES => job.max_running_minutes = parse_limit(keyword, values).map_err(err)?,
            constants::MIN_ARG => {
                job.min_arg = Some(parse_limit(keyword, values).map_err(err)?);
                lines.min_arg = line_no;
            }
            constants::MAX_ARG => {
                job.max_arg = Some(parse_limit(keyword, values).map_err(err)?);
                lines.max_arg = line_no;
            }
            constants::STDIN => job.stdin = Some(single(keyword, values).map_err(err)?),
            constants::STDOUT => job.stdout = Some(single(keyword, values).map_err(err)?),
            constants::STDERR => job.stderr = Some(single(keyword, values).map_err(err)?),
            constants::TARGET_FILE => job.target_file = Some(single(keyword, values).map_err(err)?),
            constants::ERROR_FILE => job.error_file = Some(single(keyword, values).map_err(err)?),
            constants::START_FILE => job.start_file = Some(single(keyword, values).map_err(err)?),
            constants::EXECUTABLE => {
                let raw_exe = single(keyword, values).map_err(err)?;
                job.executable = Some(resolve_executable(&raw_exe, config_dir));
            }
            constants::ARGLIST => {
                if values.is_empty() {
                    return Err(err(format!("{keyword} requires at least one argument")));
                }
                job.arglist = values.to_vec();
                lines.arglist = line_no;
            }
            constants::ENV => {
                let (var, value) = key_value(keyword, values).map_err(err)?;
                job.environment.insert(var, value);
            }
            constants::DEFAULT => {
                let (key, value) = key_value(keyword, values).map_err(err)?;
                job.private_defaults.insert(key, value);
            }
            constants::ARG_TYPE => {
                let (index, arg_type) = parse_arg_type(values).map_err(err)?;
                lines.arg_types.insert(index, line_no);
                if declared_types.insert(index, arg_type).is_some() {
                    return Err(err(format!("{keyword} index {index} declared more than once")));
                }
            }
            other => warn!("{source_name}:{line_no}: ignoring unknown keyword {other}"),
        }
    }

    if let Some(&max_index) = declared_types.keys().next_back() {
        job.arg_types = (0..=max_index).map(|i| declared_types.get(&i).copied().unwrap_or(ArgType::String))
                                       .collect();
    }
    if let Some(root) = license_root {
        job.license_path = Some(root.join(&job.name).display().to_string());
    }

    validate(&job, source_name, &lines)?;
    debug!("loaded job {} from {source_name} (args={}, env={})",
           job.name,
           job.arglist.len(),
           job.environment.len());
    Ok(job)
}

/// Línea en la que se declaró cada clave que participa en `validate`.
#[derive(Debug, Default)]
struct KeyLines {
    arglist: usize,
    min_arg: usize,
    max_arg: usize,
    arg_types: BTreeMap<usize, usize>,
}

fn validate(job: &JobDefinition, source_name: &str, lines: &KeyLines) -> Result<(), JobError> {
    let err_at = |line: usize, msg: String| JobError::config(source_name, line, msg);
    let err = |msg: String| err_at(lines.arglist, msg);

    if let (Some(min), Some(max)) = (job.min_arg, job.max_arg) {
        if min > max {
            // La segunda de las dos declaraciones es la que entra en conflicto.
            return Err(err_at(lines.min_arg.max(lines.max_arg),
                              format!("MIN_ARG {min} is larger than MAX_ARG {max}")));
        }
    }
    if let Some(max) = job.max_arg {
        if job.arg_types.len() > max as usize {
            let index = job.arg_types.len() - 1;
            let line = lines.arg_types.get(&index).copied().unwrap_or(lines.max_arg);
            return Err(err_at(line, format!("ARG_TYPE index {index} outside MAX_ARG {max}")));
        }
    }
    if !job.arglist.is_empty() {
        let count = job.arglist.len() as u32;
        if job.min_arg.is_some_and(|min| count < min) || job.max_arg.is_some_and(|max| count > max) {
            return Err(err(format!("ARGLIST has {count} arguments, expected between {} and {}",
                                   job.min_arg.unwrap_or(0),
                                   job.max_arg.map(|m| m.to_string()).unwrap_or_else(|| "unbounded".into()))));
        }
    }
    for (i, (arg, t)) in job.arglist.iter().zip(job.arg_types.iter()).enumerate() {
        if is_literal(arg) && !t.accepts_literal(arg) {
            return Err(err(format!("argument {i} '{arg}' is not a valid {t}")));
        }
    }
    Ok(())
}

/// Un argumento es literal si no lleva marcadores de sustitución.
fn is_literal(arg: &str) -> bool {
    !arg.contains('<') && !arg.contains('$')
}

fn single(keyword: &str, values: &[String]) -> Result<String, String> {
    match values {
        [v] => Ok(v.clone()),
        [] => Err(format!("{keyword} requires a value")),
        _ => Err(format!("{keyword} takes exactly one value, got {}", values.len())),
    }
}

fn parse_limit(keyword: &str, values: &[String]) -> Result<u32, String> {
    let raw = single(keyword, values)?;
    raw.parse::<u32>()
       .map_err(|_| format!("{keyword} expects a non-negative integer, got '{raw}'"))
}

fn key_value(keyword: &str, values: &[String]) -> Result<(String, String), String> {
    match values {
        [key, rest @ ..] if !rest.is_empty() => Ok((key.clone(), rest.join(" "))),
        _ => Err(format!("{keyword} requires a name and a value")),
    }
}

fn parse_arg_type(values: &[String]) -> Result<(usize, ArgType), String> {
    match values {
        [index, kind] => {
            let index = index.parse::<usize>()
                             .map_err(|_| format!("ARG_TYPE index must be a non-negative integer, got '{index}'"))?;
            Ok((index, kind.parse::<ArgType>()?))
        }
        _ => Err("ARG_TYPE requires an index and a type".to_string()),
    }
}

/// Resuelve el ejecutable: absoluto tal cual; relativo al directorio del
/// archivo si existe ahí; si no, búsqueda en `PATH`. Un valor con marcadores
/// `<...>` se deja para la sustitución al serializar.
pub fn resolve_executable(raw: &str, config_dir: Option<&Path>) -> String {
    let path = Path::new(raw);
    if path.is_absolute() || raw.contains('<') {
        return raw.to_string();
    }
    if let Some(dir) = config_dir {
        let candidate = dir.join(path);
        if candidate.is_file() {
            return absolutize(candidate).display().to_string();
        }
    }
    if path.components().count() == 1 {
        if let Some(found) = search_path(raw) {
            return found.display().to_string();
        }
    }
    warn!("executable '{raw}' not found, keeping it verbatim");
    raw.to_string()
}

fn search_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).map(|dir| dir.join(program))
                                 .find(|candidate| candidate.is_file())
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
}
