//! Entorno global de la corrida (`global_environment`) y rutas a anteponer
//! (`global_update_path`).
//!
//! Los valores pueden referenciar otras variables de la lista con `$NAME` o
//! `${NAME}`. Antes de serializar se resuelven recursivamente; una
//! referencia a una variable fuera de la lista, o a la propia variable
//! (`PATH=/opt/bin:$PATH`), se deja literal para que la expanda el runner
//! con el entorno del proceso. Los ciclos entre variables distintas no se
//! admiten y se reportan como error.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::constants::PATH_SEPARATOR;
use crate::errors::SerializationError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentVarlist {
    vars: IndexMap<String, String>,
    update_paths: IndexMap<String, Vec<String>>,
}

impl EnvironmentVarlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, var: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(var.into(), value.into());
    }

    /// Registra `path` para anteponerlo a la variable `var` en el runner.
    pub fn update_path(&mut self, var: impl Into<String>, path: impl Into<String>) {
        self.update_paths.entry(var.into()).or_default().push(path.into());
    }

    pub fn get(&self, var: &str) -> Option<&str> {
        self.vars.get(var).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables con las referencias internas resueltas, en orden de
    /// inserción.
    pub fn expanded(&self) -> Result<IndexMap<String, String>, SerializationError> {
        let mut resolved: IndexMap<String, String> = IndexMap::new();
        for name in self.vars.keys() {
            let mut visiting = HashSet::new();
            self.resolve(name, &mut resolved, &mut visiting)?;
        }
        // `resolve` inserta en orden de dependencia; se devuelve en el de la lista.
        Ok(self.vars
               .keys()
               .map(|k| (k.clone(), resolved.get(k).cloned().unwrap_or_default()))
               .collect())
    }

    /// Sección `global_update_path`: una entrada por variable, rutas unidas
    /// con `:` en el orden en que se registraron.
    pub fn update_path_section(&self) -> IndexMap<String, String> {
        self.update_paths
            .iter()
            .map(|(var, paths)| (var.clone(), paths.join(PATH_SEPARATOR)))
            .collect()
    }

    fn resolve(&self,
               name: &str,
               resolved: &mut IndexMap<String, String>,
               visiting: &mut HashSet<String>)
               -> Result<String, SerializationError> {
        if let Some(done) = resolved.get(name) {
            return Ok(done.clone());
        }
        if !visiting.insert(name.to_string()) {
            return Err(SerializationError::CyclicEnvironment(name.to_string()));
        }
        let raw = self.vars.get(name).cloned().unwrap_or_default();

        let mut out = String::with_capacity(raw.len());
        for piece in scan_references(&raw) {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Ref { name: r, literal } => {
                    if r != name && self.vars.contains_key(r) {
                        out.push_str(&self.resolve(r, resolved, visiting)?);
                    } else {
                        out.push_str(literal);
                    }
                }
            }
        }

        visiting.remove(name);
        resolved.insert(name.to_string(), out.clone());
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvironmentVarlist {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = EnvironmentVarlist::new();
        for (k, v) in iter {
            list.set(k, v);
        }
        list
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Ref { name: &'a str, literal: &'a str },
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parte un valor en texto plano y referencias `$NAME` / `${NAME}`.
fn scan_references(value: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    let bytes = value.as_bytes();

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let rest = &value[i + 1..];
        let (name, consumed) = if let Some(braced) = rest.strip_prefix('{') {
            match braced.find('}') {
                Some(end) if end > 0 && braced[..end].chars().all(is_name_char) => (&braced[..end], end + 2),
                _ => ("", 0),
            }
        } else {
            let len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
            (&rest[..len], len)
        };
        if name.is_empty() {
            i += 1;
            continue;
        }
        if text_start < i {
            pieces.push(Piece::Text(&value[text_start..i]));
        }
        let end = i + 1 + consumed;
        pieces.push(Piece::Ref { name, literal: &value[i..end] });
        i = end;
        text_start = end;
    }
    if text_start < value.len() {
        pieces.push(Piece::Text(&value[text_start..]));
    }
    pieces
}
