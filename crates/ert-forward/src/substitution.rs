//! Lista de sustituciones `<TOKEN>` → valor.
//!
//! Se aplica sobre los campos de ruta y argumentos de cada job antes de
//! serializar. Al resolver un job se apilan varias listas, de la más
//! específica (argumentos privados de la ocurrencia) a la más general
//! (contexto global); la primera que define un token gana.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionList {
    entries: IndexMap<String, String>,
}

impl SubstitutionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Añade o reemplaza un token. Reemplazar conserva la posición original.
    pub fn add(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(token.into(), value.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reemplaza cada token en orden de inserción. Una sola pasada: un valor
    /// que contenga otro token sólo se expande si ese token viene después.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (token, value) in &self.entries {
            if out.contains(token.as_str()) {
                out = out.replace(token.as_str(), value);
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubstitutionList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = SubstitutionList::new();
        for (k, v) in iter {
            list.add(k, v);
        }
        list
    }
}

/// Aplica varias listas en orden de precedencia (la primera es la más
/// específica).
pub fn substitute_layers(text: &str, layers: &[&SubstitutionList]) -> String {
    layers.iter().fold(text.to_string(), |acc, layer| layer.substitute(&acc))
}
