//! # Mapa de Headers Ordenado
//! src/http/headers.rs
//!
//! Los headers se guardan en orden de inserción y ese orden se respeta al
//! escribirlos en el socket. Insertar un nombre repetido sobrescribe el valor
//! pero conserva la posición original.

/// Mapa nombre → valor que preserva el orden de inserción
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Crea un mapa vacío
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserta un header
    ///
    /// Si el nombre ya existe (comparación exacta, sensible a mayúsculas),
    /// se reemplaza el valor en su posición actual y se retorna el anterior.
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("Host", "a");
    /// headers.insert("Accept", "*/*");
    /// assert_eq!(headers.insert("Host", "b"), Some("a".to_string()));
    ///
    /// let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
    /// assert_eq!(names, vec!["Host", "Accept"]);
    /// ```
    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            return Some(std::mem::replace(&mut entry.1, value.to_string()));
        }
        self.entries.push((name.to_string(), value.to_string()));
        None
    }

    /// Obtiene el valor de un header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Itera los headers en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let mut headers = HeaderMap::new();
        headers.insert("Date", "1");
        headers.insert("Server", "2");
        headers.insert("Connection", "3");

        let collected: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(
            collected,
            vec![("Date", "1"), ("Server", "2"), ("Connection", "3")]
        );
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", "first");
        headers.insert("Accept", "*/*");
        let previous = headers.insert("Host", "second");

        assert_eq!(previous, Some("first".to_string()));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.iter().next(), Some(("Host", "second")));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", "a");
        headers.insert("HOST", "b");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Host"), Some("a"));
        assert!(!headers.contains("host"));
    }

    #[test]
    fn test_empty() {
        let headers = HeaderMap::new();
        assert!(headers.is_empty());
        assert_eq!(headers.get("Date"), None);
    }
}
