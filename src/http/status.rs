//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! El servidor solo conoce cuatro códigos:
//!
//! - **200** OK
//! - **304** NOT MODIFIED
//! - **400** BAD REQUEST
//! - **404** NOT FOUND
//!
//! Cualquier otro código numérico se conserva tal cual en la respuesta,
//! pero su status line se muestra como `400 BAD REQUEST`.

use std::fmt;

/// Código de estado HTTP de una respuesta
///
/// Es un newtype sobre `u16` (y no un enum cerrado) porque una respuesta
/// puede llevar un código fuera del conjunto conocido sin que se reescriba.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK - El archivo existe y se envía completo
    pub const OK: StatusCode = StatusCode(200);

    /// 304 NOT MODIFIED
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);

    /// 400 BAD REQUEST - La request line o un header no cumple la gramática
    pub const BAD_REQUEST: StatusCode = StatusCode(400);

    /// 404 NOT FOUND - El archivo no existe o no es legible
    pub const NOT_FOUND: StatusCode = StatusCode(404);

    /// Crea un código desde su valor numérico, sin validarlo
    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::http::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::from_u16(500).as_u16(), 500);
    /// ```
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Retorna el reason phrase si el código pertenece al conjunto conocido
    pub fn reason_phrase(&self) -> Option<&'static str> {
        match self.0 {
            200 => Some("OK"),
            304 => Some("NOT MODIFIED"),
            400 => Some("BAD REQUEST"),
            404 => Some("NOT FOUND"),
            _ => None,
        }
    }

    /// Texto de la status line (sin el protocolo)
    ///
    /// Los códigos desconocidos se muestran como `400 BAD REQUEST`,
    /// aunque `as_u16()` siga retornando el valor original.
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::http::StatusCode;
    /// assert_eq!(StatusCode::NOT_FOUND.status_line(), "404 NOT FOUND");
    /// assert_eq!(StatusCode::from_u16(500).status_line(), "400 BAD REQUEST");
    /// ```
    pub fn status_line(&self) -> String {
        match self.reason_phrase() {
            Some(reason) => format!("{} {}", self.0, reason),
            None => "400 BAD REQUEST".to_string(),
        }
    }
}

impl fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::OK.as_u16(), 200);
        assert_eq!(StatusCode::NOT_MODIFIED.as_u16(), 304);
        assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
        assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(StatusCode::OK.reason_phrase(), Some("OK"));
        assert_eq!(StatusCode::NOT_MODIFIED.reason_phrase(), Some("NOT MODIFIED"));
        assert_eq!(StatusCode::from_u16(418).reason_phrase(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::OK.to_string(), "200 OK");
        assert_eq!(StatusCode::NOT_MODIFIED.to_string(), "304 NOT MODIFIED");
        assert_eq!(StatusCode::BAD_REQUEST.to_string(), "400 BAD REQUEST");
        assert_eq!(StatusCode::NOT_FOUND.to_string(), "404 NOT FOUND");
    }

    #[test]
    fn test_unknown_code_keeps_number_but_shows_bad_request() {
        let status = StatusCode::from_u16(500);
        assert_eq!(status.as_u16(), 500);
        assert_eq!(status.to_string(), "400 BAD REQUEST");
    }
}
