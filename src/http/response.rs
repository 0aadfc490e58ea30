//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo arma la status line, los headers estándar y el body de una
//! respuesta, y la escribe en el socket en dos pasos: primero el bloque de
//! headers completo, después el body crudo.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Date: Fri, 16 Oct 2026 10:00:00 GMT\r\n
//! Server: JamesServ/4.5k\r\n
//! Last-Modified: Fri, 16 Oct 2026 10:00:00 GMT\r\n
//! Content-Length: 13\r\n
//! Connection: close\r\n
//! \r\n
//! <html>...</html>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use static_server::http::{Response, StatusCode};
//!
//! let response = Response::not_found("HTTP/1.1", "JamesServ/4.5k");
//!
//! let mut wire = Vec::new();
//! response.transmit(&mut wire).unwrap();
//! assert!(wire.starts_with(b"HTTP/1.1 404 NOT FOUND\r\n"));
//! ```

use super::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use std::io::{self, Write};

/// Body de las respuestas 400
pub const BAD_REQUEST_BODY: &[u8] = b"400 BAD REQUEST\n";

/// Body de las respuestas 404
pub const NOT_FOUND_BODY: &[u8] = b"404 NOT FOUND\n";

/// Protocolo usado cuando el request no llegó a parsearse
pub const FALLBACK_PROTOCOL: &str = "HTTP/1.1";

/// Formatea un instante al estilo RFC 1123 (`Fri, 16 Oct 2026 10:00:00 GMT`)
pub fn http_date(instant: DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Timestamp actual en formato de header HTTP
pub fn current_timestamp() -> String {
    http_date(Utc::now())
}

/// Representa una respuesta HTTP
#[derive(Debug, Clone)]
pub struct Response {
    /// Protocolo con el que se responde (el mismo que envió el cliente)
    protocol_version: String,

    /// Código de estado
    status: StatusCode,

    /// Headers en orden de inserción
    headers: HeaderMap,

    /// Body; `None` hasta que se asigna
    body: Option<Vec<u8>>,
}

impl Response {
    /// Crea una respuesta vacía, sin headers ni body
    pub fn new(protocol_version: &str, status: StatusCode) -> Self {
        Self {
            protocol_version: protocol_version.to_string(),
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Respuesta 200 con el contenido del archivo
    ///
    /// `Last-Modified` lleva el momento en que se construye la respuesta,
    /// no la fecha de modificación del archivo.
    pub fn ok(protocol_version: &str, server: &str, content: Vec<u8>) -> Self {
        let mut response = Self::new(protocol_version, StatusCode::OK);
        let length = content.len();
        response.set_body(content);
        response.add_standard_headers(server, Some(&current_timestamp()), Some(length));
        response
    }

    /// Respuesta 404 (`Content-Length: null`)
    pub fn not_found(protocol_version: &str, server: &str) -> Self {
        let mut response = Self::new(protocol_version, StatusCode::NOT_FOUND);
        response.set_body(NOT_FOUND_BODY.to_vec());
        response.add_standard_headers(server, None, None);
        response
    }

    /// Respuesta 400 (`Content-Length: null`)
    ///
    /// Siempre usa `HTTP/1.1` porque el request puede no haberse parseado.
    pub fn bad_request(server: &str) -> Self {
        let mut response = Self::new(FALLBACK_PROTOCOL, StatusCode::BAD_REQUEST);
        response.set_body(BAD_REQUEST_BODY.to_vec());
        response.add_standard_headers(server, Some(&current_timestamp()), None);
        response
    }

    /// Agrega un header (un nombre repetido sobrescribe el valor)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    /// Asigna el body de la respuesta
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    /// Agrega los headers estándar según el código de estado
    ///
    /// Orden: `Date`, `Server`, luego `Last-Modified` (solo 200) o
    /// `Content-Type: text/html` (cualquier otro código), `Content-Length`
    /// y `Connection: close`. Sin largo, `Content-Length` se envía igual con
    /// el valor literal `null`.
    pub fn add_standard_headers(
        &mut self,
        server: &str,
        last_modified: Option<&str>,
        content_length: Option<usize>,
    ) {
        self.add_header("Date", &current_timestamp());
        self.add_header("Server", server);

        if self.status == StatusCode::OK {
            if let Some(last_modified) = last_modified {
                self.add_header("Last-Modified", last_modified);
            }
        } else {
            self.add_header("Content-Type", "text/html");
        }

        let length = content_length.map_or_else(|| "null".to_string(), |l| l.to_string());
        self.add_header("Content-Length", &length);
        self.add_header("Connection", "close");
    }

    /// Bloque de headers listo para el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    pub fn head(&self) -> String {
        let mut head = format!("{} {}\r\n", self.protocol_version, self.status);
        for (name, value) in self.headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        head
    }

    /// Escribe el bloque de headers
    pub fn write_head<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.head().as_bytes())
    }

    /// Escribe el body crudo (nada si no tiene)
    pub fn write_body<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match &self.body {
            Some(body) => writer.write_all(body),
            None => Ok(()),
        }
    }

    /// Escribe headers y después body
    pub fn transmit<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_head(writer)?;
        self.write_body(writer)
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Obtiene el body (vacío si no se asignó)
    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn header_names(response: &Response) -> Vec<&str> {
        response.headers().iter().map(|(name, _)| name).collect()
    }

    #[test]
    fn test_new_response() {
        let response = Response::new("HTTP/1.1", StatusCode::OK);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_http_date_format() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 3).unwrap();
        assert_eq!(http_date(instant), "Fri, 16 Oct 2026 09:05:03 GMT");
    }

    #[test]
    fn test_ok_headers() {
        let response = Response::ok("HTTP/1.0", "JamesServ/4.5k", b"hello".to_vec());

        assert_eq!(
            header_names(&response),
            vec!["Date", "Server", "Last-Modified", "Content-Length", "Connection"]
        );
        assert_eq!(response.headers().get("Server"), Some("JamesServ/4.5k"));
        assert_eq!(response.headers().get("Content-Length"), Some("5"));
        assert_eq!(response.headers().get("Connection"), Some("close"));
        assert_eq!(response.protocol_version(), "HTTP/1.0");
        assert_eq!(response.body(), b"hello");
    }

    #[test]
    fn test_not_found_has_null_content_length() {
        let response = Response::not_found("HTTP/1.1", "JamesServ/4.5k");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            header_names(&response),
            vec!["Date", "Server", "Content-Type", "Content-Length", "Connection"]
        );
        assert_eq!(response.headers().get("Content-Length"), Some("null"));
        assert_eq!(response.headers().get("Content-Type"), Some("text/html"));
        assert_eq!(response.body(), NOT_FOUND_BODY);
    }

    #[test]
    fn test_bad_request_ignores_last_modified() {
        let response = Response::bad_request("JamesServ/4.5k");

        assert_eq!(response.protocol_version(), "HTTP/1.1");
        assert!(!response.headers().contains("Last-Modified"));
        assert_eq!(response.headers().get("Content-Length"), Some("null"));
        assert!(response.head().contains("\r\nContent-Length: null\r\nConnection: close\r\n"));
        assert_eq!(response.body(), BAD_REQUEST_BODY);
    }

    #[test]
    fn test_unknown_status_wire_format() {
        let mut response = Response::new("HTTP/1.1", StatusCode::from_u16(500));
        response.add_standard_headers("JamesServ/4.5k", None, Some(0));

        assert_eq!(response.status().as_u16(), 500);
        assert!(response.head().starts_with("HTTP/1.1 400 BAD REQUEST\r\n"));
        assert_eq!(response.headers().get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_head_lists_headers_in_insertion_order() {
        let mut response = Response::new("HTTP/1.1", StatusCode::NOT_MODIFIED);
        response.add_header("Zeta", "1");
        response.add_header("Alpha", "2");
        response.add_header("Mid", "3");

        assert_eq!(
            response.head(),
            "HTTP/1.1 304 NOT MODIFIED\r\nZeta: 1\r\nAlpha: 2\r\nMid: 3\r\n\r\n"
        );
    }

    #[test]
    fn test_transmit_writes_head_then_body() {
        let binary = vec![0x00, 0x01, 0x02, 0xFF];
        let response = Response::ok("HTTP/1.1", "JamesServ/4.5k", binary.clone());

        let mut wire = Vec::new();
        response.transmit(&mut wire).unwrap();

        let head = response.head();
        assert_eq!(&wire[..head.len()], head.as_bytes());
        assert_eq!(&wire[head.len()..], &binary[..]);
        assert!(head.ends_with("Connection: close\r\n\r\n"));
    }

    #[test]
    fn test_transmit_without_body() {
        let response = Response::new("HTTP/1.1", StatusCode::OK);
        let mut wire = Vec::new();
        response.transmit(&mut wire).unwrap();

        assert_eq!(wire, b"HTTP/1.1 200 OK\r\n\r\n");
    }
}
