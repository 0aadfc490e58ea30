//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Este módulo valida y descompone la request line y el bloque de headers
//! contra una gramática estricta. Ambas gramáticas se aplican por match
//! exacto: la línea completa debe cumplirla.
//!
//! ## Formato aceptado
//!
//! ```text
//! GET /docs/index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/7.68.0\r\n
//! \r\n
//! ```
//!
//! ## Gramática
//!
//! 1. **Request Line**: `METHOD SP PATH SP PROTOCOL`
//!    - `METHOD`: una o más mayúsculas
//!    - `PATH`: `/` solo, o uno o más grupos `/segmento` seguidos de `.` y
//!      una extensión en minúsculas (`/a/b/file.html`)
//!    - `PROTOCOL`: mayúsculas, dígitos, `/` y `.`
//! 2. **Header**: `Name: Value`, con `Name` en segmentos capitalizados unidos
//!    por guiones (`Content-Type`) y `Value` con letras, dígitos, espacio y
//!    la puntuación `-/;:,.()=~_*+`
//! 3. **Empty Line**: termina el bloque de headers

use super::HeaderMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::io::{self, BufRead, Cursor};
use thiserror::Error;

lazy_static! {
    static ref REQUEST_LINE: Regex = Regex::new(
        r"^[A-Z]+ (?:(?:/[a-zA-Z0-9_\-~=+]+)+\.[a-z]+|/) [A-Z0-9/.]+$"
    )
    .expect("request line grammar compiles");

    static ref HEADER_LINE: Regex = Regex::new(
        r"^(?:[A-Z][A-Za-z0-9_]+(?:-[A-Z][A-Za-z0-9_]+)*)+: [A-Za-z0-9 \-/;:,.()=~_*+]+$"
    )
    .expect("header line grammar compiles");
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Error)]
pub enum ParseError {
    /// El cliente cerró la conexión antes de enviar la request line
    #[error("Missing request line")]
    MissingRequestLine,

    /// La request line no cumple la gramática
    #[error("Request line does not match grammar: {0:?}")]
    InvalidRequestLine(String),

    /// Un header no cumple la gramática
    #[error("Header line does not match grammar: {0:?}")]
    InvalidHeaderLine(String),

    /// El stream terminó antes de la línea vacía que cierra los headers
    #[error("Header block not terminated by an empty line")]
    UnterminatedHeaders,

    /// Error de lectura del socket
    #[error("I/O error while reading request: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// `true` si el error es de gramática (se responde 400).
    ///
    /// Los demás errores son fallas de I/O: la conexión se cierra sin respuesta.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ParseError::InvalidRequestLine(_) | ParseError::InvalidHeaderLine(_)
        )
    }
}

/// Representa un request parseado
///
/// Se construye solo si la request line cumple la gramática; los headers se
/// agregan línea por línea mientras se lee el bloque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método (ej: "GET")
    method: String,

    /// Path del archivo pedido (ej: "/index.html")
    path: String,

    /// Versión del protocolo (ej: "HTTP/1.1")
    protocol_version: String,

    /// Headers en el orden en que llegaron
    headers: HeaderMap,
}

impl Request {
    /// Parsea un request completo desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use static_server::http::Request;
    ///
    /// let raw = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/index.html");
    /// assert_eq!(request.header("Host"), Some("localhost"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        Self::read_from(&mut Cursor::new(buffer))
    }

    /// Lee y parsea un request desde un reader con buffer (normalmente el socket)
    ///
    /// Lee exactamente hasta la línea vacía que cierra los headers; no
    /// consume nada más del stream.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        let mut lines = LineReader::new(reader);
        let line = lines.next_line()?.ok_or(ParseError::MissingRequestLine)?;
        let mut request = Self::parse_request_line(&line)?;

        let mut index = 0;
        loop {
            let line = lines.next_line()?.ok_or(ParseError::UnterminatedHeaders)?;
            if line.is_empty() {
                break;
            }
            let (name, value) = parse_header_line(&line, index == 0)?;
            request.headers.insert(&name, &value);
            index += 1;
        }

        Ok(request)
    }

    /// Valida la request line y la separa en sus tres tokens
    ///
    /// Formato: `GET /path/file.html HTTP/1.1`
    pub fn parse_request_line(line: &str) -> Result<Self, ParseError> {
        if !REQUEST_LINE.is_match(line) {
            return Err(ParseError::InvalidRequestLine(line.to_string()));
        }

        // La gramática garantiza exactamente dos espacios simples
        let mut parts = line.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(path), Some(protocol_version)) => Ok(Self::new(
                method,
                path,
                protocol_version,
            )),
            _ => Err(ParseError::InvalidRequestLine(line.to_string())),
        }
    }

    /// Crea un request sin headers
    pub fn new(method: &str, path: &str, protocol_version: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            protocol_version: protocol_version.to_string(),
            headers: HeaderMap::new(),
        }
    }

    /// Agrega un header (un nombre repetido sobrescribe el valor)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Valida un header y lo separa en (nombre, valor)
///
/// Solo para el primer header: si la línea tiene más de un `:`, se corta en
/// el último antes de validar (`Host: example.com:8080:x` → `Host: example.com:8080`).
/// Los headers siguientes no reciben este tratamiento.
///
/// El nombre es lo que está antes del primer `:`; el valor es lo que sigue al
/// primer espacio de la línea.
pub fn parse_header_line(line: &str, is_first: bool) -> Result<(String, String), ParseError> {
    let mut line = line;
    if is_first {
        if let (Some(first), Some(last)) = (line.find(':'), line.rfind(':')) {
            if first != last {
                line = &line[..last];
            }
        }
    }

    if !HEADER_LINE.is_match(line) {
        return Err(ParseError::InvalidHeaderLine(line.to_string()));
    }

    match (line.find(':'), line.find(' ')) {
        (Some(colon), Some(space)) => Ok((
            line[..colon].to_string(),
            line[space + 1..].to_string(),
        )),
        _ => Err(ParseError::InvalidHeaderLine(line.to_string())),
    }
}

/// Lector de líneas del bloque de headers
///
/// Una línea termina en `\r\n`, `\n` o un `\r` suelto. Si el `\r` llega al
/// final del buffer, el `\n` que pueda seguirle se descarta en la próxima
/// lectura en vez de bloquear esperándolo.
struct LineReader<'a, R> {
    reader: &'a mut R,
    pending_lf: bool,
}

impl<'a, R: BufRead> LineReader<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            pending_lf: false,
        }
    }

    /// Siguiente línea sin el terminador; `None` en EOF.
    ///
    /// Los bytes que no son UTF-8 válido se reemplazan, así la línea falla la
    /// gramática en vez de abortar la conexión.
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok((!buf.is_empty()).then(|| decode(&buf)));
            }

            if self.pending_lf {
                self.pending_lf = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    buf.extend_from_slice(&available[..end]);
                    let mut used = end + 1;
                    if available[end] == b'\r' {
                        match available.get(end + 1) {
                            Some(b'\n') => used += 1,
                            Some(_) => {}
                            None => self.pending_lf = true,
                        }
                    }
                    self.reader.consume(used);
                    return Ok(Some(decode(&buf)));
                }
                None => {
                    let used = available.len();
                    buf.extend_from_slice(available);
                    self.reader.consume(used);
                }
            }
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
