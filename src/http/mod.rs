//! # Módulo HTTP
//!
//! Este módulo implementa el subconjunto de HTTP que entiende el servidor:
//!
//! - Validación y parsing de la request line y los headers (gramática estricta)
//! - Construcción de responses con headers estándar
//! - Mapeo de status codes a reason phrases
//!
//! No hay conexiones persistentes, chunked transfer, query strings ni
//! negociación de contenido: cada conexión lleva un request y una respuesta.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 404 NOT FOUND\r\n
//! Date: Fri, 16 Oct 2026 10:00:00 GMT\r\n
//! Server: JamesServ/4.5k\r\n
//! Content-Type: text/html\r\n
//! Connection: close\r\n
//! \r\n
//! 404 NOT FOUND
//! ```

pub mod headers;   // Mapa de headers ordenado
pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use headers::HeaderMap;
pub use request::{ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
