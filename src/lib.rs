//! # Static File Server
//! src/lib.rs
//!
//! Servidor HTTP mínimo de archivos estáticos: un acceptor, un pool acotado
//! de workers y una conexión por request.
//!
//! ## Arquitectura
//!
//! - `http`: gramática del request, headers y serialización de la respuesta
//! - `files`: resolución de rutas bajo el directorio raíz
//! - `server`: accept loop, pool de workers y handler de conexiones
//! - `metrics`: contadores de conexiones y respuestas
//! - `config`: CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use static_server::config::Config;
//! use static_server::server::Server;
//!
//! let server = Server::bind(Config::default()).unwrap();
//! let handle = server.start().unwrap();
//! handle.wait();
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod server;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
