//! # Connection Handler
//! src/server/handler.rs
//!
//! Procesa una conexión aceptada de punta a punta:
//!
//! ```text
//! leer request → validar gramática → resolver archivo → armar respuesta
//!             → escribir headers → escribir body → cerrar
//! ```
//!
//! - Request mal formado: 400 sin buscar el archivo.
//! - Archivo inexistente o ilegible: 404.
//! - Archivo legible: 200 con el contenido completo.
//! - Fallas de I/O (incluida la lectura de un archivo que pasó la
//!   verificación): se registran en el log y la conexión se cierra sin
//!   respuesta.

use crate::files::{FileResolver, ResolveError};
use crate::http::{ParseError, Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Motivos por los que una conexión termina sin respuesta
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No se pudo leer el request (EOF, socket cerrado, etc.)
    #[error("failed to read request: {0}")]
    Request(#[source] ParseError),

    /// El archivo pasó la verificación pero no se pudo leer
    #[error(transparent)]
    File(ResolveError),

    /// Error escribiendo la respuesta
    #[error("connection interrupted: {0}")]
    Io(#[from] io::Error),
}

/// Handler compartido por todos los workers
///
/// No tiene estado mutable propio: cada conexión arma su `Request` y su
/// `Response` localmente.
#[derive(Clone)]
pub struct ConnectionHandler {
    resolver: Arc<FileResolver>,
    server_name: Arc<str>,
    metrics: MetricsCollector,
}

impl ConnectionHandler {
    pub fn new(resolver: FileResolver, server_name: &str, metrics: MetricsCollector) -> Self {
        Self {
            resolver: Arc::new(resolver),
            server_name: Arc::from(server_name),
            metrics,
        }
    }

    /// Atiende un socket aceptado y lo cierra en todos los casos
    pub fn handle(&self, stream: TcpStream) {
        let started = Instant::now();
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        debug!(%peer, "handler started");
        self.metrics.handler_started();

        let result = {
            let mut reader = BufReader::new(&stream);
            let mut writer = BufWriter::new(&stream);
            self.serve(&mut reader, &mut writer)
        };

        match result {
            Ok(status) => self.metrics.record_response(status.as_u16()),
            Err(e) => {
                match &e {
                    ConnectionError::File(_) => error!(%peer, "{}", e),
                    _ => warn!(%peer, "connection closed without response: {}", e),
                }
                self.metrics.record_dropped();
            }
        }

        let _ = stream.shutdown(Shutdown::Both);
        self.metrics.handler_finished(started.elapsed());
        debug!(%peer, elapsed_ms = started.elapsed().as_millis() as u64, "handler finished");
    }

    /// Lee un request de `reader` y escribe la respuesta en `writer`
    ///
    /// Retorna el código enviado, o el motivo por el que no se envió nada.
    pub fn serve<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<StatusCode, ConnectionError> {
        let response = match Request::read_from(reader) {
            Ok(request) => {
                log_request(&request);
                self.respond_to(&request)?
            }
            Err(e) if e.is_malformed() => {
                warn!("malformed request: {}", e);
                Response::bad_request(&self.server_name)
            }
            Err(e) => return Err(ConnectionError::Request(e)),
        };

        // Primero el bloque de headers completo, después el body
        response.write_head(writer)?;
        response.write_body(writer)?;
        writer.flush()?;

        info!(
            status = response.status().as_u16(),
            bytes = response.body().len(),
            "{} {}",
            response.protocol_version(),
            response.status()
        );
        Ok(response.status())
    }

    /// Arma la respuesta para un request válido
    pub fn respond_to(&self, request: &Request) -> Result<Response, ConnectionError> {
        match self.resolver.resolve(request.path()) {
            Ok(content) => Ok(Response::ok(
                request.protocol_version(),
                &self.server_name,
                content,
            )),
            Err(e) if e.is_not_found() => {
                info!(path = request.path(), "file not found");
                Ok(Response::not_found(
                    request.protocol_version(),
                    &self.server_name,
                ))
            }
            Err(e) => Err(ConnectionError::File(e)),
        }
    }
}

fn log_request(request: &Request) {
    debug!(
        method = request.method(),
        path = request.path(),
        protocol = request.protocol_version(),
        "request received"
    );
    for (name, value) in request.headers().iter() {
        debug!("  {}: {}", name, value);
    }
}
