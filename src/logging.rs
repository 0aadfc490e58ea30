//! # Logging
//! src/logging.rs
//!
//! Inicialización del subscriber de `tracing`. Ambas funciones son seguras
//! de llamar más de una vez: solo la primera instala el subscriber global.

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Instala el subscriber del binario con el filtro indicado
///
/// Si el filtro no se puede interpretar se usa `info`.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_level(true)
        .try_init();
}

/// Subscriber para tests: nivel DEBUG, salida capturada por el test harness
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_thread_names(true)
        .with_span_events(FmtSpan::NONE)
        .with_test_writer()
        .try_init();
}
