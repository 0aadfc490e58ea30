//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto (`tcp`)
//! 2. Acepta conexiones y las encola en un pool acotado (`pool`)
//! 3. Lee el request, resuelve el archivo y responde (`handler`)
//!
//! Nunca hay más de `workers` conexiones atendidas a la vez; el resto espera
//! en la cola FIFO del pool.

pub mod handler;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use handler::{ConnectionError, ConnectionHandler};
pub use pool::{ShutdownReport, WorkerPool};
pub use tcp::{exit_code, Server, ServerHandle};
