//! # Errores del Servidor
//! src/error.rs
//!
//! Errores de arranque y del pool de workers. Los errores por conexión
//! (`ParseError`, `ResolveError`, `ConnectionError`) viven junto a su módulo.

use thiserror::Error;

/// Configuración inválida (detectada antes de abrir cualquier socket)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port number invalid: {0} (must be in 1025..=65535)")]
    InvalidPort(u32),

    #[error("worker pool size must be >= 1")]
    InvalidWorkers,

    #[error("accept poll interval must be >= 1 ms")]
    InvalidPollInterval,
}

/// Fallas fatales de arranque
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errores del pool de workers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// El pool ya no admite tareas
    #[error("worker pool is shut down")]
    ShutDown,
}
