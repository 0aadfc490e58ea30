//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./static_server 8080 --root ./public --workers 8 --grace-period 5
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_ROOT=./public ./static_server
//! ```

use crate::error::ConfigError;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Rango válido de puertos (los privilegiados quedan fuera)
pub const MIN_PORT: u32 = 1025;
pub const MAX_PORT: u32 = 65535;

/// Configuración del servidor de archivos estáticos
#[derive(Debug, Clone, Parser)]
#[command(name = "static_server")]
#[command(about = "Servidor HTTP de archivos estáticos con pool de workers acotado")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (1025-65535)
    #[arg(value_name = "PORT", default_value = "8080", env = "HTTP_PORT")]
    pub port: u32,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz de los archivos (por defecto, el directorio de trabajo)
    #[arg(long, env = "HTTP_ROOT")]
    pub root: Option<PathBuf>,

    /// Número de workers (conexiones atendidas en paralelo)
    #[arg(long, default_value = "8", env = "HTTP_WORKERS")]
    pub workers: usize,

    /// Segundos de espera para drenar el pool al apagar
    #[arg(long = "grace-period", default_value = "5", env = "HTTP_GRACE_PERIOD")]
    pub grace_period_secs: u64,

    /// Espera máxima (ms) entre dos revisiones del flag de apagado en el accept loop
    #[arg(long = "accept-poll-ms", default_value = "50", env = "HTTP_ACCEPT_POLL_MS")]
    pub accept_poll_ms: u64,

    /// Token del header `Server`
    #[arg(long = "server-name", default_value = "JamesServ/4.5k", env = "HTTP_SERVER_NAME")]
    pub server_name: String,

    /// Filtro de logging (ej: "info", "static_server=debug")
    #[arg(long = "log-level", default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl Config {
    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use static_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración completa (puerto incluido)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PORT..=MAX_PORT).contains(&self.port) {
            return Err(ConfigError::InvalidPort(self.port));
        }
        self.validate_runtime()
    }

    /// Valida todo menos el puerto (para listeners ya abiertos)
    pub fn validate_runtime(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.accept_poll_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        Ok(())
    }

    /// Directorio raíz efectivo
    pub fn root_dir(&self) -> io::Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir(),
        }
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    pub fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            root: None,
            workers: 8,
            grace_period_secs: 5,
            accept_poll_ms: 50,
            server_name: "JamesServ/4.5k".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.workers, 8);
        assert_eq!(config.grace_period(), Duration::from_secs(5));
        assert_eq!(config.server_name, "JamesServ/4.5k");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    // ==================== Port Validation ====================

    #[test]
    fn test_port_bounds() {
        let mut config = Config::default();
        for port in [1025, 8080, 65535] {
            config.port = port;
            assert!(config.validate().is_ok(), "port {} should be valid", port);
        }
        for port in [0, 80, 1024, 65536, 70000] {
            config.port = port;
            assert_eq!(config.validate(), Err(ConfigError::InvalidPort(port)));
        }
    }

    #[test]
    fn test_validate_runtime_ignores_port() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate_runtime().is_ok());
    }

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidWorkers));
    }

    #[test]
    fn test_validate_invalid_poll() {
        let mut config = Config::default();
        config.accept_poll_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPollInterval));
    }

    // ==================== CLI ====================

    #[test]
    fn test_parse_cli_args() {
        let config = Config::try_parse_from([
            "static_server",
            "9090",
            "--root",
            "/srv/www",
            "--workers",
            "2",
            "--grace-period",
            "1",
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.root, Some(PathBuf::from("/srv/www")));
        assert_eq!(config.workers, 2);
        assert_eq!(config.grace_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_out_of_range_port_parses_but_fails_validation() {
        let config = Config::try_parse_from(["static_server", "99999"]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort(99999)));
    }

    #[test]
    fn test_root_dir_defaults_to_cwd() {
        let config = Config::default();
        assert_eq!(config.root_dir().unwrap(), std::env::current_dir().unwrap());
    }
}
