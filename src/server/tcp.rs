//! # Acceptor TCP
//! src/server/tcp.rs
//!
//! Dueño del socket de escucha. Un thread dedicado corre el accept loop y
//! entrega cada conexión al pool de workers; nunca atiende conexiones él
//! mismo.
//!
//! El listener es no bloqueante: cuando no hay conexiones pendientes el loop
//! duerme `accept_poll` y vuelve a revisar el flag de apagado. Ese timeout no
//! es un error.

use crate::config::Config;
use crate::error::{ConfigError, ServerError};
use crate::files::FileResolver;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::server::handler::ConnectionHandler;
use crate::server::pool::{ShutdownReport, WorkerPool};
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Servidor listo para arrancar (socket ya abierto)
pub struct Server {
    config: Config,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Valida la configuración y abre el socket de escucha
    ///
    /// Un puerto fuera de 1025..=65535 falla antes de abrir cualquier socket.
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        config.validate()?;

        let address = config.address();
        let listener = TcpListener::bind(&address)
            .map_err(|source| ServerError::Bind { address, source })?;

        Self::from_listener(listener, config)
    }

    /// Crea el servidor sobre un listener ya abierto
    ///
    /// El puerto de `config` se ignora (útil para bind en el puerto 0).
    pub fn from_listener(listener: TcpListener, config: Config) -> Result<Self, ServerError> {
        config.validate_runtime()?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            config,
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Arranca el pool y el thread del acceptor
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let root = self.config.root_dir()?;
        self.listener.set_nonblocking(true)?;

        let metrics = MetricsCollector::new();
        let handler = ConnectionHandler::new(
            FileResolver::new(&root),
            &self.config.server_name,
            metrics.clone(),
        );
        let pool = WorkerPool::new(self.config.workers, "worker")?;
        let shutdown = Arc::new(AtomicBool::new(false));

        info!(
            address = %self.local_addr,
            root = %root.display(),
            workers = self.config.workers,
            "server listening"
        );

        let acceptor = Acceptor {
            listener: self.listener,
            pool,
            handler,
            metrics: metrics.clone(),
            shutdown: Arc::clone(&shutdown),
            poll: self.config.accept_poll(),
            grace: self.config.grace_period(),
        };

        let thread = thread::Builder::new()
            .name("acceptor".to_string())
            .spawn(move || acceptor.run())?;

        Ok(ServerHandle {
            local_addr: self.local_addr,
            shutdown,
            metrics,
            acceptor: Some(thread),
        })
    }
}

/// Estado que vive en el thread del acceptor
struct Acceptor {
    listener: TcpListener,
    pool: WorkerPool,
    handler: ConnectionHandler,
    metrics: MetricsCollector,
    shutdown: Arc<AtomicBool>,
    poll: Duration,
    grace: Duration,
}

impl Acceptor {
    /// Accept loop; al salir apaga el pool y retorna su reporte
    fn run(mut self) -> ShutdownReport {
        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(self.poll),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_transient(&e) => {
                    warn!("accept failed: {}", e);
                    thread::sleep(self.poll);
                }
                Err(e) => {
                    error!("listener failed, stopping accept loop: {}", e);
                    break;
                }
            }
        }

        info!("accept loop stopped");
        let report = self.pool.shutdown(self.grace);
        log_summary(&self.metrics.snapshot(), &report);
        report
    }

    /// Entrega una conexión aceptada al pool
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        self.metrics.record_accepted();

        // En algunas plataformas el socket aceptado hereda el modo no bloqueante
        if let Err(e) = stream.set_nonblocking(false) {
            warn!(%peer, "dropping connection: {}", e);
            return;
        }

        let result = match stream.try_clone() {
            Ok(abort_handle) => {
                let handler = self.handler.clone();
                self.pool.execute_abortable(
                    move || handler.handle(stream),
                    move || {
                        let _ = abort_handle.shutdown(Shutdown::Both);
                    },
                )
            }
            Err(e) => {
                debug!(%peer, "no abort handle for connection: {}", e);
                let handler = self.handler.clone();
                self.pool.execute(move || handler.handle(stream))
            }
        };

        match result {
            Ok(()) => debug!(%peer, "dispatched connection to worker pool"),
            Err(e) => warn!(%peer, "dropping connection: {}", e),
        }
    }
}

/// Errores de accept que afectan a una sola conexión
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset | io::ErrorKind::TimedOut
    ) || e.raw_os_error().is_some_and(is_fd_exhaustion)
}

/// EMFILE / ENFILE: sin descriptores disponibles, se reintenta
fn is_fd_exhaustion(code: i32) -> bool {
    code == 23 || code == 24
}

fn log_summary(snapshot: &MetricsSnapshot, report: &ShutdownReport) {
    info!(
        accepted = snapshot.connections_accepted,
        responses = snapshot.total_responses(),
        ok = snapshot.responses_with(200),
        bad_request = snapshot.responses_with(400),
        not_found = snapshot.responses_with(404),
        dropped = snapshot.dropped_connections,
        peak_active = snapshot.peak_active_handlers,
        p50_us = snapshot.latency_p50_us,
        p99_us = snapshot.latency_p99_us,
        drained = report.completed,
        cancelled = report.cancelled_running,
        discarded = report.dropped_queued,
        "server stopped"
    );
}

/// Control del ciclo de vida de un servidor arrancado
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    metrics: MetricsCollector,
    acceptor: Option<JoinHandle<ShutdownReport>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Detiene el accept loop y espera a que el pool se drene
    ///
    /// Retorna en a lo sumo `accept_poll + grace_period` (más lo que tarde
    /// el abort de las conexiones colgadas).
    pub fn shutdown(mut self) -> ShutdownReport {
        self.shutdown.store(true, Ordering::Release);
        self.join()
    }

    /// Bloquea hasta que el acceptor termine (normalmente, para siempre)
    pub fn wait(mut self) -> ShutdownReport {
        self.join()
    }

    fn join(&mut self) -> ShutdownReport {
        match self.acceptor.take().map(JoinHandle::join) {
            Some(Ok(report)) => report,
            Some(Err(_)) => {
                error!("acceptor thread panicked");
                ShutdownReport::default()
            }
            None => ShutdownReport::default(),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        // Sin join: el acceptor termina solo al ver el flag
        if self.acceptor.is_some() {
            self.shutdown.store(true, Ordering::Release);
        }
    }
}

/// Error de arranque convertido a código de salida del proceso
pub fn exit_code(error: &ServerError) -> i32 {
    match error {
        ServerError::Config(ConfigError::InvalidPort(_)) => 2,
        _ => 1,
    }
}
