//! # Static File Server - Entry Point
//! src/main.rs
//!
//! Lee la configuración (CLI + entorno), instala el logging y deja al
//! servidor escuchando hasta que el proceso termine.

use anyhow::Context;
use clap::Parser;
use static_server::config::Config;
use static_server::error::ServerError;
use static_server::logging;
use static_server::server::{exit_code, Server};
use tracing::{error, info};

fn main() {
    let config = Config::parse();
    logging::init(&config.log_level);

    if let Err(e) = run(config) {
        error!("{:#}", e);
        let code = e.downcast_ref::<ServerError>().map(exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    info!(
        port = config.port,
        workers = config.workers,
        grace_period_secs = config.grace_period_secs,
        "starting static file server"
    );

    let server = Server::bind(config).context("server startup failed")?;
    let handle = server.start().context("server startup failed")?;

    let report = handle.wait();
    info!(
        drained = report.completed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "server exited"
    );
    Ok(())
}
