//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa la recolección de métricas del servidor:
//! - Conexiones aceptadas y respuestas por código
//! - Conexiones cerradas sin respuesta
//! - Handlers activos y pico de concurrencia
//! - Latencias por conexión (p50, p99)

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
