//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Contadores por servidor: conexiones aceptadas, respuestas por código,
//! conexiones cerradas sin respuesta, handlers activos (y su pico) y
//! latencias de cada conexión.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Máximo de latencias a guardar (para calcular percentiles)
const MAX_LATENCIES: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Conexiones aceptadas por el acceptor
    connections_accepted: u64,

    /// Respuestas enviadas por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Conexiones que terminaron sin respuesta (fallas de I/O)
    dropped_connections: u64,

    /// Handlers ejecutándose ahora mismo
    active_handlers: u64,

    /// Máximo de handlers simultáneos observado
    peak_active_handlers: u64,

    /// Latencias registradas (en microsegundos)
    latencies: Vec<u64>,
}

/// Copia inmutable de las métricas en un instante
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connections_accepted: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub dropped_connections: u64,
    pub active_handlers: u64,
    pub peak_active_handlers: u64,
    pub uptime_secs: u64,
    pub latency_p50_us: u64,
    pub latency_p99_us: u64,
}

impl MetricsSnapshot {
    /// Total de respuestas enviadas (todas las clases)
    pub fn total_responses(&self) -> u64 {
        self.status_codes.values().sum()
    }

    /// Respuestas enviadas con un código concreto
    pub fn responses_with(&self, code: u16) -> u64 {
        self.status_codes.get(&code).copied().unwrap_or(0)
    }
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData::default())),
            start_time: Instant::now(),
        }
    }

    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_accepted(&self) {
        self.data().connections_accepted += 1;
    }

    /// Marca el inicio de un handler y actualiza el pico de concurrencia
    pub fn handler_started(&self) {
        let mut data = self.data();
        data.active_handlers += 1;
        data.peak_active_handlers = data.peak_active_handlers.max(data.active_handlers);
    }

    /// Marca el fin de un handler y registra su latencia
    pub fn handler_finished(&self, latency: Duration) {
        let mut data = self.data();
        if data.active_handlers > 0 {
            data.active_handlers -= 1;
        }

        // Si tenemos demasiadas latencias, eliminar las más antiguas
        if data.latencies.len() >= MAX_LATENCIES {
            data.latencies.remove(0);
        }
        data.latencies.push(latency.as_micros() as u64);
    }

    /// Registra una respuesta enviada
    pub fn record_response(&self, status_code: u16) {
        *self.data().status_codes.entry(status_code).or_insert(0) += 1;
    }

    /// Registra una conexión cerrada sin respuesta
    pub fn record_dropped(&self) {
        self.data().dropped_connections += 1;
    }

    pub fn active_handlers(&self) -> u64 {
        self.data().active_handlers
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();
        let (p50, p99) = percentiles(&data.latencies);

        MetricsSnapshot {
            connections_accepted: data.connections_accepted,
            status_codes: data.status_codes.clone(),
            dropped_connections: data.dropped_connections,
            active_handlers: data.active_handlers,
            peak_active_handlers: data.peak_active_handlers,
            uptime_secs: self.start_time.elapsed().as_secs(),
            latency_p50_us: p50,
            latency_p99_us: p99,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Calcula p50 y p99 de latencia
fn percentiles(latencies: &[u64]) -> (u64, u64) {
    if latencies.is_empty() {
        return (0, 0);
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();

    let len = sorted.len();
    (sorted[len * 50 / 100], sorted[len * 99 / 100])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_collector_is_empty() {
        let snapshot = MetricsCollector::new().snapshot();
        assert_eq!(snapshot.connections_accepted, 0);
        assert_eq!(snapshot.total_responses(), 0);
        assert_eq!(snapshot.peak_active_handlers, 0);
        assert_eq!(snapshot.latency_p50_us, 0);
    }

    #[test]
    fn test_record_responses_by_status() {
        let metrics = MetricsCollector::new();
        metrics.record_response(200);
        metrics.record_response(200);
        metrics.record_response(404);
        metrics.record_dropped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.responses_with(200), 2);
        assert_eq!(snapshot.responses_with(404), 1);
        assert_eq!(snapshot.responses_with(400), 0);
        assert_eq!(snapshot.total_responses(), 3);
        assert_eq!(snapshot.dropped_connections, 1);
    }

    #[test]
    fn test_peak_tracks_maximum_concurrency() {
        let metrics = MetricsCollector::new();
        metrics.handler_started();
        metrics.handler_started();
        metrics.handler_finished(Duration::from_millis(1));
        metrics.handler_started();
        metrics.handler_started();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active_handlers, 3);
        assert_eq!(snapshot.peak_active_handlers, 3);
    }

    #[test]
    fn test_finished_never_underflows() {
        let metrics = MetricsCollector::new();
        metrics.handler_finished(Duration::from_millis(1));
        assert_eq!(metrics.active_handlers(), 0);
    }

    #[test]
    fn test_percentiles() {
        let latencies: Vec<u64> = (1..=100).collect();
        assert_eq!(percentiles(&latencies), (51, 100));
    }

    #[test]
    fn test_concurrent_updates() {
        let metrics = MetricsCollector::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.record_accepted();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.snapshot().connections_accepted, 800);
    }
}
