//! # Pool de Workers Acotado
//! src/server/pool.rs
//!
//! Pool de N threads que consumen una cola FIFO sin límite de capacidad.
//! Nunca hay más de N tareas ejecutándose a la vez; las que sobran esperan
//! en la cola en orden de llegada (no se descarta ninguna por capacidad).
//!
//! ## Apagado
//!
//! 1. Se deja de admitir tareas nuevas.
//! 2. Se espera hasta un período de gracia a que terminen las tareas en
//!    ejecución y las encoladas.
//! 3. Si el plazo vence: se descartan las tareas encoladas y se invoca el
//!    abort hook de cada tarea en ejecución. Los threads que siguen
//!    ocupados quedan desacoplados (detached).

use crate::error::PoolError;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

type Task = Box<dyn FnOnce() + Send + 'static>;
type AbortHook = Box<dyn Fn() + Send + Sync + 'static>;

/// Tarea en la cola, con su abort hook opcional
struct QueuedTask {
    id: u64,
    run: Task,
    abort: Option<AbortHook>,
}

/// Estado protegido por el mutex del pool
struct PoolState {
    /// Tareas esperando un worker libre (FIFO)
    queue: VecDeque<QueuedTask>,

    /// `false` desde que empieza el apagado
    accepting: bool,

    next_id: u64,

    /// Tareas ejecutándose ahora mismo
    running: usize,

    /// Abort hooks de las tareas en ejecución
    abort_hooks: HashMap<u64, AbortHook>,

    /// Workers que no han salido de su loop
    live_workers: usize,
}

struct Shared {
    state: Mutex<PoolState>,

    /// Notifica a los workers que hay trabajo (o que hay que salir)
    task_available: Condvar,

    /// Notifica al apagado que un worker terminó
    worker_exited: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resultado del apagado del pool
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// `true` si todo terminó dentro del período de gracia
    pub completed: bool,

    /// Tareas en ejecución cuyo abort hook se invocó
    pub cancelled_running: usize,

    /// Tareas encoladas que se descartaron sin ejecutarse
    pub dropped_queued: usize,

    /// Tiempo total del apagado
    pub elapsed: Duration,
}

/// Pool de workers con cola FIFO
pub struct WorkerPool {
    name: String,
    size: usize,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Crea el pool y arranca sus `size` workers
    ///
    /// Los threads se llaman `<name>-<i>`.
    pub fn new(size: usize, name: &str) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                accepting: true,
                next_id: 0,
                running: 0,
                abort_hooks: HashMap::new(),
                live_workers: 0,
            }),
            task_available: Condvar::new(),
            worker_exited: Condvar::new(),
        });

        let mut pool = Self {
            name: name.to_string(),
            size,
            shared,
            workers: Vec::with_capacity(size),
        };

        for i in 0..size {
            let shared = Arc::clone(&pool.shared);
            pool.shared.lock().live_workers += 1;
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", name, i))
                .spawn(move || worker_loop(shared));

            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    pool.shared.lock().live_workers -= 1;
                    // Los workers ya creados salen al cerrar la cola
                    pool.close();
                    return Err(e);
                }
            }
        }

        debug!(pool = %pool.name, workers = size, "worker pool started");
        Ok(pool)
    }

    /// Encola una tarea
    pub fn execute<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(task), None)
    }

    /// Encola una tarea con un hook que se invoca si hay que cancelarla
    /// mientras se ejecuta (ej: cerrar su socket)
    pub fn execute_abortable<F, A>(&self, task: F, abort: A) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
        A: Fn() + Send + Sync + 'static,
    {
        self.submit(Box::new(task), Some(Box::new(abort)))
    }

    fn submit(&self, run: Task, abort: Option<AbortHook>) -> Result<(), PoolError> {
        let mut state = self.shared.lock();
        if !state.accepting {
            return Err(PoolError::ShutDown);
        }

        let id = state.next_id;
        state.next_id += 1;
        state.queue.push_back(QueuedTask { id, run, abort });
        drop(state);

        self.shared.task_available.notify_one();
        Ok(())
    }

    /// Número de workers del pool
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tareas ejecutándose ahora mismo
    pub fn active(&self) -> usize {
        self.shared.lock().running
    }

    /// Tareas esperando un worker
    pub fn queued(&self) -> usize {
        self.shared.lock().queue.len()
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.lock().accepting
    }

    /// Deja de admitir tareas y despierta a los workers ociosos
    fn close(&self) {
        self.shared.lock().accepting = false;
        self.shared.task_available.notify_all();
    }

    /// Apaga el pool esperando como máximo `grace`
    pub fn shutdown(&mut self, grace: Duration) -> ShutdownReport {
        let started = Instant::now();
        self.close();
        info!(
            pool = %self.name,
            active = self.active(),
            queued = self.queued(),
            "shutting down worker pool"
        );

        let state = self.shared.lock();
        let (mut state, _) = self
            .shared
            .worker_exited
            .wait_timeout_while(state, grace, |s| s.live_workers > 0)
            .unwrap_or_else(PoisonError::into_inner);

        if state.live_workers == 0 {
            drop(state);
            for worker in self.workers.drain(..) {
                let _ = worker.join();
            }
            info!(pool = %self.name, "worker pool drained");
            return ShutdownReport {
                completed: true,
                cancelled_running: 0,
                dropped_queued: 0,
                elapsed: started.elapsed(),
            };
        }

        // Período de gracia vencido: cancelación forzada
        let dropped: Vec<QueuedTask> = state.queue.drain(..).collect();
        let hooks: Vec<AbortHook> = state.abort_hooks.drain().map(|(_, hook)| hook).collect();
        let still_running = state.running;
        drop(state);

        let dropped_queued = dropped.len();
        drop(dropped);
        for hook in &hooks {
            hook();
        }
        self.workers.clear();

        warn!(
            pool = %self.name,
            running = still_running,
            cancelled = hooks.len(),
            dropped = dropped_queued,
            "grace period expired, tasks force-cancelled"
        );

        ShutdownReport {
            completed: false,
            cancelled_running: hooks.len(),
            dropped_queued,
            elapsed: started.elapsed(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.is_accepting() {
            self.close();
        }
    }
}

/// Loop principal del worker
fn worker_loop(shared: Arc<Shared>) {
    loop {
        let (id, run) = {
            let mut state = shared.lock();
            loop {
                if let Some(task) = state.queue.pop_front() {
                    state.running += 1;
                    if let Some(abort) = task.abort {
                        state.abort_hooks.insert(task.id, abort);
                    }
                    break (task.id, task.run);
                }
                if !state.accepting {
                    state.live_workers -= 1;
                    drop(state);
                    shared.worker_exited.notify_all();
                    return;
                }
                state = shared
                    .task_available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        // Un panic en una tarea no debe matar al worker
        if panic::catch_unwind(AssertUnwindSafe(run)).is_err() {
            error!(task = id, "task panicked");
        }

        let mut state = shared.lock();
        state.running -= 1;
        state.abort_hooks.remove(&id);
    }
}
