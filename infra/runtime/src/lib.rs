//! # Runtime
//!
//! A specialized orchestration layer for the [Tokio](https://tokio.rs) async runtime.
//!
//! This crate provides standardized runtime configurations (profiles) used across
//! the workspace, and [`WorkerPool`]: an explicitly constructed scheduling resource
//! with an explicit start/shutdown lifecycle. There is deliberately no ambient
//! process-global runtime here; whoever needs scheduling constructs a pool and
//! owns it.
//!
//! ## Example
//!
//! ```rust
//! use realm_runtime::{RuntimeConfig, WorkerPool};
//!
//! let pool = WorkerPool::start(&RuntimeConfig::default()).unwrap();
//! let handle = pool.spawn(async { 21 * 2 });
//! // ... hand the pool to its owner; shut it down when done.
//! pool.shutdown();
//! ```

pub use anyhow::Result;

use anyhow::anyhow;
use std::future::Future;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The default number of worker threads if detection fails.
const DEFAULT_WORKER_THREADS: usize = 4;
/// The default stack size for threads (3 `MiB`).
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
/// Minimum allowed stack size (1 `MiB`).
const MIN_STACK_SIZE: usize = 1024 * 1024;
/// Maximum allowed stack size (16 `MiB`).
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
/// How long an idle thread stays alive.
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

/// Detects the optimal number of worker threads based on environment variables or hardware.
fn get_worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= 1024)
            .unwrap_or_else(|| {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

fn validate_stack_size(stack_size: usize) -> usize {
    stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE)
}

fn normalize_config(config: &RuntimeConfig) -> RuntimeConfig {
    let thread_name = if config.thread_name.trim().is_empty() {
        "thread-worker".to_owned()
    } else {
        config.thread_name.clone()
    };

    RuntimeConfig {
        worker_threads: config.worker_threads.clamp(1, 1024),
        stack_size: validate_stack_size(config.stack_size),
        thread_name,
        thread_keep_alive: config.thread_keep_alive,
    }
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: "thread-worker".to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl RuntimeConfig {
    /// Preset for high-throughput server hosts.
    #[must_use = "Use this configuration for high-performance server applications"]
    pub fn high_performance() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            stack_size: 4 * 1024 * 1024,
            thread_name: "thread-hp".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
        }
    }

    /// Preset for hosts where memory footprint matters.
    #[must_use = "Use this configuration for low-footprint applications"]
    pub fn memory_efficient() -> Self {
        Self {
            worker_threads: (get_worker_threads() / 2).max(1),
            stack_size: 2 * 1024 * 1024,
            thread_name: "thread-mem".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, 1024);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = validate_stack_size(size);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name = if name.trim().is_empty() { "thread-worker".to_owned() } else { name };
        self
    }

    #[must_use = "Customize how long idle threads stay alive"]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }
}

/// Creates a new multithreaded Tokio runtime from a validated configuration.
///
/// The configuration is normalized first: worker threads are clamped to
/// `[1, 1024]`, the stack size to `[1 MiB, 16 MiB]`, and an empty thread name
/// falls back to `"thread-worker"`.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the Tokio runtime cannot be created, typically
/// due to insufficient system resources or OS-level limitations.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = normalize_config(config);
    debug!(config = ?config, "Building tokio runtime");

    let mut builder = Builder::new_multi_thread();
    builder
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive);

    builder.enable_all();

    builder.build().map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

/// A bounded pool of worker threads executing independent units of work.
///
/// The pool is an owned resource, not ambient state: construct it with
/// [`WorkerPool::start`], hand it to whoever schedules work on it, and release
/// it with [`WorkerPool::shutdown`] (or [`WorkerPool::shutdown_timeout`] from
/// synchronous hosts that want to wait for in-flight work).
#[derive(Debug)]
pub struct WorkerPool {
    runtime: Runtime,
    name: String,
}

impl WorkerPool {
    /// Starts the pool's worker threads.
    ///
    /// # Errors
    /// Returns an [`anyhow::Error`] if the underlying runtime cannot be created.
    pub fn start(config: &RuntimeConfig) -> Result<Self> {
        let runtime = build_runtime_with_config(config)?;
        info!(
            threads = config.worker_threads.clamp(1, 1024),
            name = %config.thread_name,
            "Worker pool started"
        );
        Ok(Self { runtime, name: config.thread_name.clone() })
    }

    /// Submits an independent unit of work to the pool.
    ///
    /// The calling thread never blocks; the returned handle can be awaited or
    /// dropped (dropping detaches the task, it still runs to completion).
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(future)
    }

    /// Releases the pool without waiting for in-flight work.
    ///
    /// Safe to call from within an async context; worker threads are reaped in
    /// the background. Tasks that have not yet completed are dropped.
    pub fn shutdown(self) {
        info!(name = %self.name, "Worker pool shutting down");
        self.runtime.shutdown_background();
    }

    /// Releases the pool, waiting up to `timeout` for in-flight work to finish.
    ///
    /// Blocks the calling thread; intended for synchronous hosts during process
    /// teardown. Do not call from within an async context.
    pub fn shutdown_timeout(self, timeout: Duration) {
        info!(name = %self.name, ?timeout, "Worker pool shutting down (bounded wait)");
        self.runtime.shutdown_timeout(timeout);
    }
}
