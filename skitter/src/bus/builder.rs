//! Bus configuration and builder.

use super::{EventBus, registry::Registry};
use skitter_core::{Executor, InvokerStrategy, Ownership};
use skitter_std::executor::{InlineExecutor, WorkerPool};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize},
};

/// Dispatches between automatic sweeps, by default.
pub const DEFAULT_SWEEP_EVERY: usize = 64;

/// Plain configuration of an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Ownership used by [`EventBus::subscribe`].
    pub default_ownership: Ownership,
    /// How handler invokers are built.
    pub invoker_strategy: InvokerStrategy,
    /// Submit a sweep of released listeners to the pool every this many
    /// dispatches. Zero disables periodic sweeps.
    pub sweep_every: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            default_ownership: Ownership::Strong,
            invoker_strategy: InvokerStrategy::Specialized,
            sweep_every: DEFAULT_SWEEP_EVERY,
        }
    }
}

/// Builder for [`EventBus`].
///
/// # Example
///
/// ```rust,ignore
/// let main = MainQueue::new();
/// let bus = EventBus::builder()
///     .main_executor(main.clone())
///     .pool_executor(WorkerPool::builder().threads(2).build()?)
///     .default_ownership(Ownership::Weak)
///     .build();
/// ```
#[derive(Default)]
pub struct EventBusBuilder {
    config: BusConfig,
    main: Option<Arc<dyn Executor>>,
    pool: Option<Arc<dyn Executor>>,
}

impl EventBusBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Executor for `Main` handlers. Without one they run inline on the
    /// dispatching thread.
    pub fn main_executor<E: Executor>(mut self, executor: E) -> Self {
        self.main = Some(Arc::new(executor));
        self
    }

    /// Executor for `Pool` handlers and background sweeps. Without one the
    /// bus starts its own [`WorkerPool`].
    pub fn pool_executor<E: Executor>(mut self, executor: E) -> Self {
        self.pool = Some(Arc::new(executor));
        self
    }

    /// Ownership used by [`EventBus::subscribe`].
    pub fn default_ownership(mut self, ownership: Ownership) -> Self {
        self.config.default_ownership = ownership;
        self
    }

    /// How handler invokers are built.
    pub fn invoker_strategy(mut self, strategy: InvokerStrategy) -> Self {
        self.config.invoker_strategy = strategy;
        self
    }

    /// Dispatches between automatic sweeps; zero disables them.
    pub fn sweep_every(mut self, dispatches: usize) -> Self {
        self.config.sweep_every = dispatches;
        self
    }

    /// Build the bus.
    pub fn build(self) -> EventBus {
        let main = self.main.unwrap_or_else(|| Arc::new(InlineExecutor));
        let pool = self.pool.unwrap_or_else(default_pool);

        tracing::debug!(
            ownership = ?self.config.default_ownership,
            strategy = self.config.invoker_strategy.as_str(),
            sweep_every = self.config.sweep_every,
            "Event bus created"
        );

        EventBus {
            registry: Arc::new(Registry::default()),
            config: self.config,
            main,
            pool,
            dispatches: AtomicUsize::new(0),
            sweep_pending: Arc::new(AtomicBool::new(false)),
        }
    }
}

fn default_pool() -> Arc<dyn Executor> {
    match WorkerPool::new() {
        Ok(pool) => Arc::new(pool),
        Err(err) => {
            tracing::warn!(%err, "Could not start worker pool; pool handlers will run inline");
            Arc::new(InlineExecutor)
        }
    }
}
