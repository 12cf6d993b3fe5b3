//! Event delivery executor.
//!
//! Vendor SDKs call back on threads they own and make timing assumptions
//! about them. Consumer code must never run there, so every event is wrapped
//! in a job and handed to a [`Dispatcher`], which runs jobs one at a time on
//! a dedicated worker thread.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐
//! │ SDK thread │──┐
//! └────────────┘  │    ┌──────────────────┐     ┌────────────┐     ┌──────────┐
//!                 ├───►│ unbounded mpsc   │────►│ worker     │────►│ consumer │
//! ┌────────────┐  │    │ (submit order)   │     │ thread     │     │ callback │
//! │ poll loop  │──┘    └──────────────────┘     └────────────┘     └──────────┘
//! └────────────┘
//! ```
//!
//! The channel gives a single total order across every producer. A
//! dispatcher can be cloned and shared by several readers; all of them then
//! deliver through the same worker, so a consumer that blocks starves every
//! reader sharing it.

use crate::Result;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};
use uhfkit_core::{Error, ReaderEvent};

/// Consumer of reader events.
pub type EventCallback = Arc<dyn Fn(ReaderEvent) + Send + Sync + 'static>;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Wrap a closure as an [`EventCallback`].
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(ReaderEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Single-threaded executor for consumer callbacks.
///
/// Jobs run in submission order. A job that panics is logged and the worker
/// moves on to the next one. The worker exits once every clone of the
/// dispatcher has been dropped and the queue is drained.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use uhfkit_hardware::Dispatcher;
///
/// let dispatcher = Dispatcher::new("docs").unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..3 {
///     let counter = counter.clone();
///     dispatcher.submit(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     });
/// }
///
/// assert!(dispatcher.flush());
/// assert_eq!(counter.load(Ordering::SeqCst), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl Dispatcher {
    /// Spawn the worker thread.
    ///
    /// The thread is named `uhfkit-events-<name>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if the operating system refuses to spawn the
    /// thread.
    pub fn new(name: &str) -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let thread_name = format!("uhfkit-events-{name}");

        std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                debug!(thread = %thread_name, "Event worker started");
                while let Some(job) = rx.blocking_recv() {
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!(thread = %thread_name, "Event consumer panicked, continuing");
                    }
                }
                debug!(thread = %thread_name, "Event worker stopped");
            })
            .map_err(|e| Error::device_with("failed to spawn event worker", e))?;

        Ok(Self { tx })
    }

    /// Queue a job for execution.
    ///
    /// Returns `false` if the worker is gone and the job was dropped.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            warn!("Event worker is not running, job dropped");
            return false;
        }
        true
    }

    /// Block until every job submitted before this call has run.
    ///
    /// Must not be called from a job running on this dispatcher, nor from
    /// inside an async runtime context.
    pub fn flush(&self) -> bool {
        let (done_tx, done_rx) = oneshot::channel();
        if !self.submit(move || {
            let _ = done_tx.send(());
        }) {
            return false;
        }
        done_rx.blocking_recv().is_ok()
    }
}

/// Slot holding the single active consumer of a reader.
///
/// The consumer is looked up when an event is submitted, so replacing it
/// affects subsequent events only and never replays earlier ones.
#[derive(Clone, Default)]
pub struct ConsumerSlot {
    inner: Arc<RwLock<Option<EventCallback>>>,
}

impl ConsumerSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the consumer.
    pub fn set(&self, callback: Option<EventCallback>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = callback;
    }

    /// Current consumer, if one is registered.
    pub fn get(&self) -> Option<EventCallback> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a consumer is registered.
    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for ConsumerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerSlot")
            .field("registered", &self.is_set())
            .finish()
    }
}
