//! Read pipeline shared by every adapter.
//!
//! An adapter owns one [`ReadPipeline`] and hands clones of it to the
//! closures it registers with its vendor SDK. From the SDK thread the
//! pipeline normalizes nothing itself: the adapter passes an already
//! converted `Result<TagRecord>`, and the pipeline deduplicates it and
//! queues the resulting event on the dispatcher.
//!
//! ```text
//! SDK callback ──► adapter normalizes ──► ingest ──► TagBuffer::accept
//!                                                       │ new identifier
//!                                                       ▼
//!                                     Dispatcher ──► consumer(ReaderEvent)
//! ```

use crate::buffer::{BufferView, TagBuffer};
use crate::dispatch::{ConsumerSlot, Dispatcher, EventCallback};
use crate::state::DeviceState;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use uhfkit_core::{ConnectionStatus, Error, ReaderEvent, Result, TagRecord};

struct Shared {
    device: String,
    buffer: TagBuffer,
    state: DeviceState,
    consumer: ConsumerSlot,
    dispatcher: Dispatcher,
}

/// Buffer, state and event delivery of one reader.
///
/// Cloning is cheap and every clone refers to the same reader.
#[derive(Clone)]
pub struct ReadPipeline {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ReadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadPipeline")
            .field("device", &self.shared.device)
            .field("status", &self.shared.state.status())
            .field("reading", &self.shared.state.is_reading())
            .field("buffered", &self.shared.buffer.len())
            .finish()
    }
}

impl ReadPipeline {
    /// Create a pipeline delivering through `dispatcher`.
    ///
    /// `device` names the reader in log output.
    pub fn new(device: impl Into<String>, dispatcher: Dispatcher) -> Self {
        Self {
            shared: Arc::new(Shared {
                device: device.into(),
                buffer: TagBuffer::new(),
                state: DeviceState::new(),
                consumer: ConsumerSlot::new(),
                dispatcher,
            }),
        }
    }

    /// Name used in log output.
    pub fn device(&self) -> &str {
        &self.shared.device
    }

    /// Lifecycle state.
    pub fn state(&self) -> &DeviceState {
        &self.shared.state
    }

    /// Deduplication buffer.
    pub fn buffer(&self) -> &TagBuffer {
        &self.shared.buffer
    }

    /// Snapshot of accepted records.
    pub fn view(&self) -> BufferView {
        self.shared.buffer.view()
    }

    /// Forget every accepted identifier.
    pub fn clear_buffer(&self) {
        self.shared.buffer.clear();
        debug!(device = %self.shared.device, "Tag buffer cleared");
    }

    /// Replace the consumer.
    pub fn set_consumer(&self, callback: Option<EventCallback>) {
        self.shared.consumer.set(callback);
    }

    /// Offer one normalized read.
    ///
    /// A malformed read is logged and skipped. Returns `true` when the read
    /// carried a new identifier.
    pub fn ingest(&self, read: Result<TagRecord>) -> bool {
        let record = match read {
            Ok(record) => record,
            Err(e) => {
                warn!(device = %self.shared.device, error = %e, "Skipping malformed tag read");
                return false;
            }
        };

        if !self.shared.buffer.accept(&record) {
            return false;
        }

        trace!(device = %self.shared.device, tag = %record, "Tag accepted");
        self.emit(ReaderEvent::Tag(record));
        true
    }

    /// Offer a batch of reads reported together by the SDK.
    ///
    /// Every accepted record of the batch is delivered by a single job, in
    /// batch order. Returns the number of accepted records.
    pub fn ingest_batch<I>(&self, reads: I) -> usize
    where
        I: IntoIterator<Item = Result<TagRecord>>,
    {
        let accepted: Vec<TagRecord> = reads
            .into_iter()
            .filter_map(|read| match read {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(device = %self.shared.device, error = %e, "Skipping malformed tag read");
                    None
                }
            })
            .filter(|record| self.shared.buffer.accept(record))
            .collect();

        let count = accepted.len();
        if count == 0 {
            return 0;
        }

        if let Some(callback) = self.shared.consumer.get() {
            self.shared.dispatcher.submit(move || {
                for record in accepted {
                    callback(ReaderEvent::Tag(record));
                }
            });
        }
        count
    }

    /// Record a status change and notify the consumer.
    pub fn report_status(&self, status: ConnectionStatus) {
        let previous = self.shared.state.set_status(status);
        if previous != status {
            info!(device = %self.shared.device, from = %previous, to = %status, "Connection status changed");
        }
        self.emit(ReaderEvent::Status(status));
    }

    /// Notify the consumer of a battery level, in percent.
    pub fn report_battery(&self, level: u8) {
        self.emit(ReaderEvent::Battery(level.min(100)));
    }

    /// Notify the consumer of a failure that has no caller to return to.
    pub fn report_error(&self, error: Error) {
        warn!(device = %self.shared.device, error = %error, "Reader reported an error");
        self.emit(ReaderEvent::from(error));
    }

    /// Queue an event for the current consumer.
    ///
    /// Returns `false` when there is no consumer or the worker is gone.
    pub fn emit(&self, event: ReaderEvent) -> bool {
        match self.shared.consumer.get() {
            Some(callback) => self.shared.dispatcher.submit(move || callback(event)),
            None => {
                trace!(device = %self.shared.device, ?event, "No consumer registered, event dropped");
                false
            }
        }
    }

    /// Wait for every queued event to be delivered.
    pub fn flush(&self) -> bool {
        self.shared.dispatcher.flush()
    }
}
