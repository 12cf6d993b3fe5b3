//! Shared helpers for reader integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::EnvFilter;
use uhfkit_core::{ConnectionStatus, ReaderEvent};
use uhfkit_hardware::{EventCallback, event_callback};

static TRACING: Once = Once::new();

/// Install a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Consumer that records every event it receives.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ReaderEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> EventCallback {
        let events = self.events.clone();
        event_callback(move |event| events.lock().unwrap().push(event))
    }

    pub fn events(&self) -> Vec<ReaderEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Identifiers of tag events, in delivery order.
    pub fn tag_epcs(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(ReaderEvent::as_tag)
            .map(|t| t.epc.to_string())
            .collect()
    }

    /// Status events, in delivery order.
    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ReaderEvent::Status(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}
