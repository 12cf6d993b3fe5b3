//! Capture timestamps for tag reads.
//!
//! Wall-clock time can step backwards (NTP corrections, manual changes). Tag
//! records are stamped from this clock instead, which clamps every value to
//! the last one it handed out so timestamps never decrease within a process.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ISSUED_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current UTC time, never earlier than any previously returned value.
pub fn capture_timestamp() -> DateTime<Utc> {
    clamp_to_last(Utc::now())
}

fn clamp_to_last(now: DateTime<Utc>) -> DateTime<Utc> {
    // Issued values are truncated to microseconds so equal-micro reads compare equal.
    let micros = now.timestamp_micros();
    let issued = LAST_ISSUED_MICROS
        .fetch_max(micros, Ordering::AcqRel)
        .max(micros);
    DateTime::from_timestamp_micros(issued).unwrap_or(now)
}
