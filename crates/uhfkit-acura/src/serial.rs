//! Serial transport and line framing for the HexaPad text protocol.
//!
//! The pad speaks ASCII over a serial port. Commands are single lines
//! terminated by CRLF; while reading, the pad streams one tag per line as
//! `EPC#RSSI#ANT`, where RSSI and antenna may be absent.

use crate::error::HexaPadError;
use bytes::{Buf, BytesMut};
use std::io::{self, Read, Write};
use std::time::Duration;
use uhfkit_core::{Error, Result, Rssi, TagRecord};

/// Line terminator of commands and responses.
pub const LINE_END: &[u8] = b"\r\n";

/// Upper bound on buffered bytes without a line terminator.
const MAX_PENDING: usize = 16 * 1024;

const READ_CHUNK: usize = 1024;

/// Byte transport to the pad.
pub trait SerialLink: Send + 'static {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Append whatever the port has buffered to `buf` and return how many
    /// bytes were added. Returns 0 when nothing is pending.
    fn read_available(&mut self, buf: &mut BytesMut) -> io::Result<usize>;

    /// Drop unread input.
    fn discard_input(&mut self) -> io::Result<()>;
}

/// Opens serial links.
pub trait SerialOpener: Send {
    type Link: SerialLink;

    fn open(&mut self, path: &str, baud_rate: u32) -> std::result::Result<Self::Link, HexaPadError>;
}

/// Opener for the host's serial ports.
#[derive(Debug, Clone, Copy)]
pub struct SystemSerial {
    pub timeout: Duration,
}

impl Default for SystemSerial {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(100),
        }
    }
}

impl SerialOpener for SystemSerial {
    type Link = Box<dyn serialport::SerialPort>;

    fn open(&mut self, path: &str, baud_rate: u32) -> std::result::Result<Self::Link, HexaPadError> {
        Ok(serialport::new(path, baud_rate)
            .timeout(self.timeout)
            .open()?)
    }
}

impl SerialLink for Box<dyn serialport::SerialPort> {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(self, data)?;
        self.flush()
    }

    fn read_available(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        let pending = self.bytes_to_read()? as usize;
        if pending == 0 {
            return Ok(0);
        }

        let mut chunk = [0u8; READ_CHUNK];
        let n = self.read(&mut chunk[..pending.min(READ_CHUNK)])?;
        buf.extend_from_slice(&chunk[..n]);
        Ok(n)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        Ok(self.clear(serialport::ClearBuffer::Input)?)
    }
}

/// Splits a byte stream into text lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes.
    ///
    /// If the buffer grows past its bound without a terminator, the
    /// pending bytes are discarded.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        if self.buffer.len() > MAX_PENDING && !self.buffer.contains(&b'\n') {
            self.buffer.clear();
        }
    }

    /// Next complete, non-empty line without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.iter().position(|b| *b == b'\n')?;
            let line = self.buffer.split_to(end);
            self.buffer.advance(1);

            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Parse one streamed tag line.
///
/// # Errors
/// Returns `Error::InvalidTag` if the EPC is not hexadecimal or the RSSI or
/// antenna field is not a number.
pub fn parse_tag_line(line: &str) -> Result<TagRecord> {
    let mut fields = line.split('#').map(str::trim);
    let epc = fields.next().unwrap_or_default();
    let mut builder = TagRecord::builder(epc);

    if let Some(rssi) = fields.next().filter(|f| !f.is_empty()) {
        builder = builder.rssi(Rssi::parse(rssi)?);
    }
    if let Some(antenna) = fields.next().filter(|f| !f.is_empty()) {
        let antenna = antenna
            .parse()
            .map_err(|_| Error::invalid_tag(format!("invalid antenna in '{line}'")))?;
        builder = builder.antenna(antenna);
    }
    builder.build()
}

/// First line of a response that is a plain unsigned number.
pub fn parse_number(response: &str) -> Option<i32> {
    response
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|line| line.parse().ok())
}

/// Whether the pad answered with an error.
pub fn is_error_response(response: &str) -> bool {
    response.to_ascii_lowercase().contains("error")
}
