//! JSON-lines transport
//!
//! Reads one frame per line, each line a JSON object mapping tag to value:
//!
//! ```text
//! {"pressure": 2847.3, "temperature": 67.8, "flow": null}
//! {"pressure": {"value": 2851.0, "status": "uncertain"}}
//! ```
//!
//! A number is a successful read, `null` is a disconnected tag, and an
//! object carries an explicit source status. Blank lines are skipped. A line
//! that is not a JSON object is a [`TransientFault::Malformed`] fault and
//! counts against the consecutive-error budget. EOF ends the stream.
//!
//! Reads are safe to abandon: a line cut short by a read timeout stays
//! buffered and the next `read_frame` continues it.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{FrameEvent, Transport, TransientFault};
use crate::types::{RawReading, SourceStatus};

enum Input {
    Stdin,
    File(PathBuf),
    Reader(Box<dyn AsyncBufRead + Unpin + Send>),
}

/// Line-oriented JSON transport over stdin, a file, or any async reader.
pub struct JsonLinesTransport {
    name: String,
    pending: Option<Input>,
    reader: Option<Box<dyn AsyncBufRead + Unpin + Send>>,
    line_buffer: Vec<u8>,
    line_number: u64,
}

impl JsonLinesTransport {
    fn with_input(name: String, input: Input) -> Self {
        Self {
            name,
            pending: Some(input),
            reader: None,
            line_buffer: Vec::with_capacity(512),
            line_number: 0,
        }
    }

    pub fn stdin() -> Self {
        Self::with_input("stdin".to_string(), Input::Stdin)
    }

    /// The file is opened on `connect()`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::with_input(path.display().to_string(), Input::File(path))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::with_input("reader".to_string(), Input::Reader(Box::new(reader)))
    }
}

#[derive(Deserialize)]
struct DetailedValue {
    value: Option<f64>,
    #[serde(default)]
    status: SourceStatus,
}

/// Parse one line into readings, in the object's key order.
pub fn parse_frame(line: &str) -> Result<Vec<RawReading>, TransientFault> {
    use serde_json::Value;

    let object: serde_json::Map<String, Value> =
        serde_json::from_str(line).map_err(|e| TransientFault::Malformed(e.to_string()))?;

    object
        .into_iter()
        .map(|(tag, raw)| match raw {
            Value::Null => Ok(RawReading::disconnected(tag)),
            Value::Number(n) => n
                .as_f64()
                .map(|v| RawReading::ok(tag.clone(), v))
                .ok_or_else(|| TransientFault::Malformed(format!("tag '{tag}' is not a finite number"))),
            detailed @ Value::Object(_) => serde_json::from_value::<DetailedValue>(detailed)
                .map(|d| RawReading {
                    tag: tag.clone(),
                    value: d.value,
                    status: d.status,
                })
                .map_err(|e| TransientFault::Malformed(format!("tag '{tag}': {e}"))),
            _ => Err(TransientFault::Malformed(format!("tag '{tag}' has no numeric value"))),
        })
        .collect()
}

#[async_trait]
impl Transport for JsonLinesTransport {
    async fn connect(&mut self) -> Result<(), TransientFault> {
        let Some(input) = self.pending.take() else {
            return Ok(());
        };
        let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
            Input::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
            Input::File(path) => match tokio::fs::File::open(&path).await {
                Ok(file) => Box::new(BufReader::new(file)),
                Err(e) => {
                    // Keep the path so the caller can retry
                    self.pending = Some(Input::File(path));
                    return Err(e.into());
                }
            },
            Input::Reader(reader) => reader,
        };
        self.reader = Some(reader);
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<FrameEvent, TransientFault> {
        let reader = self.reader.as_mut().ok_or(TransientFault::NotConnected)?;
        loop {
            // `read_until` keeps partial bytes in the buffer when cancelled
            let bytes = reader.read_until(b'\n', &mut self.line_buffer).await?;
            if bytes == 0 && self.line_buffer.is_empty() {
                debug!(source = %self.name, lines = self.line_number, "Input exhausted");
                return Ok(FrameEvent::EndOfStream);
            }

            let raw = std::mem::take(&mut self.line_buffer);
            self.line_number += 1;
            let Ok(text) = std::str::from_utf8(&raw) else {
                return Err(TransientFault::Malformed(format!(
                    "line {}: not valid UTF-8",
                    self.line_number
                )));
            };
            let line = text.trim();
            if line.is_empty() {
                continue;
            }
            return parse_frame(line)
                .map(FrameEvent::Frame)
                .map_err(|fault| match fault {
                    TransientFault::Malformed(msg) => {
                        TransientFault::Malformed(format!("line {}: {msg}", self.line_number))
                    }
                    other => other,
                });
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
