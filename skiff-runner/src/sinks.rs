//! Destinations for the job's own log lines
//!
//! The tailer hands every decoded line that is not the sentinel to a
//! [`LogSink`], in the order the lines were found in the stream.

use skiff_core::domain::log::LogEvent;
use std::io::Write;
use tracing::info;

/// Receives log lines of a running job
pub trait LogSink: Send {
    /// Writes one log line
    fn write(&mut self, event: &LogEvent);
}

/// Sink that re-emits lines as tracing events under the `skiff::task` target
#[derive(Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn write(&mut self, event: &LogEvent) {
        info!(target: "skiff::task", "{}", event.message);
    }
}

/// Sink that prints lines to standard output, prefixed with their time
#[derive(Debug, Default)]
pub struct StdoutLogSink {
    timestamps: bool,
}

impl StdoutLogSink {
    /// Creates a stdout sink
    ///
    /// # Arguments
    /// * `timestamps` - Prefix each line with the time it was logged
    pub fn new(timestamps: bool) -> Self {
        Self { timestamps }
    }

    fn format(&self, event: &LogEvent) -> String {
        match event.time().filter(|_| self.timestamps) {
            Some(time) => format!("[{}] {}", time.format("%H:%M:%S"), event.message),
            None => event.message.clone(),
        }
    }
}

impl LogSink for StdoutLogSink {
    fn write(&mut self, event: &LogEvent) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not abort the job.
        let _ = writeln!(stdout, "{}", self.format(event));
    }
}
