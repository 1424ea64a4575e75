use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::{ConfigError, LoggingConfig};

/// The most recent formatted log lines, oldest first.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    lines: Mutex<VecDeque<String>>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: Mutex::new(VecDeque::with_capacity(capacity.min(1_024))),
        }
    }

    pub fn push_line(&self, line: impl Into<String>) {
        let mut lines = self.lines.lock().expect("log buffer mutex poisoned");
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Splits `text` into lines and keeps the non-blank ones.
    fn push_text(&self, text: &str) {
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            self.push_line(line);
        }
    }

    pub fn last_lines(&self, n: usize) -> Vec<String> {
        let lines = self.lines.lock().expect("log buffer mutex poisoned");
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().expect("log buffer mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hands the formatter one writer per event; the event's text reaches the
/// buffer when that writer is dropped.
struct BufferSink(Arc<LogBuffer>);

impl<'a> MakeWriter<'a> for BufferSink {
    type Writer = PendingEvent;

    fn make_writer(&'a self) -> Self::Writer {
        PendingEvent {
            buffer: self.0.clone(),
            bytes: Vec::new(),
        }
    }
}

struct PendingEvent {
    buffer: Arc<LogBuffer>,
    bytes: Vec<u8>,
}

impl io::Write for PendingEvent {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PendingEvent {
    fn drop(&mut self) {
        if !self.bytes.is_empty() {
            self.buffer.push_text(&String::from_utf8_lossy(&self.bytes));
        }
    }
}

type FilteredRegistry = Layered<EnvFilter, Registry>;
type LogSubscriber = Layered<Box<dyn Layer<FilteredRegistry> + Send + Sync>, FilteredRegistry>;

/// Builds the subscriber described by `config` without installing it.
///
/// Every event goes to `buffer`, and also to stderr and to `config.file`
/// when those are set. The log file is opened in append mode.
pub fn log_subscriber(
    config: &LoggingConfig,
    buffer: Arc<LogBuffer>,
) -> Result<impl tracing::Subscriber + Send + Sync, ConfigError> {
    build_subscriber(config, config.env_filter(), buffer)
}

fn build_subscriber(
    config: &LoggingConfig,
    filter: EnvFilter,
    buffer: Arc<LogBuffer>,
) -> Result<LogSubscriber, ConfigError> {
    let writer = sinks(config, buffer)?;
    let layer: Box<dyn Layer<FilteredRegistry> + Send + Sync> = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };
    Ok(tracing_subscriber::registry().with(filter).with(layer))
}

fn sinks(config: &LoggingConfig, buffer: Arc<LogBuffer>) -> Result<BoxMakeWriter, ConfigError> {
    let mut writer = BoxMakeWriter::new(BufferSink(buffer));
    if config.stderr {
        writer = BoxMakeWriter::new(writer.and(io::stderr));
    }
    if let Some(path) = &config.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        writer = BoxMakeWriter::new(writer.and(Mutex::new(file)));
    }
    Ok(writer)
}

static INSTALLED: OnceLock<Arc<LogBuffer>> = OnceLock::new();

/// Installs the process-wide subscriber and returns its buffer.
///
/// Only the first successful call installs anything; later calls return the
/// installed buffer and ignore `config`.
pub fn init_tracing(config: &LoggingConfig) -> Result<Arc<LogBuffer>, ConfigError> {
    if let Some(buffer) = INSTALLED.get() {
        return Ok(buffer.clone());
    }
    let buffer = Arc::new(LogBuffer::new(config.buffer_lines));
    let subscriber = log_subscriber(config, buffer.clone())?;
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return INSTALLED
            .get()
            .cloned()
            .ok_or(ConfigError::SubscriberAlreadySet);
    }
    let installed = INSTALLED.get_or_init(|| buffer).clone();
    tracing::debug!(level = %config.level, json = config.json, "tracing installed");
    Ok(installed)
}

/// The buffer of the subscriber installed by [`init_tracing`], if any.
pub fn installed_log_buffer() -> Option<Arc<LogBuffer>> {
    INSTALLED.get().cloned()
}
