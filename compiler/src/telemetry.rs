//! Telemetry handle fanning pipeline records to an optional log sink and
//! an optional event publisher.

use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_event_bus::{BusEvent, EventPublisher};
use shared_logging::{JsonlSink, LogLevel, LogRecord, LogSink};

/// Builder for [`PipelineTelemetry`].
pub struct PipelineTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    log_sink: Option<Arc<dyn LogSink>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl PipelineTelemetryBuilder {
    /// Creates a builder for the named module.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            log_sink: None,
            publisher: None,
        }
    }

    /// Logs to a JSON-lines file at `path`.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Logs to an explicit sink. Takes precedence over [`Self::log_path`].
    #[must_use]
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Publishes events through the given publisher.
    #[must_use]
    pub fn event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Builds the telemetry handle.
    ///
    /// # Errors
    /// Fails when the log file cannot be opened.
    pub fn build(self) -> Result<PipelineTelemetry> {
        let sink = match (self.log_sink, self.log_path) {
            (Some(sink), _) => Some(sink),
            (None, Some(path)) => Some(Arc::new(JsonlSink::open(path)?) as Arc<dyn LogSink>),
            (None, None) => None,
        };
        Ok(PipelineTelemetry {
            inner: Arc::new(Inner {
                module: self.module,
                sink,
                publisher: self.publisher,
            }),
        })
    }
}

struct Inner {
    module: String,
    sink: Option<Arc<dyn LogSink>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

/// Cloneable telemetry handle shared by the compiler runtime.
#[derive(Clone)]
pub struct PipelineTelemetry {
    inner: Arc<Inner>,
}

impl fmt::Debug for PipelineTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineTelemetry")
            .field("module", &self.inner.module)
            .finish()
    }
}

impl PipelineTelemetry {
    /// Returns a builder for the named module.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> PipelineTelemetryBuilder {
        PipelineTelemetryBuilder::new(module)
    }

    /// Writes a structured record to the log sink, if one is attached.
    ///
    /// # Errors
    /// Propagates sink write failures.
    pub fn log(&self, level: LogLevel, message: &str, fields: &Value) -> Result<()> {
        if let Some(sink) = &self.inner.sink {
            let record =
                LogRecord::new(&self.inner.module, level, message).with_fields(fields);
            sink.write(&record)?;
        }
        Ok(())
    }

    /// Publishes an event, if a publisher is attached.
    ///
    /// # Errors
    /// Propagates publisher failures.
    pub async fn event(&self, kind: &str, payload: Value) -> Result<()> {
        if let Some(publisher) = &self.inner.publisher {
            publisher
                .publish(BusEvent::new(self.inner.module.clone(), kind, payload))
                .await?;
        }
        Ok(())
    }
}
