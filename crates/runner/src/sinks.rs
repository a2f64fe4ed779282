use std::collections::HashMap;
use tracing::info;
use trendsig_core::{AlertCommand, AlertSink, DrawCommand, DrawSink, SinkError};

/// In-memory draw surface with replace-by-tag semantics, mirroring the
/// chart contract: re-issuing a tag replaces the prior object, so a repaint
/// of the same bars leaves the surface unchanged.
#[derive(Debug, Default)]
pub struct MemoryDrawSink {
    objects: HashMap<String, DrawCommand>,
}

impl MemoryDrawSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, tag: &str) -> Option<&DrawCommand> {
        self.objects.get(tag)
    }

    pub fn objects(&self) -> impl Iterator<Item = &DrawCommand> {
        self.objects.values()
    }
}

impl DrawSink for MemoryDrawSink {
    fn draw(&mut self, command: DrawCommand) -> Result<(), SinkError> {
        self.objects.insert(command.tag.clone(), command);
        Ok(())
    }
}

/// Draw sink that logs each command.
#[derive(Debug, Default)]
pub struct TracingDrawSink;

impl DrawSink for TracingDrawSink {
    fn draw(&mut self, command: DrawCommand) -> Result<(), SinkError> {
        info!(
            tag = %command.tag,
            kind = ?command.kind,
            price = %command.price,
            color = %command.color,
            "draw"
        );
        Ok(())
    }
}

/// In-memory alert sink.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    pub alerts: Vec<AlertCommand>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertSink for MemoryAlertSink {
    fn alert(&mut self, alert: AlertCommand) -> Result<(), SinkError> {
        self.alerts.push(alert);
        Ok(())
    }
}

/// Alert sink that logs each alert.
#[derive(Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn alert(&mut self, alert: AlertCommand) -> Result<(), SinkError> {
        info!(
            name = %alert.name,
            priority = ?alert.priority,
            message = %alert.message,
            "alert"
        );
        Ok(())
    }
}

/// Sink that fails every call. Exercises the swallow-and-continue policy.
#[derive(Debug, Default)]
pub struct FailingSink;

impl DrawSink for FailingSink {
    fn draw(&mut self, _command: DrawCommand) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

impl AlertSink for FailingSink {
    fn alert(&mut self, _alert: AlertCommand) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}
