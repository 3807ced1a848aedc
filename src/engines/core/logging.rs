//! Injected logging
//!
//! Components never call the `log` macros against ambient global state.
//! Each one is handed a [`Logger`] at construction; the default sink simply
//! forwards to whatever logger the host application installed.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use log::{Level, Log, Metadata, Record};

/// A cloneable logging capability with a fixed target
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: Cow<'static, str>,
}

impl Logger {
    /// Create a logger writing to `sink` under `target`
    pub fn new(sink: Arc<dyn Log>, target: impl Into<Cow<'static, str>>) -> Self {
        Self {
            sink,
            target: target.into(),
        }
    }

    /// Logger that forwards to the process-wide `log` implementation
    pub fn global(target: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Arc::new(GlobalLog), target)
    }

    /// Same sink, different target
    pub fn with_target(&self, target: impl Into<Cow<'static, str>>) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder()
            .level(level)
            .target(self.target.as_ref())
            .build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::global("seqbatch")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}

/// Forwards every call to `log::logger()`
struct GlobalLog;

impl Log for GlobalLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// In-memory sink used by tests to assert on emitted events
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryLog {
    entries: parking_lot::Mutex<Vec<(Level, String, String)>>,
}

#[cfg(test)]
impl MemoryLog {
    pub(crate) fn entries(&self) -> Vec<(Level, String, String)> {
        self.entries.lock().clone()
    }

    pub(crate) fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _, _)| *l == level)
            .map(|(_, _, msg)| msg.clone())
            .collect()
    }
}

#[cfg(test)]
impl Log for MemoryLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.entries.lock().push((
            record.level(),
            record.target().to_string(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}
