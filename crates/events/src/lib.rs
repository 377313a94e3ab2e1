#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event channel used to report progress out of spm's engine crates.
//!
//! All user-visible output goes through events; engine crates never
//! print directly. The CLI front-end is the sole consumer and is
//! responsible for rendering, coloring, and locale-specific formatting
//! (all out of scope here, per spec §1).

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One reportable occurrence during an engine operation.
#[derive(Debug, Clone)]
pub enum Event {
    /// A coarse phase transition, e.g. "resolving", "downloading foo-1.0".
    /// This is what an optional spinner thread polls.
    Phase(String),
    DownloadStarted { url: String, size: Option<u64> },
    DownloadProgress { url: String, downloaded: u64, total: Option<u64> },
    DownloadFinished { url: String },
    ResolvedVersion { package: String, version: String },
    InstallSkipped { package: String, version: String },
    InstallFinished { package: String, version: String },
    Debug(String),
    Warning(String),
}

pub type EventSender = UnboundedSender<Event>;
pub type EventReceiver = UnboundedReceiver<Event>;

/// Create a fresh event channel.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Implemented by anything that carries an optional [`EventSender`], so
/// call sites can emit without constantly matching on `Option`.
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    fn emit(&self, event: Event) {
        if let Some(sender) = self.event_sender() {
            let _ = sender.send(event);
        }
    }

    fn emit_phase(&self, message: impl Into<String>) {
        self.emit(Event::Phase(message.into()));
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(Event::Debug(message.into()));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(Event::Warning(message.into()));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}

impl EventEmitter for Option<&EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        *self
    }
}
