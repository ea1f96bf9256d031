//! Per-run collector for configuration warnings.

use tracing::warn;

/// Deduplicating warning sink scoped to one analysis run.
///
/// Each distinct message is logged once through `tracing` and kept so that
/// hosts can surface it; repeats are dropped.
#[derive(Debug, Default)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless an identical one was already recorded.
    ///
    /// Returns true if the message was new.
    pub fn warn_once(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.messages.contains(&message) {
            return false;
        }
        warn!("[bounds-lint]: {message}");
        self.messages.push(message);
        true
    }

    /// Returns every recorded message in order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
