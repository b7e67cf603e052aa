//! Response status interception.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;

/// Shared cell holding the status a request will be reported with.
///
/// Defaults to 200. Every `set` overwrites the previous value (last write
/// wins); the instrumentation reads it exactly once after the handler
/// returns, so the counter label and the span status always agree.
///
/// Clones share the same cell. A clone is placed in the request extensions
/// so a handler can report a status explicitly; the instrumentation itself
/// sets the real response status after the handler runs, which makes that
/// the final write for ordinary responses.
#[derive(Clone, Debug)]
pub struct StatusRecorder {
    status: Arc<AtomicU16>,
}

impl StatusRecorder {
    pub fn new() -> Self {
        Self {
            status: Arc::new(AtomicU16::new(StatusCode::OK.as_u16())),
        }
    }

    /// Overwrite the recorded status.
    pub fn set(&self, status: StatusCode) {
        self.status.store(status.as_u16(), Ordering::Relaxed);
    }

    /// The status the request will be reported with.
    pub fn recorded(&self) -> StatusCode {
        StatusCode::from_u16(self.status.load(Ordering::Relaxed)).unwrap_or(StatusCode::OK)
    }
}

impl Default for StatusRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_ok() {
        let recorder = StatusRecorder::new();
        assert_eq!(recorder.recorded(), StatusCode::OK);
    }

    #[test]
    fn last_write_wins() {
        let recorder = StatusRecorder::new();
        recorder.set(StatusCode::INTERNAL_SERVER_ERROR);
        recorder.set(StatusCode::IM_A_TEAPOT);
        assert_eq!(recorder.recorded(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn clones_share_the_cell() {
        let recorder = StatusRecorder::new();
        let clone = recorder.clone();
        clone.set(StatusCode::NOT_FOUND);
        assert_eq!(recorder.recorded(), StatusCode::NOT_FOUND);
    }
}
