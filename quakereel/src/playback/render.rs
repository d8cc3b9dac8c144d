//! Render capability consumed by the scheduler.

use std::sync::Arc;

use crate::event::Event;

/// Receives playback output.
///
/// Implemented by whatever draws events: a map widget, a terminal, a test
/// recorder. Callbacks run on the scheduler's tick task while its state lock
/// is held, so they must return quickly and must not call back into the
/// scheduler.
pub trait RenderSink: Send + Sync + 'static {
    /// An event reached its moment in the replay.
    fn on_emit(&self, event: &Event);

    /// Everything emitted so far should be removed.
    fn on_clear(&self);

    /// `emitted` events have been shown; the replay clock is at `current_time_ms`.
    fn on_progress(&self, emitted: usize, current_time_ms: i64);
}

impl<R: RenderSink + ?Sized> RenderSink for Arc<R> {
    fn on_emit(&self, event: &Event) {
        (**self).on_emit(event)
    }

    fn on_clear(&self) {
        (**self).on_clear()
    }

    fn on_progress(&self, emitted: usize, current_time_ms: i64) {
        (**self).on_progress(emitted, current_time_ms)
    }
}
