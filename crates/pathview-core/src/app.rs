//! The back-end boundary: the [`Driver`] trait and the [`Context`]
//! cancellation token.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use crate::grid::Frame;
use crate::messages::Msg;

// ---------------------------------------------------------------------------
// Context (cancellation token)
// ---------------------------------------------------------------------------

/// A cooperative-cancellation token backed by an [`AtomicBool`].
///
/// The controller hands a fresh token to each search run so a key press
/// observed inside the render callback can interrupt the search loop.
#[derive(Clone, Debug, Default)]
pub struct Context {
    done: Arc<AtomicBool>,
}

impl Context {
    /// Create a new, non-cancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Driver trait
// ---------------------------------------------------------------------------

/// A presentation back-end (e.g. a terminal).
///
/// The application never touches a rendering technology directly; it paints
/// by flushing [`Frame`]s and receives input as [`Msg`] values.
pub trait Driver {
    /// Initialise the back-end.
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Poll for input, translating native events into [`Msg`]s sent through
    /// `tx`. Implementations should return promptly when no input is
    /// pending and honour `ctx.is_done()`.
    fn poll_msgs(
        &mut self,
        ctx: &Context,
        tx: Sender<Msg>,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Paint a set of cell changes.
    fn flush(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Show status text on the given surface row (below the board).
    fn flush_status(&mut self, row: i32, text: &str) -> Result<(), Box<dyn std::error::Error>>;

    /// How many surface columns one board cell occupies. Pointer positions
    /// in [`Msg::Mouse`] are divided by this to obtain a cell column.
    fn cell_columns(&self) -> i32 {
        1
    }

    /// Clean up / restore the terminal.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_cancellation_is_shared() {
        let ctx = Context::new();
        let clone = ctx.clone();
        assert!(!ctx.is_done());
        clone.cancel();
        assert!(ctx.is_done());
    }
}
