// src/shell/interrupt.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct State {
    polling: AtomicBool,
    requested: AtomicBool,
}

/// Ctrl-C routing between the signal handler and the poll loop.
///
/// Cloning shares the same state, so the handler thread and the shell see
/// the same flags.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    state: Arc<State>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from the signal handler. Returns `true` when a poll loop is
    /// running and will stop; `false` means nobody is listening.
    pub fn request(&self) -> bool {
        if self.state.polling.load(Ordering::SeqCst) {
            self.state.requested.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub fn is_requested(&self) -> bool {
        self.state.requested.load(Ordering::SeqCst)
    }

    pub(crate) fn arm(&self) {
        self.state.requested.store(false, Ordering::SeqCst);
        self.state.polling.store(true, Ordering::SeqCst);
    }

    pub(crate) fn disarm(&self) {
        self.state.polling.store(false, Ordering::SeqCst);
        self.state.requested.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ignored_when_idle() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.request());
        assert!(!interrupt.is_requested());
    }

    #[test]
    fn test_request_while_polling() {
        let interrupt = Interrupt::new();
        let handler_side = interrupt.clone();
        interrupt.arm();
        assert!(handler_side.request());
        assert!(interrupt.is_requested());
        interrupt.disarm();
        assert!(!interrupt.is_requested());
        assert!(!handler_side.request());
    }
}
