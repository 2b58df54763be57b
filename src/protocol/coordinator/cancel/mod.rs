//! Cooperative cancellation raised by the Menu and Left buttons.
use core::cell::Cell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embassy_sync::signal::Signal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Buttons that abort or dismiss a running service.
pub enum Button {
    Menu,
    Left,
}

/// Cancellation flag checked at loop boundaries, with an awaitable form for
/// dismissal waits.
pub struct CancelToken {
    cancelled: Mutex<CriticalSectionRawMutex, Cell<bool>>,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            cancelled: Mutex::new(Cell::new(false)),
            signal: Signal::new(),
        }
    }

    /// Raise the flag. Callable from interrupt context.
    pub fn cancel(&self) {
        self.cancelled.lock(|flag| flag.set(true));
        self.signal.signal(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.lock(|flag| flag.get())
    }

    /// Lower the flag; done at the start of every service run.
    pub fn reset(&self) {
        self.cancelled.lock(|flag| flag.set(false));
        self.signal.reset();
    }

    /// Resolve once the flag is raised.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            self.signal.wait().await;
        }
    }
}
