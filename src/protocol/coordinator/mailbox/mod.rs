//! Single-slot hand-off between the CAN interrupt and the task running the
//! exchange: the last received frame and the accumulated bus errors.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::protocol::coordinator::bus_status::BusErrorFlags;
use crate::protocol::transport::can_frame::CanFrame;

#[derive(Default)]
struct Slot {
    frame: Option<CanFrame>,
    errors: BusErrorFlags,
}

/// Receive object mirror. Writers run in interrupt context, readers in tasks.
pub struct BusMailbox {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Slot>>,
}

impl Default for BusMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl BusMailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot {
                frame: None,
                errors: BusErrorFlags::empty(),
            })),
        }
    }

    /// Store a received frame. A completed reception clears the accumulated
    /// errors; overwriting an unread frame raises `DATA_LOST`.
    ///
    /// Returns `true` when a frame was lost.
    pub fn store_frame(&self, frame: CanFrame) -> bool {
        self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            let lost = slot.frame.replace(frame).is_some();
            slot.errors = if lost {
                BusErrorFlags::DATA_LOST
            } else {
                BusErrorFlags::empty()
            };
            lost
        })
    }

    /// A completed transmission clears the accumulated errors.
    pub fn on_transmitted(&self) {
        self.slot
            .lock(|slot| slot.borrow_mut().errors = BusErrorFlags::empty());
    }

    /// Accumulate status flags.
    pub fn record_errors(&self, flags: BusErrorFlags) {
        self.slot.lock(|slot| slot.borrow_mut().errors |= flags);
    }

    /// Read and empty the frame slot.
    pub fn take_frame(&self) -> Option<CanFrame> {
        self.slot.lock(|slot| slot.borrow_mut().frame.take())
    }

    /// Read and reset the accumulated flags.
    pub fn take_errors(&self) -> BusErrorFlags {
        self.slot
            .lock(|slot| core::mem::take(&mut slot.borrow_mut().errors))
    }

    /// Drop a stale frame before a new request goes out.
    pub fn discard_frame(&self) {
        self.slot.lock(|slot| slot.borrow_mut().frame = None);
    }
}
