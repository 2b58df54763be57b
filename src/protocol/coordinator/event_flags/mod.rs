//! Broadcast event bits with "wait for any of mask" semantics, used by the
//! interrupt path and the menu to wake service tasks.
use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use bitflags::bitflags;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embassy_sync::waitqueue::MultiWakerRegistration;
use futures_util::future::{select, Either};
use futures_util::pin_mut;

use crate::protocol::transport::traits::diag_timer::DiagTimer;

/// Tasks that may wait at the same time (dispatcher, five services, and the
/// exchange in flight). Registering beyond this wakes every waiter, which
/// then re-register.
pub const MAX_WAITERS: usize = 8;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    /// Event bits shared by interrupts, the menu, and service tasks.
    pub struct EventBits: u16 {
        /// A service was chosen in the service menu.
        const SELECT_CAN_COMMAND = 1 << 0;
        const VEHICLE_INFORMATION = 1 << 1;
        const READ_DTC = 1 << 2;
        const READ_DTC_DRIVING_CYCLE = 1 << 3;
        /// The receive object holds a new frame.
        const CAN_RX = 1 << 4;
        /// The transmit object finished sending.
        const CAN_TX = 1 << 5;
        /// Bus errors were accumulated.
        const CAN_ERROR = 1 << 6;
        const LIVE_ALL_DATA = 1 << 7;
        const FREEZE_FRAME = 1 << 8;
        const ERASE_DTC = 1 << 9;
        /// An ECU was chosen in the ECU menu.
        const SELECT_ECU_ADDRESS = 1 << 10;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EventBits {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "EventBits({=u16:#x})", self.bits())
    }
}

impl EventBits {
    /// Bits written by the CAN interrupt path.
    pub const BUS: Self = Self::CAN_RX.union(Self::CAN_TX).union(Self::CAN_ERROR);
    /// Bits written by the menu.
    pub const MENU: Self = Self::SELECT_CAN_COMMAND.union(Self::SELECT_ECU_ADDRESS);
}

struct State {
    bits: EventBits,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

/// Event group: each bit is set and cleared independently; waiters block on a
/// mask and consume the bits that woke them.
pub struct EventFlags {
    state: Mutex<CriticalSectionRawMutex, RefCell<State>>,
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFlags {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                bits: EventBits::empty(),
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Raise `bits` and wake every waiter. Callable from interrupt context.
    pub fn set(&self, bits: EventBits) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.bits |= bits;
            state.waiters.wake();
        });
    }

    /// Lower `bits`.
    pub fn clear(&self, bits: EventBits) {
        self.state.lock(|state| state.borrow_mut().bits.remove(bits));
    }

    /// Currently raised bits.
    pub fn get(&self) -> EventBits {
        self.state.lock(|state| state.borrow().bits)
    }

    /// Wait until any bit of `mask` is raised. The matching bits are cleared
    /// on exit and returned.
    pub async fn wait_any(&self, mask: EventBits) -> EventBits {
        poll_fn(|cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                let matched = state.bits & mask;
                if matched.is_empty() {
                    state.waiters.register(cx.waker());
                    Poll::Pending
                } else {
                    state.bits.remove(matched);
                    Poll::Ready(matched)
                }
            })
        })
        .await
    }

    /// [`wait_any`](Self::wait_any) bounded by `millis`. `None` on timeout.
    pub async fn wait_any_timeout<T: DiagTimer>(
        &self,
        mask: EventBits,
        timer: &mut T,
        millis: u32,
    ) -> Option<EventBits> {
        let wait = self.wait_any(mask);
        let delay = timer.delay_ms(millis);
        pin_mut!(wait);
        pin_mut!(delay);

        match select(wait, delay).await {
            Either::Left((bits, _)) => Some(bits),
            Either::Right(_) => None,
        }
    }
}
