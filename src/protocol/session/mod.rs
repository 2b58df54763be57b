//! Service session engine.
//!
//! [`Scanner`] owns the coordination state shared by the interrupt path, the
//! menu, and the service tasks. Each diagnostic service exists in two forms:
//!
//! * a one-shot method (`read_dtcs`, `erase_dtcs`, `vehicle_info`,
//!   `freeze_frame`, `live_data`) running one request/response session and
//!   returning a [`ServiceOutcome`];
//! * a long-lived task (`run_*_task`) waiting on the service trigger bit,
//!   calling the one-shot method, then returning to the service menu.
//!
//! The bus mutex is held for the whole session, so at most one exchange is in
//! flight at any time.
//!
//! # Wiring
//!
//! ```rust,ignore
//! static SCANNER: StaticCell<Scanner<Twai, St7735>> = StaticCell::new();
//! let scanner = SCANNER.init(Scanner::new(can, lcd, Timings::DEFAULT));
//!
//! // CAN interrupt handler
//! scanner.on_bus_interrupt(BusEvent::Received(frame));
//!
//! spawner.spawn(dispatcher(scanner)).unwrap(); // scanner.run_dispatcher()
//! spawner.spawn(read_dtc(scanner)).unwrap(); // scanner.run_read_dtc_task(EmbassyTimer)
//! ```
use core::cell::Cell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex as BlockingMutex};
use embassy_sync::mutex::Mutex;
use heapless::{String, Vec};

use crate::error::ServiceError;
use crate::protocol::coordinator::cancel::{Button, CancelToken};
use crate::protocol::coordinator::dispatcher::{DispatchAction, ServiceKind, SessionContext};
use crate::protocol::coordinator::event_flags::{EventBits, EventFlags};
use crate::protocol::coordinator::mailbox::BusMailbox;
use crate::protocol::decoders::dtc::Dtc;
use crate::protocol::decoders::live_data::LiveValues;
use crate::protocol::transport::iso_tp::assembler::REASSEMBLY_CAPACITY;
use crate::protocol::transport::traits::can_bus::{BusEvent, CanBus};
use crate::protocol::transport::traits::diag_timer::DiagTimer;
use crate::protocol::transport::{
    CAN_SEND_TIMEOUT_MS, FLOW_CONTROL_DELAY_MS, NOT_IMPLEMENTED_HOLD_MS, RESPONSE_TIMEOUT_MS,
    RESULT_HOLD_MS,
};
use crate::protocol::ui::{texts, Display, MenuPage, STATUS_TEXT};

mod exchange;
pub mod erase_dtc;
pub mod freeze_frame;
pub mod live_data;
pub mod read_dtc;
pub mod vehicle_info;

pub use read_dtc::DtcKind;

/// Trouble codes one response can carry: the reassembly buffer minus the
/// count byte, two bytes per code.
pub const MAX_DTCS: usize = (REASSEMBLY_CAPACITY - 1) / 2;
/// VIN buffer capacity.
pub const MAX_VIN_CHARS: usize = 20;

pub type DtcList = Vec<Dtc, MAX_DTCS>;
pub type VinString = String<MAX_VIN_CHARS>;

//==================================================================================TIMINGS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Waits and display holds used by the sessions, in milliseconds.
pub struct Timings {
    pub response_timeout_ms: u32,
    pub send_timeout_ms: u32,
    pub result_hold_ms: u32,
    pub not_implemented_hold_ms: u32,
    pub flow_control_delay_ms: u32,
}

impl Timings {
    pub const DEFAULT: Self = Self {
        response_timeout_ms: RESPONSE_TIMEOUT_MS,
        send_timeout_ms: CAN_SEND_TIMEOUT_MS,
        result_hold_ms: RESULT_HOLD_MS,
        not_implemented_hold_ms: NOT_IMPLEMENTED_HOLD_MS,
        flow_control_delay_ms: FLOW_CONTROL_DELAY_MS,
    };
}

impl Default for Timings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

//==================================================================================OUTCOME
#[derive(Clone, Debug, PartialEq)]
/// Terminal state of one service run, as shown to the user.
pub enum ServiceOutcome {
    /// Decoded trouble codes, in display order.
    Dtcs(DtcList),
    /// The ECU reported zero stored codes.
    NoDtcs,
    /// Positive erase acknowledgement (MIL off).
    DtcsCleared,
    /// Erase answered without the positive acknowledgement.
    EraseRejected,
    /// No answer to the erase request.
    NothingToErase,
    /// Vehicle Identification Number as received, possibly partial.
    Vin(VinString),
    /// Code that caused the freeze frame and the values read back.
    FreezeFrame { dtc: Dtc, values: LiveValues },
    /// The ECU holds no freeze frame (`P0000`).
    NoFreezeFrameData,
    /// Filler pattern received instead of a trouble code.
    TransmissionError,
    /// No response within the bounded wait.
    ReceptionTimeout,
    /// Service not available on the selected ECU.
    NotImplemented,
    /// Live-data polling stopped by the user after `rounds` requests.
    LiveDataStopped { rounds: u32 },
    /// User cancelled before the first response.
    Cancelled,
}

//==================================================================================SCANNER
/// Diagnostic scanner state shared by interrupts, the menu, and the tasks.
pub struct Scanner<B: CanBus, D: Display> {
    flags: EventFlags,
    mailbox: BusMailbox,
    cancel: CancelToken,
    context: BlockingMutex<CriticalSectionRawMutex, Cell<SessionContext>>,
    bus: Mutex<CriticalSectionRawMutex, B>,
    display: Mutex<CriticalSectionRawMutex, D>,
    timings: Timings,
}

impl<B: CanBus, D: Display> Scanner<B, D> {
    pub const fn new(bus: B, display: D, timings: Timings) -> Self {
        Self {
            flags: EventFlags::new(),
            mailbox: BusMailbox::new(),
            cancel: CancelToken::new(),
            context: BlockingMutex::new(Cell::new(SessionContext::new())),
            bus: Mutex::new(bus),
            display: Mutex::new(display),
            timings,
        }
    }

    pub fn flags(&self) -> &EventFlags {
        &self.flags
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Snapshot of the session selection.
    pub fn context(&self) -> SessionContext {
        self.context.lock(|context| context.get())
    }

    fn update_context<R>(&self, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        self.context.lock(|context| {
            let mut current = context.get();
            let result = f(&mut current);
            context.set(current);
            result
        })
    }

    //==================================================================================INPUTS
    /// Entry point of the CAN interrupt handler. Never blocks and never logs.
    pub fn on_bus_interrupt(&self, event: BusEvent) {
        match event {
            BusEvent::Received(frame) => {
                if self.mailbox.store_frame(frame) {
                    self.flags.set(EventBits::CAN_ERROR);
                }
                self.flags.set(EventBits::CAN_RX);
            }
            BusEvent::Transmitted => {
                self.mailbox.on_transmitted();
                self.flags.set(EventBits::CAN_TX);
            }
            BusEvent::BusError(status) => {
                self.mailbox.record_errors(status);
                if status.is_error() {
                    self.flags.set(EventBits::CAN_ERROR);
                }
            }
        }
    }

    /// ECU menu confirmation with the cursor on `cursor`.
    pub fn select_ecu(&self, cursor: u16) {
        self.update_context(|context| context.ecu_cursor = cursor);
        self.flags.set(EventBits::SELECT_ECU_ADDRESS);
    }

    /// Service menu confirmation with the cursor on `cursor`.
    pub fn select_service(&self, cursor: u16) {
        self.update_context(|context| context.service_cursor = cursor);
        self.flags.set(EventBits::SELECT_CAN_COMMAND);
    }

    /// Menu and Left abort or dismiss the running service.
    pub fn press(&self, button: Button) {
        match button {
            Button::Menu | Button::Left => self.cancel.cancel(),
        }
    }

    //==================================================================================MENU
    /// Draw the ECU menu shown at start-up.
    pub async fn show_start_menu(&self) {
        self.paint(|display| {
            display.clear();
            display.draw_menu(MenuPage::Ecu, 0);
        })
        .await;
    }

    /// Clear the screen and show the service menu with the first item selected.
    pub async fn return_to_menu(&self) {
        self.update_context(|context| context.return_to_menu());
        self.paint(|display| {
            display.clear();
            display.draw_menu(MenuPage::Services, 0);
        })
        .await;
    }

    /// Menu dispatcher task: turns menu selections into service triggers.
    pub async fn run_dispatcher(&self) {
        loop {
            let events = self.flags.wait_any(EventBits::MENU).await;
            for event in [EventBits::SELECT_ECU_ADDRESS, EventBits::SELECT_CAN_COMMAND] {
                if !events.contains(event) {
                    continue;
                }
                match self.update_context(|context| context.dispatch(event)) {
                    DispatchAction::StartService(service) => {
                        #[cfg(feature = "defmt")]
                        defmt::info!("Starting service {}", service);
                        self.flags.set(service.trigger());
                    }
                    DispatchAction::ShowServiceMenu(_ecu) => {
                        #[cfg(feature = "defmt")]
                        defmt::info!("ECU selected: {}", _ecu);
                        self.paint(|display| {
                            display.clear();
                            display.draw_menu(MenuPage::Services, 0);
                        })
                        .await;
                    }
                    DispatchAction::Ignore => {}
                }
            }
        }
    }

    //==================================================================================DISPLAY
    async fn paint<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        let mut display = self.display.lock().await;
        f(&mut display)
    }

    /// Clear and show "mode not implemented" for the hold time.
    async fn not_implemented<T: DiagTimer>(&self, timer: &mut T) -> ServiceOutcome {
        self.paint(|display| {
            display.clear();
            display.draw_text(25, 60, texts::MODE_NOT_IMPLEMENTED, STATUS_TEXT);
        })
        .await;
        timer.delay_ms(self.timings.not_implemented_hold_ms).await;
        ServiceOutcome::NotImplemented
    }

    /// Log the end of a run and give the screen back to the menu.
    async fn finish(
        &self,
        _service: ServiceKind,
        _result: Result<ServiceOutcome, ServiceError<B::Error>>,
    ) {
        #[cfg(feature = "defmt")]
        match &_result {
            Ok(_) => defmt::info!("Service {} finished", _service),
            Err(_) => defmt::error!("Service {} aborted on a bus or codec error", _service),
        }
        self.return_to_menu().await;
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
