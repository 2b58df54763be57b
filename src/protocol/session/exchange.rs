//! One request/response session with the selected ECU: holds the bus for its
//! whole lifetime and wraps the transmit / wait / report steps every service
//! shares.
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::MutexGuard;
use futures_util::future::{select, Either};
use futures_util::pin_mut;

use crate::error::ServiceError;
use crate::protocol::coordinator::bus_status::BusErrorFlags;
use crate::protocol::coordinator::event_flags::EventBits;
use crate::protocol::decoders::pid_catalog::{supported_pids, PidMode, SupportedPids};
use crate::protocol::session::Scanner;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::{EcuRole, MASK_RESPONSE_ID, REMOTE_REQUEST_ID};
use crate::protocol::transport::iso_tp::builder::{flow_control, obd_request};
use crate::protocol::transport::traits::can_bus::CanBus;
use crate::protocol::transport::traits::diag_timer::DiagTimer;
use crate::protocol::ui::{Display, WHITE_TEXT};

/// Padding of the supported-PID requests.
const SUPPORTED_PIDS_FILLER: u8 = 0x55;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TxStatus {
    Sent,
    /// A bus error was raised (and already shown).
    BusError,
    /// Neither completion nor error within the send timeout.
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RxBound {
    /// Give up after this many milliseconds.
    Millis(u32),
    /// Wait until a frame arrives or the user cancels.
    UntilCancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RxResult {
    Received(CanFrame),
    TimedOut,
    Cancelled,
}

pub(crate) struct Exchange<'a, B: CanBus, D: Display, T: DiagTimer> {
    scanner: &'a Scanner<B, D>,
    bus: MutexGuard<'a, CriticalSectionRawMutex, B>,
    timer: &'a mut T,
    ecu: EcuRole,
}

impl<B: CanBus, D: Display> Scanner<B, D> {
    /// Take the bus and point the receive object at the selected ECU.
    pub(crate) async fn exchange<'a, T: DiagTimer>(
        &'a self,
        timer: &'a mut T,
    ) -> Result<Exchange<'a, B, D, T>, ServiceError<B::Error>> {
        let mut bus = self.bus.lock().await;
        let ecu = self.context().ecu;
        bus.configure_rx(ecu.response_id(), MASK_RESPONSE_ID)
            .map_err(ServiceError::Configure)?;
        Ok(Exchange {
            scanner: self,
            bus,
            timer,
            ecu,
        })
    }

    /// Drain accumulated bus errors and show their texts. Returns the drained
    /// flags.
    pub(crate) async fn report_bus_errors(&self) -> BusErrorFlags {
        self.flags.clear(EventBits::CAN_ERROR);
        let errors = self.mailbox.take_errors();
        if !errors.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Bus errors drained: {}", errors);
            self.paint(|display| {
                display.clear();
                for message in errors.messages() {
                    display.draw_text(30, 50, message, WHITE_TEXT);
                }
            })
            .await;
        }
        errors
    }
}

impl<'a, B: CanBus, D: Display, T: DiagTimer> Exchange<'a, B, D, T> {
    pub(crate) fn ecu(&self) -> EcuRole {
        self.ecu
    }

    /// Queue `frame` after dropping stale interrupt state from earlier frames.
    pub(crate) async fn transmit(&mut self, frame: &CanFrame) -> Result<(), ServiceError<B::Error>> {
        self.scanner.flags.clear(EventBits::BUS);
        self.scanner.mailbox.discard_frame();
        self.bus.send(frame).await.map_err(ServiceError::Send)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("Frame queued to {}: {=[u8]:x}", frame.id, frame.payload());
        Ok(())
    }

    /// Broadcast an OBD request on the functional identifier.
    pub(crate) async fn request(
        &mut self,
        bytes: &[u8],
        len: usize,
        filler: u8,
    ) -> Result<(), ServiceError<B::Error>> {
        let frame = obd_request(REMOTE_REQUEST_ID, bytes, len, filler)?;
        self.transmit(&frame).await
    }

    /// Send the flow-control frame to the ECU's physical request identifier.
    pub(crate) async fn send_flow_control(&mut self) -> Result<(), ServiceError<B::Error>> {
        let frame = flow_control(self.ecu.request_id());
        self.transmit(&frame).await?;
        #[cfg(feature = "defmt")]
        defmt::debug!("Flow control sent to {}", self.ecu);
        Ok(())
    }

    /// Wait for transmit completion or a bus error, bounded by the send
    /// timeout. Errors are drained and shown.
    pub(crate) async fn await_tx(&mut self) -> TxStatus {
        let timeout = self.scanner.timings.send_timeout_ms;
        let events = self
            .scanner
            .flags
            .wait_any_timeout(EventBits::CAN_TX | EventBits::CAN_ERROR, self.timer, timeout)
            .await;
        match events {
            Some(bits) if bits.contains(EventBits::CAN_ERROR) => {
                self.scanner.report_bus_errors().await;
                TxStatus::BusError
            }
            Some(_) => TxStatus::Sent,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("No transmit completion after {} ms", timeout);
                TxStatus::TimedOut
            }
        }
    }

    /// Wait for the next received frame.
    pub(crate) async fn await_rx(&mut self, bound: RxBound) -> RxResult {
        let scanner = self.scanner;
        let woke = match bound {
            RxBound::Millis(millis) => scanner
                .flags
                .wait_any_timeout(EventBits::CAN_RX, self.timer, millis)
                .await
                .is_some(),
            RxBound::UntilCancelled => {
                let wait = scanner.flags.wait_any(EventBits::CAN_RX);
                let cancelled = scanner.cancel.cancelled();
                pin_mut!(wait);
                pin_mut!(cancelled);
                match select(wait, cancelled).await {
                    Either::Left(_) => true,
                    Either::Right(_) => return RxResult::Cancelled,
                }
            }
        };
        match scanner.mailbox.take_frame() {
            Some(frame) if woke => RxResult::Received(frame),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Response wait elapsed");
                RxResult::TimedOut
            }
        }
    }

    /// [`await_rx`](Self::await_rx) bounded by the response timeout.
    pub(crate) async fn await_response(&mut self) -> RxResult {
        let timeout = self.scanner.timings.response_timeout_ms;
        self.await_rx(RxBound::Millis(timeout)).await
    }

    /// Plain pause, bus still held.
    pub(crate) async fn delay(&mut self, millis: u32) {
        self.timer.delay_ms(millis).await;
    }

    /// Ask the ECU which PIDs `mode` supports. The first decoded entry is
    /// dropped. `None` when the ECU does not answer in time.
    pub(crate) async fn request_supported_pids(
        &mut self,
        mode: PidMode,
    ) -> Result<Option<SupportedPids>, ServiceError<B::Error>> {
        let request = mode.request();
        self.request(request, request.len(), SUPPORTED_PIDS_FILLER)
            .await?;
        self.await_tx().await;
        match self.await_response().await {
            RxResult::Received(frame) => {
                let mut pids = supported_pids(&frame.data[mode.bitmap_range()]);
                if !pids.is_empty() {
                    pids.remove(0);
                }
                Ok(Some(pids))
            }
            RxResult::TimedOut | RxResult::Cancelled => {
                #[cfg(feature = "defmt")]
                defmt::warn!("No supported-PID answer for {}", mode);
                Ok(None)
            }
        }
    }
}
