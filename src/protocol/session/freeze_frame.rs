//! Freeze frame (mode 02): the code that triggered the snapshot, then the
//! stored value of every advertised PID. Only the ECM answers this request.
use crate::error::ServiceError;
use crate::protocol::coordinator::dispatcher::ServiceKind;
use crate::protocol::coordinator::event_flags::EventBits;
use crate::protocol::decoders::dtc::{decode_dtc_hex, Dtc};
use crate::protocol::decoders::live_data::LiveValues;
use crate::protocol::decoders::pid_catalog::PidMode;
use crate::protocol::session::exchange::{Exchange, RxResult};
use crate::protocol::session::live_data::decode_pid_frame;
use crate::protocol::session::{Scanner, ServiceOutcome};
use crate::protocol::transport::can_id::EcuRole;
use crate::protocol::transport::iso_tp::hex_view::HexView;
use crate::protocol::transport::traits::can_bus::CanBus;
use crate::protocol::transport::traits::diag_timer::DiagTimer;
use crate::protocol::ui::{texts, Display, DATA_TEXT, WHITE_TEXT};

const FREEZE_DTC_REQUEST: [u8; 4] = [0x03, 0x02, 0x02, 0x00];
const FREEZE_DTC_FILLER: u8 = 0x55;
const FREEZE_PID_FILLER: u8 = 0x00;
/// Hex position of the code in the full response frame.
const FREEZE_DTC_HEX: core::ops::Range<usize> = 8..12;

impl<B: CanBus, D: Display> Scanner<B, D> {
    /// Read the freeze frame and leave the last screen up for the hold time.
    pub async fn freeze_frame<T: DiagTimer>(
        &self,
        timer: &mut T,
    ) -> Result<ServiceOutcome, ServiceError<B::Error>> {
        if self.context().ecu != EcuRole::Ecm {
            return Ok(self.not_implemented(timer).await);
        }

        let mut exchange = self.exchange(timer).await?;
        self.paint(|display| display.clear()).await;
        exchange
            .request(&FREEZE_DTC_REQUEST, FREEZE_DTC_REQUEST.len(), FREEZE_DTC_FILLER)
            .await?;
        exchange.await_tx().await;

        let outcome = match exchange.await_response().await {
            RxResult::Received(frame) => {
                let hex = HexView::from_raw(&frame.data);
                let code = hex.frame_hex().get(FREEZE_DTC_HEX).unwrap_or_default();
                match decode_dtc_hex(code) {
                    Err(_e) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Freeze-frame DTC not decodable: {}", _e);
                        self.show_freeze_error(texts::TRANSMISSION_ERROR).await;
                        ServiceOutcome::TransmissionError
                    }
                    Ok(dtc) if !dtc.is_valid() => {
                        self.paint(|display| {
                            display.clear();
                            display.draw_text(20, 50, texts::NO_FREEZE_FRAME, DATA_TEXT);
                        })
                        .await;
                        ServiceOutcome::NoFreezeFrameData
                    }
                    Ok(dtc) => {
                        #[cfg(feature = "defmt")]
                        defmt::info!("Freeze frame stored for {}", dtc);
                        self.freeze_frame_values(&mut exchange, dtc).await?
                    }
                }
            }
            RxResult::TimedOut | RxResult::Cancelled => {
                self.show_freeze_error(texts::RECEPTION_ERROR).await;
                ServiceOutcome::ReceptionTimeout
            }
        };
        drop(exchange);

        timer.delay_ms(self.timings.result_hold_ms).await;
        Ok(outcome)
    }

    /// Show the triggering code, then read back the value of every PID the
    /// freeze frame holds. Any unanswered request ends with the reception
    /// error.
    async fn freeze_frame_values<T: DiagTimer>(
        &self,
        exchange: &mut Exchange<'_, B, D, T>,
        dtc: Dtc,
    ) -> Result<ServiceOutcome, ServiceError<B::Error>> {
        let Some(pids) = exchange.request_supported_pids(PidMode::FreezeFrame).await? else {
            self.show_freeze_error(texts::RECEPTION_ERROR).await;
            return Ok(ServiceOutcome::ReceptionTimeout);
        };
        self.paint(|display| {
            display.draw_text(10, 50, dtc.as_str(), WHITE_TEXT.wrapped(5));
            display.draw_text(45, 50, texts::FREEZE_FRAME_CAUSE, WHITE_TEXT.wrapped(10));
        })
        .await;
        exchange.delay(self.timings.result_hold_ms).await;
        self.paint(|display| display.clear()).await;

        let mut values = LiveValues::new();
        for &pid in pids.iter() {
            exchange
                .request(&[0x03, 0x02, pid, 0x00], 8, FREEZE_PID_FILLER)
                .await?;
            exchange.await_tx().await;
            let RxResult::Received(frame) = exchange.await_response().await else {
                self.show_freeze_error(texts::RECEPTION_ERROR).await;
                return Ok(ServiceOutcome::ReceptionTimeout);
            };
            match decode_pid_frame(&frame) {
                Ok((entry, value)) => {
                    values.set(entry, value);
                    self.show_live_value(entry, value).await;
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Freeze-frame value skipped: {}", _e);
                }
            }
        }
        Ok(ServiceOutcome::FreezeFrame { dtc, values })
    }

    async fn show_freeze_error(&self, text: &str) {
        self.paint(|display| {
            display.clear();
            display.draw_text(10, 50, text, DATA_TEXT.wrapped(10));
        })
        .await;
    }

    /// Task running [`freeze_frame`](Self::freeze_frame) on each FREEZE_FRAME
    /// trigger.
    pub async fn run_freeze_frame_task<T: DiagTimer>(&self, mut timer: T) {
        loop {
            self.flags.wait_any(EventBits::FREEZE_FRAME).await;
            let result = self.freeze_frame(&mut timer).await;
            self.finish(ServiceKind::FreezeFrame, result).await;
        }
    }
}
