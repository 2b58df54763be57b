//! Clear trouble codes and the MIL (mode 04).
use crate::error::ServiceError;
use crate::protocol::coordinator::dispatcher::ServiceKind;
use crate::protocol::coordinator::event_flags::EventBits;
use crate::protocol::session::exchange::{RxResult, TxStatus};
use crate::protocol::session::{Scanner, ServiceOutcome};
use crate::protocol::transport::iso_tp::hex_view::HexView;
use crate::protocol::transport::traits::can_bus::CanBus;
use crate::protocol::transport::traits::diag_timer::DiagTimer;
use crate::protocol::ui::{texts, Display, STATUS_TEXT};

const ERASE_REQUEST: [u8; 2] = [0x01, 0x04];
const ERASE_REQUEST_FILLER: u8 = 0x55;
/// Mode byte of the positive answer (`0x04 + 0x40`), as hex text.
const POSITIVE_ACK: &str = "44";

impl<B: CanBus, D: Display> Scanner<B, D> {
    /// Send the erase request and show the result for the hold time,
    /// whatever it is.
    pub async fn erase_dtcs<T: DiagTimer>(
        &self,
        timer: &mut T,
    ) -> Result<ServiceOutcome, ServiceError<B::Error>> {
        let mut exchange = self.exchange(timer).await?;
        exchange
            .request(&ERASE_REQUEST, ERASE_REQUEST.len(), ERASE_REQUEST_FILLER)
            .await?;
        if exchange.await_tx().await == TxStatus::Sent {
            self.paint(|display| display.clear()).await;
        }

        let outcome = match exchange.await_response().await {
            RxResult::Received(frame) => {
                let hex = HexView::from_raw(&frame.data);
                if hex.frame_hex().get(2..4) == Some(POSITIVE_ACK) {
                    ServiceOutcome::DtcsCleared
                } else {
                    ServiceOutcome::EraseRejected
                }
            }
            RxResult::TimedOut | RxResult::Cancelled => ServiceOutcome::NothingToErase,
        };
        drop(exchange);

        let (x, text) = match &outcome {
            ServiceOutcome::DtcsCleared => (10, texts::DTCS_CLEARED),
            ServiceOutcome::EraseRejected => (20, texts::ERROR_CLEARING),
            _ => (20, texts::NO_DTCS_TO_CLEAR),
        };
        #[cfg(feature = "defmt")]
        defmt::info!("Erase finished: {=str}", text);
        self.paint(|display| {
            display.clear();
            display.draw_text(x, 50, text, STATUS_TEXT);
        })
        .await;
        timer.delay_ms(self.timings.result_hold_ms).await;
        Ok(outcome)
    }

    /// Task running [`erase_dtcs`](Self::erase_dtcs) on each ERASE_DTC trigger.
    pub async fn run_erase_dtc_task<T: DiagTimer>(&self, mut timer: T) {
        loop {
            self.flags.wait_any(EventBits::ERASE_DTC).await;
            let result = self.erase_dtcs(&mut timer).await;
            self.finish(ServiceKind::EraseDtc, result).await;
        }
    }
}
