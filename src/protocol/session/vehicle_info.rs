//! Vehicle Identification Number read (mode 09, info type 02). Only the ECM
//! answers this request.
use crate::error::ServiceError;
use crate::protocol::coordinator::dispatcher::ServiceKind;
use crate::protocol::coordinator::event_flags::EventBits;
use crate::protocol::session::exchange::{RxResult, TxStatus};
use crate::protocol::session::{Scanner, ServiceOutcome, VinString};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::EcuRole;
use crate::protocol::transport::iso_tp::hex_view::HexView;
use crate::protocol::transport::traits::can_bus::CanBus;
use crate::protocol::transport::traits::diag_timer::DiagTimer;
use crate::protocol::ui::{texts, Display, WHITE_TEXT};

const VIN_REQUEST: [u8; 3] = [0x02, 0x09, 0x02];
const VIN_REQUEST_FILLER: u8 = 0x55;

/// Append the ASCII characters a frame carries, up to the first NUL padding
/// byte. Characters past the buffer capacity are dropped.
fn append_ascii(vin: &mut VinString, frame: &CanFrame) {
    let hex = HexView::from_raw(&frame.data);
    let Some(bytes) = frame.data.get(hex.data_ascii_range()) else {
        return;
    };
    for &byte in bytes.iter().take_while(|&&byte| byte != 0) {
        if vin.push(byte as char).is_err() {
            break;
        }
    }
}

impl<B: CanBus, D: Display> Scanner<B, D> {
    /// Request the VIN and show it for the hold time.
    ///
    /// A continuation frame that does not arrive in time leaves its characters
    /// out; whatever was gathered is still shown.
    pub async fn vehicle_info<T: DiagTimer>(
        &self,
        timer: &mut T,
    ) -> Result<ServiceOutcome, ServiceError<B::Error>> {
        if self.context().ecu != EcuRole::Ecm {
            return Ok(self.not_implemented(timer).await);
        }

        let mut exchange = self.exchange(timer).await?;
        exchange
            .request(&VIN_REQUEST, VIN_REQUEST.len(), VIN_REQUEST_FILLER)
            .await?;
        if exchange.await_tx().await == TxStatus::Sent {
            self.paint(|display| display.clear()).await;
        }

        let outcome = match exchange.await_response().await {
            RxResult::Received(first) => {
                self.paint(|display| {
                    display.clear();
                    display.draw_text(70, 50, texts::VIN_TITLE, WHITE_TEXT);
                })
                .await;

                let mut vin = VinString::new();
                append_ascii(&mut vin, &first);
                let hex = HexView::from_raw(&first.data);
                if hex.is_multiframe() {
                    let frames = hex.consecutive_frames_to_receive().unwrap_or(0);
                    exchange.delay(self.timings.flow_control_delay_ms).await;
                    exchange.send_flow_control().await?;
                    for _ in 0..frames {
                        match exchange.await_response().await {
                            RxResult::Received(frame) => append_ascii(&mut vin, &frame),
                            RxResult::TimedOut | RxResult::Cancelled => {
                                #[cfg(feature = "defmt")]
                                defmt::warn!("VIN continuation frame missing");
                            }
                        }
                    }
                }
                #[cfg(feature = "defmt")]
                defmt::info!("VIN: {=str}", vin.as_str());
                self.paint(|display| display.draw_text(25, 70, &vin, WHITE_TEXT))
                    .await;
                ServiceOutcome::Vin(vin)
            }
            RxResult::TimedOut | RxResult::Cancelled => ServiceOutcome::ReceptionTimeout,
        };
        drop(exchange);

        timer.delay_ms(self.timings.result_hold_ms).await;
        Ok(outcome)
    }

    /// Task running [`vehicle_info`](Self::vehicle_info) on each
    /// VEHICLE_INFORMATION trigger.
    pub async fn run_vehicle_info_task<T: DiagTimer>(&self, mut timer: T) {
        loop {
            self.flags.wait_any(EventBits::VEHICLE_INFORMATION).await;
            let result = self.vehicle_info(&mut timer).await;
            self.finish(ServiceKind::VehicleInfo, result).await;
        }
    }
}
