//! Live sensor values (mode 01), polled in a loop until the user leaves.
use heapless::Vec;

use crate::error::{LiveDataError, ServiceError};
use crate::protocol::coordinator::dispatcher::ServiceKind;
use crate::protocol::coordinator::event_flags::EventBits;
use crate::protocol::decoders::live_data::{
    decode_live_response, format_live_value, LivePid, LiveValues,
};
use crate::protocol::decoders::pid_catalog::{PidMode, SupportedPids};
use crate::protocol::session::exchange::{Exchange, RxResult, TxStatus};
use crate::protocol::session::{Scanner, ServiceOutcome};
use crate::protocol::transport::can_frame::{CanFrame, MAX_BYTES};
use crate::protocol::transport::can_id::EcuRole;
use crate::protocol::transport::iso_tp::hex_view::HexView;
use crate::protocol::transport::iso_tp::logical_frame::LogicalFrame;
use crate::protocol::transport::traits::can_bus::CanBus;
use crate::protocol::transport::traits::diag_timer::DiagTimer;
use crate::protocol::ui::{texts, Display, DATA_TEXT, MENU_BG_COLOUR};

const LIVE_REQUEST_FILLER: u8 = 0xA5;
/// Listed in the mode 01 bitmap but without a scaling law.
const OBD_STANDARD_PID: u8 = 0x1C;

/// Scale the value carried by a mode 01 or mode 02 response. The echoed PID
/// is the third raw byte.
pub(crate) fn decode_pid_frame(frame: &CanFrame) -> Result<(LivePid, f64), LiveDataError> {
    let hex = HexView::from_raw(&frame.data);
    let data: Vec<u8, MAX_BYTES> = LogicalFrame::decode(&hex).payload_bytes().collect();
    decode_live_response(&data, frame.data[2])
}

impl<B: CanBus, D: Display> Scanner<B, D> {
    /// PIDs polled for the selected ECU: the fixed catalog on the ECM, the
    /// advertised set (minus PID 0x1C) elsewhere.
    async fn live_catalog<T: DiagTimer>(
        &self,
        exchange: &mut Exchange<'_, B, D, T>,
    ) -> Result<SupportedPids, ServiceError<B::Error>> {
        if exchange.ecu() == EcuRole::Ecm {
            return Ok(LivePid::ALL.iter().map(|pid| pid.pid()).collect());
        }
        // Unanswered query: nothing to poll.
        let mut pids = exchange
            .request_supported_pids(PidMode::CurrentData)
            .await?
            .unwrap_or_default();
        pids.retain(|&pid| pid != OBD_STANDARD_PID);
        Ok(pids)
    }

    /// Blank the value cell of `pid` and draw its label and value.
    pub(crate) async fn show_live_value(&self, pid: LivePid, value: f64) {
        let y = texts::live_row_y(pid.row());
        let text = format_live_value(value);
        self.paint(|display| {
            display.fill_rect(
                texts::LIVE_VALUE_X,
                y,
                texts::LIVE_VALUE_WIDTH,
                texts::LIVE_ROW_STEP,
                MENU_BG_COLOUR,
            );
            display.draw_text(texts::LIVE_VALUE_X, y, &text, DATA_TEXT);
            display.draw_text(texts::LIVE_LABEL_X, y, pid.label(), DATA_TEXT);
        })
        .await;
    }

    /// Poll the catalog round-robin until Menu or Left is pressed.
    ///
    /// Cancellation is checked once per request; a response that never comes
    /// costs one response timeout before the check runs again.
    pub async fn live_data<T: DiagTimer>(
        &self,
        timer: &mut T,
    ) -> Result<ServiceOutcome, ServiceError<B::Error>> {
        self.cancel.reset();
        self.paint(|display| display.clear()).await;

        let mut exchange = self.exchange(timer).await?;
        let catalog = self.live_catalog(&mut exchange).await?;
        if catalog.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::warn!("No live-data PID advertised by {}", exchange.ecu());
            drop(exchange);
            self.cancel.cancelled().await;
            return Ok(ServiceOutcome::LiveDataStopped { rounds: 0 });
        }

        let mut values = LiveValues::new();
        let mut rounds = 0u32;
        for &pid in catalog.iter().cycle() {
            if self.cancel.is_cancelled() {
                break;
            }
            rounds += 1;
            exchange
                .request(&[0x02, 0x01, pid], 3, LIVE_REQUEST_FILLER)
                .await?;
            if exchange.await_tx().await == TxStatus::BusError {
                continue;
            }
            let RxResult::Received(frame) = exchange.await_response().await else {
                continue;
            };
            match decode_pid_frame(&frame) {
                Ok((entry, value)) => {
                    values.set(entry, value);
                    self.show_live_value(entry, value).await;
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Live value skipped: {}", _e);
                }
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Live data stopped after {} requests", rounds);
        Ok(ServiceOutcome::LiveDataStopped { rounds })
    }

    /// Task running [`live_data`](Self::live_data) on each LIVE_ALL_DATA
    /// trigger.
    pub async fn run_live_data_task<T: DiagTimer>(&self, mut timer: T) {
        loop {
            self.flags.wait_any(EventBits::LIVE_ALL_DATA).await;
            let result = self.live_data(&mut timer).await;
            self.finish(ServiceKind::LiveData, result).await;
        }
    }
}
