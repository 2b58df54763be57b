//! Read stored trouble codes (mode 03) or codes detected during the current
//! driving cycle (mode 07).
use crate::error::ServiceError;
use crate::protocol::coordinator::dispatcher::ServiceKind;
use crate::protocol::coordinator::event_flags::EventBits;
use crate::protocol::decoders::dtc::{decode_dtc, Dtc};
use crate::protocol::session::exchange::{RxBound, RxResult};
use crate::protocol::session::{DtcList, Scanner, ServiceOutcome};
use crate::protocol::transport::iso_tp::assembler::{ProcessResult, ReassemblyBuffer};
use crate::protocol::transport::iso_tp::hex_view::HexView;
use crate::protocol::transport::iso_tp::logical_frame::LogicalFrame;
use crate::protocol::transport::traits::can_bus::CanBus;
use crate::protocol::transport::traits::diag_timer::DiagTimer;
use crate::protocol::ui::{texts, Display, DATA_TEXT};

/// Padding of the DTC request.
const DTC_REQUEST_FILLER: u8 = 0x55;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Which set of trouble codes to read.
pub enum DtcKind {
    /// Confirmed codes (mode 03).
    Stored,
    /// Pending codes of the current driving cycle (mode 07).
    DrivingCycle,
}

impl DtcKind {
    pub const fn mode(self) -> u8 {
        match self {
            DtcKind::Stored => 0x03,
            DtcKind::DrivingCycle => 0x07,
        }
    }
}

impl<B: CanBus, D: Display> Scanner<B, D> {
    /// Read trouble codes and list them until the user dismisses the screen.
    ///
    /// The first response is awaited without timeout (the user can cancel).
    /// A multi-frame answer is acknowledged with a flow-control frame, sent
    /// right away, and each continuation frame is awaited with the response
    /// timeout; codes are drawn as soon as their two bytes are in. A missing
    /// or undecodable continuation frame ends the read with the codes
    /// gathered so far.
    pub async fn read_dtcs<T: DiagTimer>(
        &self,
        kind: DtcKind,
        timer: &mut T,
    ) -> Result<ServiceOutcome, ServiceError<B::Error>> {
        self.cancel.reset();
        let mut exchange = self.exchange(timer).await?;
        exchange
            .request(&[0x01, kind.mode()], 8, DTC_REQUEST_FILLER)
            .await?;
        #[cfg(feature = "defmt")]
        defmt::info!("DTC request sent ({})", kind);

        let frame = match exchange.await_rx(RxBound::UntilCancelled).await {
            RxResult::Received(frame) => frame,
            RxResult::Cancelled => return Ok(ServiceOutcome::Cancelled),
            RxResult::TimedOut => return Ok(ServiceOutcome::ReceptionTimeout),
        };
        self.paint(|display| display.clear()).await;

        let hex = HexView::from_raw(&frame.data);
        let mut buffer = ReassemblyBuffer::new();
        let progress = buffer.start(&LogicalFrame::decode(&hex))?;
        let count = buffer.as_slice().first().copied().unwrap_or(0) as usize;

        if count == 0 {
            self.paint(|display| display.draw_text(20, 55, texts::NO_DTCS_STORED, DATA_TEXT))
                .await;
            drop(exchange);
            self.cancel.cancelled().await;
            return Ok(ServiceOutcome::NoDtcs);
        }

        let mut dtcs = DtcList::new();
        let mut shown = self.show_new_dtcs(&buffer, count, 0, &mut dtcs).await;

        if progress == ProcessResult::FragmentConsumed {
            exchange.send_flow_control().await?;
            for _ in 0..buffer.expected_frames() {
                let frame = match exchange.await_response().await {
                    RxResult::Received(frame) => frame,
                    RxResult::TimedOut | RxResult::Cancelled => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!(
                            "Continuation frame missing ({}/{})",
                            buffer.frames_received(),
                            buffer.expected_frames()
                        );
                        break;
                    }
                };
                let hex = HexView::from_raw(&frame.data);
                match buffer.push(&LogicalFrame::decode(&hex)) {
                    Ok(ProcessResult::Ignored) => continue,
                    Ok(_) => {}
                    Err(_e) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("DTC list cut short: {}", _e);
                        break;
                    }
                }
                shown = self.show_new_dtcs(&buffer, count, shown, &mut dtcs).await;
                if buffer.is_complete() {
                    break;
                }
            }
        }
        drop(exchange);

        self.cancel.cancelled().await;
        Ok(ServiceOutcome::Dtcs(dtcs))
    }

    /// Decode and draw the codes whose two bytes arrived since `shown`.
    /// Returns the new number of handled codes.
    async fn show_new_dtcs(
        &self,
        buffer: &ReassemblyBuffer,
        count: usize,
        shown: usize,
        dtcs: &mut DtcList,
    ) -> usize {
        // Byte 0 is the code count, codes follow two bytes each.
        let codes = buffer.as_slice().get(1..).unwrap_or(&[]);
        let available = count.min(codes.len() / 2);
        for index in shown..available {
            let raw = [codes[2 * index], codes[2 * index + 1]];
            match decode_dtc(&raw) {
                Ok(dtc) => {
                    self.draw_dtc(index, &dtc).await;
                    let _ = dtcs.push(dtc);
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("DTC {} not decodable: {}", index, _e);
                }
            }
        }
        available.max(shown)
    }

    /// One code per row, drawn character by character.
    async fn draw_dtc(&self, row: usize, dtc: &Dtc) {
        self.paint(|display| {
            for (column, c) in dtc.chars().enumerate() {
                let x = texts::DTC_ROW_X + texts::DTC_CHAR_STEP * column as i16;
                display.draw_char(x, texts::dtc_row_y(row), c, DATA_TEXT);
            }
        })
        .await;
    }

    /// Task running [`read_dtcs`](Self::read_dtcs) on each READ_DTC or
    /// READ_DTC_DRIVING_CYCLE trigger.
    pub async fn run_read_dtc_task<T: DiagTimer>(&self, mut timer: T) {
        loop {
            let trigger = self
                .flags
                .wait_any(EventBits::READ_DTC | EventBits::READ_DTC_DRIVING_CYCLE)
                .await;
            let (kind, service) = if trigger.contains(EventBits::READ_DTC) {
                (DtcKind::Stored, ServiceKind::ReadDtc)
            } else {
                (DtcKind::DrivingCycle, ServiceKind::ReadDtcDrivingCycle)
            };
            let result = self.read_dtcs(kind, &mut timer).await;
            self.finish(service, result).await;
        }
    }
}
