//! OBD-II over CAN transport layer: 11-bit identifiers, raw frames, the
//! ISO-TP-like frame codec, and bus/timer abstraction traits.
//!
//! ## Timing constants
//!
//! These constants define the waits and display holds used by every
//! diagnostic session. [`Timings`](crate::protocol::session::Timings) groups
//! them so a host can override them.

pub mod can_frame;
pub mod can_id;
pub mod iso_tp;
pub mod traits;

/// Bounded wait for an ECU response frame (ms).
///
/// Applies to continuation frames, live-data polling, erase acknowledgement,
/// and the VIN / freeze-frame exchanges. Once it elapses the attempt is
/// abandoned: the session shows an error state or moves on to the next PID.
pub const RESPONSE_TIMEOUT_MS: u32 = 200;

/// Bounded wait for the transmit-complete (or bus error) interrupt (ms).
///
/// On a 500 kbps bus one 8-byte frame takes ~0.25 ms; with arbitration and
/// automatic retransmissions a few ms. A frame still pending after this delay
/// means the controller is not able to send.
///
/// # Example
///
/// ```rust,ignore
/// use embassy_time::{with_timeout, Duration};
/// use obd_scanner::protocol::transport::CAN_SEND_TIMEOUT_MS;
///
/// async fn send_with_timeout(&mut self, frame: &CanFrame) -> Result<(), Error> {
///     with_timeout(
///         Duration::from_millis(CAN_SEND_TIMEOUT_MS as u64),
///         self.can.transmit_async(&twai_frame)
///     )
///     .await
///     .map_err(|_| Error::Timeout)?
/// }
/// ```
pub const CAN_SEND_TIMEOUT_MS: u32 = 100;

/// Time a service result stays on screen before returning to the menu (ms).
pub const RESULT_HOLD_MS: u32 = 4_000;

/// Time the "mode not implemented" notice stays on screen (ms).
pub const NOT_IMPLEMENTED_HOLD_MS: u32 = 3_000;

/// Pause before a flow-control frame is queued on the VIN path (ms).
///
/// The DTC-read path sends its flow-control frame without this pause.
pub const FLOW_CONTROL_DELAY_MS: u32 = 10;
