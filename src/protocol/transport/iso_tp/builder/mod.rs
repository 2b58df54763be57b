//! CAN frame generator for diagnostic requests: OBD request frames padded the
//! way each service expects and the flow-control "go ahead" frame.
use crate::error::CanIdBuildError;
use crate::protocol::transport::can_frame::{CanFrame, MAX_BYTES};
use crate::protocol::transport::can_id::CanId;

/// Header byte of a flow-control frame (clear to send, no block size limit).
pub const FLOW_CONTROL_HEADER: u8 = 0x30;

/// Build a request frame.
///
/// * `id` – functional (`0x7DF`) or physical request identifier
/// * `bytes` – request bytes, starting with the single-frame length byte
/// * `len` – Data Length Code announced on the bus
/// * `filler` – value of every byte after `bytes`
///
/// The whole eight-byte buffer is filled so the bytes past `len` are
/// deterministic as well.
pub fn obd_request(
    id: CanId,
    bytes: &[u8],
    len: usize,
    filler: u8,
) -> Result<CanFrame, CanIdBuildError> {
    if bytes.len() > MAX_BYTES {
        return Err(CanIdBuildError::PayloadTooLong { len: bytes.len() });
    }
    if len > MAX_BYTES {
        return Err(CanIdBuildError::PayloadTooLong { len });
    }
    let mut data = [filler; MAX_BYTES];
    data[..bytes.len()].copy_from_slice(bytes);
    Ok(CanFrame { id, data, len })
}

/// Flow-control frame `30 00 00 00 00 00 00 00` sent to the ECU's physical
/// request identifier after a first frame.
pub const fn flow_control(id: CanId) -> CanFrame {
    let mut data = [0u8; MAX_BYTES];
    data[0] = FLOW_CONTROL_HEADER;
    CanFrame::new(id, data)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
