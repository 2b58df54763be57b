//! Tests for the request and flow-control builders.
use super::*;
use crate::protocol::transport::can_id::{EcuRole, REMOTE_REQUEST_ID};

#[test]
/// Read DTC request: full DLC, trailing bytes padded with 0x55.
fn test_read_dtc_request() {
    let frame = obd_request(REMOTE_REQUEST_ID, &[0x01, 0x03], 8, 0x55).unwrap();
    assert_eq!(frame.id.raw(), 0x7DF);
    assert_eq!(frame.len, 8);
    assert_eq!(frame.data, [0x01, 0x03, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55]);
}

#[test]
/// Short DLC: only the announced bytes are valid but the tail is still filled.
fn test_live_data_request_short_dlc() {
    let frame = obd_request(REMOTE_REQUEST_ID, &[0x02, 0x01, 0x0C], 3, 0xA5).unwrap();
    assert_eq!(frame.payload(), &[0x02, 0x01, 0x0C]);
    assert_eq!(frame.data[3..], [0xA5; 5]);
}

#[test]
/// Oversized request bytes or DLC are refused.
fn test_request_too_long() {
    assert_eq!(
        obd_request(REMOTE_REQUEST_ID, &[0; 9], 8, 0),
        Err(CanIdBuildError::PayloadTooLong { len: 9 })
    );
    assert_eq!(
        obd_request(REMOTE_REQUEST_ID, &[0x01], 9, 0),
        Err(CanIdBuildError::PayloadTooLong { len: 9 })
    );
}

#[test]
/// Flow control goes to the physical request identifier of the ECU.
fn test_flow_control_frame() {
    let frame = flow_control(EcuRole::Tcm.request_id());
    assert_eq!(frame.id.raw(), 0x7E1);
    assert_eq!(frame.len, 8);
    assert_eq!(frame.data, [0x30, 0, 0, 0, 0, 0, 0, 0]);
}
