//! VIN read: multi-frame ASCII reassembly with the paced flow control.
mod helpers {
    include!("helpers/mod.rs");
}

use helpers::{is_request, response, rig};
use obd_scanner::protocol::{
    session::ServiceOutcome,
    transport::can_id::{EcuRole, REMOTE_REQUEST_ID},
    ui::texts,
};

const FIRST: [u8; 8] = [0x10, 0x14, 0x49, 0x02, 0x01, b'1', b'G', b'1'];
const SECOND: [u8; 8] = [0x21, b'J', b'C', b'5', b'4', b'4', b'4', b'R'];
const THIRD: [u8; 8] = [0x22, b'7', b'2', b'5', b'2', b'3', b'6', b'7'];

#[tokio::test(start_paused = true)]
/// Seventeen characters across three frames.
async fn test_multi_frame_vin() {
    let (scanner, ecu, bus, display, mut timer) = rig();
    let simulator = ecu.serve(&scanner, |request| {
        if request.data[0] == 0x30 {
            vec![response(EcuRole::Ecm, SECOND), response(EcuRole::Ecm, THIRD)]
        } else {
            assert!(is_request(request, &[0x02, 0x09, 0x02]));
            vec![response(EcuRole::Ecm, FIRST)]
        }
    });

    let outcome = tokio::select! {
        outcome = scanner.vehicle_info(&mut timer) => outcome.unwrap(),
        _ = simulator => unreachable!(),
    };

    match outcome {
        ServiceOutcome::Vin(vin) => assert_eq!(vin.as_str(), "1G1JC5444R7252367"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(display.text_at(70, 50).as_deref(), Some(texts::VIN_TITLE));
    assert_eq!(
        display.text_at(25, 70).as_deref(),
        Some("1G1JC5444R7252367")
    );

    // Flow control paced by 10 ms, result held 4 s.
    let waits = timer.waits();
    assert!(waits.contains(&10));
    assert_eq!(waits.last(), Some(&4_000));

    let sent = bus.sent();
    assert_eq!(sent[0].id, REMOTE_REQUEST_ID);
    assert_eq!(sent[0].len, 3);
    assert_eq!(sent[1].id, EcuRole::Ecm.request_id());
    assert_eq!(sent[1].data[0], 0x30);
}

#[tokio::test(start_paused = true)]
/// A lost continuation frame leaves a partial VIN on screen.
async fn test_partial_vin() {
    let (scanner, ecu, _bus, display, mut timer) = rig();
    let simulator = ecu.serve(&scanner, |request| {
        if request.data[0] == 0x30 {
            vec![response(EcuRole::Ecm, SECOND)]
        } else {
            vec![response(EcuRole::Ecm, FIRST)]
        }
    });

    let outcome = tokio::select! {
        outcome = scanner.vehicle_info(&mut timer) => outcome.unwrap(),
        _ = simulator => unreachable!(),
    };

    match outcome {
        ServiceOutcome::Vin(vin) => assert_eq!(vin.as_str(), "1G1JC5444R"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(display.text_at(25, 70).as_deref(), Some("1G1JC5444R"));
}

#[tokio::test(start_paused = true)]
/// Silent ECU: nothing but the hold.
async fn test_vin_timeout() {
    let (scanner, ecu, _bus, display, mut timer) = rig();
    let simulator = ecu.serve(&scanner, |_| vec![]);

    let outcome = tokio::select! {
        outcome = scanner.vehicle_info(&mut timer) => outcome.unwrap(),
        _ = simulator => unreachable!(),
    };

    assert_eq!(outcome, ServiceOutcome::ReceptionTimeout);
    assert!(!display.has_text(texts::VIN_TITLE));
    assert_eq!(timer.waits().last(), Some(&4_000));
}

#[tokio::test(start_paused = true)]
/// NUL padding at the end of the last frame is not part of the VIN.
async fn test_vin_padding_dropped() {
    let (scanner, ecu, _bus, display, mut timer) = rig();
    let simulator = ecu.serve(&scanner, |request| {
        if request.data[0] == 0x30 {
            vec![
                response(EcuRole::Ecm, SECOND),
                response(EcuRole::Ecm, [0x22, b'7', b'2', 0, 0, 0, 0, 0]),
            ]
        } else {
            vec![response(
                EcuRole::Ecm,
                [0x10, 0x10, 0x49, 0x02, 0x01, b'1', b'G', b'1'],
            )]
        }
    });

    let outcome = tokio::select! {
        outcome = scanner.vehicle_info(&mut timer) => outcome.unwrap(),
        _ = simulator => unreachable!(),
    };

    match outcome {
        ServiceOutcome::Vin(vin) => assert_eq!(vin.as_str(), "1G1JC5444R72"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(display.text_at(25, 70).as_deref(), Some("1G1JC5444R72"));
}
