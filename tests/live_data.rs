//! Live-data polling: decoding, catalog selection, and cancellation latency.
mod helpers {
    include!("helpers/mod.rs");
}

use std::sync::{Arc, Mutex};

use helpers::{press_after, response, rig};
use obd_scanner::protocol::{
    coordinator::cancel::Button,
    session::ServiceOutcome,
    transport::can_id::EcuRole,
    ui::texts,
};
use tokio::time::{Duration, Instant};

#[tokio::test(start_paused = true)]
/// RPM bytes 0x1A 0x00 show as " 1664" on the RPM row.
async fn test_live_rpm() {
    let (scanner, ecu, _bus, display, mut timer) = rig();
    let simulator = ecu.serve(&scanner, |request| {
        let pid = request.data[2];
        let data = if pid == 0x0C {
            [0x04, 0x41, 0x0C, 0x1A, 0x00, 0, 0, 0]
        } else {
            [0x03, 0x41, pid, 0x80, 0, 0, 0, 0]
        };
        vec![response(EcuRole::Ecm, data)]
    });

    let outcome = tokio::select! {
        outcome = scanner.live_data(&mut timer) => outcome.unwrap(),
        _ = simulator => unreachable!(),
        _ = press_after(&scanner, 1_000, Button::Menu) => unreachable!(),
    };

    let ServiceOutcome::LiveDataStopped { rounds } = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert!(rounds >= 6);

    let rpm_row = texts::live_row_y(4);
    assert_eq!(
        display.text_at(texts::LIVE_VALUE_X, rpm_row).as_deref(),
        Some(" 1664")
    );
    assert_eq!(
        display.text_at(texts::LIVE_LABEL_X, rpm_row).as_deref(),
        Some("RPM:")
    );
    // Fuel trims at 0x80 are exactly zero.
    assert_eq!(
        display
            .text_at(texts::LIVE_VALUE_X, texts::live_row_y(2))
            .as_deref(),
        Some("0.000")
    );
}

#[tokio::test(start_paused = true)]
/// A cancel raised while the ECU stays silent is honoured within one round
/// trip.
async fn test_cancel_while_waiting() {
    let (scanner, ecu, bus, _display, mut timer) = rig();
    let simulator = ecu.serve(&scanner, |_| vec![]);

    let started = Instant::now();
    let outcome = tokio::select! {
        outcome = scanner.live_data(&mut timer) => outcome.unwrap(),
        _ = simulator => unreachable!(),
        _ = press_after(&scanner, 50, Button::Left) => unreachable!(),
    };
    let elapsed = started.elapsed();

    assert!(matches!(outcome, ServiceOutcome::LiveDataStopped { .. }));
    // Press at 50 ms, at most one pending response wait after it.
    assert!(elapsed <= Duration::from_millis(50 + 100 + 200 + 10));
    assert!(bus.sent().len() <= 2);
}

#[tokio::test(start_paused = true)]
/// Other ECUs poll their advertised PIDs, never PID 0x1C.
async fn test_advertised_catalog() {
    let (scanner, ecu, bus, _display, mut timer) = rig();
    let polled = Arc::new(Mutex::new(Vec::new()));
    let seen = polled.clone();
    let simulator = ecu.serve(&scanner, move |request| {
        let pid = request.data[2];
        if pid == 0x00 {
            // PIDs 1, 5, 13 and 28.
            return vec![response(
                EcuRole::Tcm,
                [0x06, 0x41, 0x00, 0x88, 0x08, 0x00, 0x10, 0x00],
            )];
        }
        seen.lock().unwrap().push(pid);
        vec![response(EcuRole::Tcm, [0x03, 0x41, pid, 0x64, 0, 0, 0, 0])]
    });

    scanner.select_ecu(1);
    let run = async {
        // Let the dispatcher switch the ECU first.
        tokio::time::sleep(Duration::from_millis(5)).await;
        scanner.live_data(&mut timer).await
    };

    let outcome = tokio::select! {
        outcome = run => outcome.unwrap(),
        _ = scanner.run_dispatcher() => unreachable!(),
        _ = simulator => unreachable!(),
        _ = press_after(&scanner, 500, Button::Menu) => unreachable!(),
    };

    assert!(matches!(outcome, ServiceOutcome::LiveDataStopped { .. }));
    assert_eq!(bus.filter().map(|(id, _)| id), Some(EcuRole::Tcm.response_id()));

    let polled = polled.lock().unwrap();
    assert!(polled.len() >= 2);
    assert!(polled.iter().all(|&pid| pid == 0x05 || pid == 0x0D));
    assert_eq!(&polled[..2], &[0x05, 0x0D]);
}
