//! Session engine tests, polled without an executor. Exchanges needing an ECU
//! answer are covered by the integration tests.
use super::*;
use crate::protocol::coordinator::bus_status::BusErrorFlags;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::{CanId, EcuRole, REMOTE_REQUEST_ID};
use crate::protocol::ui::TextStyle;
use futures_util::{Future, FutureExt};

/// Bus accepting every frame, remembering the last one and the filter.
#[derive(Default)]
struct SilentBus {
    sent: u32,
    last: Option<CanFrame>,
    filter: Option<CanId>,
}

impl CanBus for SilentBus {
    type Error = ();

    fn configure_rx(&mut self, filter: CanId, _mask: u16) -> Result<(), ()> {
        self.filter = Some(filter);
        Ok(())
    }

    fn send<'a>(&'a mut self, frame: &'a CanFrame) -> impl Future<Output = Result<(), ()>> + 'a {
        self.sent += 1;
        self.last = Some(*frame);
        core::future::ready(Ok(()))
    }
}

/// Keeps the clear count, the last text, and the last menu drawn.
#[derive(Default)]
struct LastDraw {
    clears: u32,
    text: heapless::String<64>,
    at: (i16, i16),
    menu: Option<(MenuPage, u16)>,
}

impl Display for LastDraw {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn fill_rect(&mut self, _x: i16, _y: i16, _w: i16, _h: i16, _colour: u16) {}

    fn draw_text(&mut self, x: i16, y: i16, text: &str, _style: TextStyle) {
        self.text.clear();
        let _ = self.text.push_str(text);
        self.at = (x, y);
    }

    fn draw_char(&mut self, _x: i16, _y: i16, _c: char, _style: TextStyle) {}

    fn draw_menu(&mut self, page: MenuPage, cursor: u16) {
        self.menu = Some((page, cursor));
    }
}

/// Timer whose delays elapse immediately, summing what was asked.
#[derive(Default)]
struct ElapsedTimer {
    waited: u32,
}

impl DiagTimer for ElapsedTimer {
    async fn delay_ms(&mut self, millis: u32) {
        self.waited += millis;
    }
}

fn scanner() -> Scanner<SilentBus, LastDraw> {
    Scanner::new(SilentBus::default(), LastDraw::default(), Timings::DEFAULT)
}

#[test]
/// Default waits and holds.
fn test_default_timings() {
    let timings = Timings::default();
    assert_eq!(timings.response_timeout_ms, 200);
    assert_eq!(timings.send_timeout_ms, 100);
    assert_eq!(timings.result_hold_ms, 4_000);
    assert_eq!(timings.not_implemented_hold_ms, 3_000);
    assert_eq!(timings.flow_control_delay_ms, 10);
}

#[test]
/// Reception raises CAN_RX; an unread frame overwritten also raises CAN_ERROR.
fn test_interrupt_reception() {
    let scanner = scanner();
    let frame = CanFrame::new(EcuRole::Ecm.response_id(), [0x02, 0x44, 0, 0, 0, 0, 0, 0]);

    scanner.on_bus_interrupt(BusEvent::Received(frame));
    assert_eq!(scanner.flags().get(), EventBits::CAN_RX);

    scanner.on_bus_interrupt(BusEvent::Received(frame));
    assert_eq!(scanner.flags().get(), EventBits::CAN_RX | EventBits::CAN_ERROR);
    assert_eq!(scanner.mailbox.take_errors(), BusErrorFlags::DATA_LOST);
}

#[test]
/// Status interrupts only raise CAN_ERROR for real faults.
fn test_interrupt_status() {
    let scanner = scanner();
    scanner.on_bus_interrupt(BusEvent::BusError(BusErrorFlags::TX_OK | BusErrorFlags::RX_OK));
    assert!(scanner.flags().get().is_empty());

    scanner.on_bus_interrupt(BusEvent::BusError(BusErrorFlags::BUS_OFF));
    assert_eq!(scanner.flags().get(), EventBits::CAN_ERROR);

    scanner.on_bus_interrupt(BusEvent::Transmitted);
    assert!(scanner.flags().get().contains(EventBits::CAN_TX));
    assert!(scanner.mailbox.take_errors().is_empty());
}

#[test]
/// Menu confirmations store the cursor and fire the matching bit.
fn test_menu_inputs() {
    let scanner = scanner();
    scanner.select_service(2);
    assert_eq!(scanner.context().service_cursor, 2);
    assert_eq!(scanner.flags().get(), EventBits::SELECT_CAN_COMMAND);

    scanner.select_ecu(1);
    assert_eq!(scanner.context().ecu_cursor, 1);
    assert!(scanner.flags().get().contains(EventBits::SELECT_ECU_ADDRESS));
    // The ECU only changes once the dispatcher handles the bit.
    assert_eq!(scanner.context().ecu, EcuRole::Ecm);
}

#[test]
/// Returning to the menu redraws the service page with the first item.
fn test_return_to_menu() {
    let scanner = scanner();
    scanner.update_context(|context| {
        context.service_cursor = 4;
        context.on_menu = false;
    });
    assert!(scanner.return_to_menu().now_or_never().is_some());

    let context = scanner.context();
    assert_eq!(context.page, MenuPage::Services);
    assert_eq!(context.service_cursor, 0);
    assert!(context.on_menu);
    let display = scanner.display.try_lock().unwrap();
    assert_eq!(display.menu, Some((MenuPage::Services, 0)));
    assert_eq!(display.clears, 1);
}

#[test]
/// VIN on another ECU: notice shown for the short hold, nothing sent.
fn test_vehicle_info_not_implemented() {
    let scanner = scanner();
    scanner.update_context(|context| context.ecu = EcuRole::Tcm);
    let mut timer = ElapsedTimer::default();

    let outcome = scanner.vehicle_info(&mut timer).now_or_never();
    assert!(matches!(outcome, Some(Ok(ServiceOutcome::NotImplemented))));
    assert_eq!(timer.waited, 3_000);

    let display = scanner.display.try_lock().unwrap();
    assert_eq!(display.text.as_str(), texts::MODE_NOT_IMPLEMENTED);
    assert_eq!(display.at, (25, 60));
    assert_eq!(scanner.bus.try_lock().unwrap().sent, 0);
}

#[test]
/// Erase request without any answer: "no DTCs" screen held four seconds.
fn test_erase_without_answer() {
    let scanner = scanner();
    let mut timer = ElapsedTimer::default();

    let outcome = scanner.erase_dtcs(&mut timer).now_or_never();
    assert!(matches!(outcome, Some(Ok(ServiceOutcome::NothingToErase))));

    let bus = scanner.bus.try_lock().unwrap();
    let request = bus.last.unwrap();
    assert_eq!(request.id, REMOTE_REQUEST_ID);
    assert_eq!(request.payload(), &[0x01, 0x04]);
    assert_eq!(request.data[2..], [0x55; 6]);
    assert_eq!(bus.filter, Some(EcuRole::Ecm.response_id()));

    let display = scanner.display.try_lock().unwrap();
    assert_eq!(display.text.as_str(), texts::NO_DTCS_TO_CLEAR);
    assert_eq!(display.at, (20, 50));
    // Send timeout, response timeout, then the hold.
    assert_eq!(timer.waited, 100 + 200 + 4_000);
}

#[test]
/// Without a first answer the DTC read waits for the user.
fn test_read_dtcs_waits_for_answer() {
    let scanner = scanner();
    let mut timer = ElapsedTimer::default();
    assert!(scanner
        .read_dtcs(DtcKind::Stored, &mut timer)
        .now_or_never()
        .is_none());
    let request = scanner.bus.try_lock().unwrap().last.unwrap();
    assert_eq!(request.data, [0x01, 0x03, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55]);
    assert_eq!(request.len, 8);
}
