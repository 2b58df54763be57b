//! # Simulated scan
//!
//! Runs the scanner engine against an in-process engine control module:
//! - the dispatcher and every service task, as spawned on the device;
//! - a console display printing what the panel would show;
//! - a scripted user reading codes, the VIN, and a few live values.
//!
//! ```bash
//! cargo run --example simulated_scan
//! ```

use obd_scanner::protocol::{
    coordinator::cancel::Button,
    session::{Scanner, Timings},
    transport::{
        can_frame::CanFrame,
        can_id::{CanId, EcuRole},
        traits::{
            can_bus::{BusEvent, CanBus},
            diag_timer::DiagTimer,
        },
    },
    ui::{Display, MenuPage, TextStyle},
};
use static_cell::StaticCell;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

// ============================================================================
// Host-side collaborators
// ============================================================================

/// Bus forwarding queued frames to the simulated ECU.
struct ChannelBus(mpsc::UnboundedSender<CanFrame>);

impl CanBus for ChannelBus {
    type Error = ();

    fn configure_rx(&mut self, filter: CanId, mask: u16) -> Result<(), ()> {
        println!("   [bus] receive filter 0x{:03X}/0x{:03X}", filter.raw(), mask);
        Ok(())
    }

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), ()> {
        println!("   [bus] -> 0x{:03X} {:02X?}", frame.id.raw(), frame.payload());
        self.0.send(*frame).map_err(|_| ())
    }
}

/// Panel replacement printing every text.
struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn clear(&mut self) {
        println!("   [lcd] ----------------");
    }

    fn fill_rect(&mut self, _x: i16, _y: i16, _w: i16, _h: i16, _colour: u16) {}

    fn draw_text(&mut self, x: i16, y: i16, text: &str, _style: TextStyle) {
        println!("   [lcd] ({x:>3},{y:>3}) {}", text.replace('\n', " "));
    }

    fn draw_char(&mut self, x: i16, y: i16, c: char, _style: TextStyle) {
        println!("   [lcd] ({x:>3},{y:>3}) {c}");
    }

    fn draw_menu(&mut self, page: MenuPage, cursor: u16) {
        println!("   [lcd] menu {page:?} > {}", page.items()[cursor as usize]);
    }
}

#[derive(Clone, Copy)]
struct TokioTimer;

impl DiagTimer for TokioTimer {
    async fn delay_ms(&mut self, millis: u32) {
        sleep(Duration::from_millis(millis as u64)).await;
    }
}

type DemoScanner = Scanner<ChannelBus, ConsoleDisplay>;

static SCANNER: StaticCell<DemoScanner> = StaticCell::new();

// ============================================================================
// Simulated engine control module
// ============================================================================

fn ecm_answer(request: &CanFrame) -> Vec<[u8; 8]> {
    match request.data {
        // Stored codes: P0107 and C0245.
        [0x01, 0x03, ..] => vec![[0x06, 0x43, 0x02, 0x01, 0x07, 0x42, 0x45, 0x55]],
        // VIN, first frame; the rest follows the flow control.
        [0x02, 0x09, 0x02, ..] => vec![[0x10, 0x14, 0x49, 0x02, 0x01, b'1', b'G', b'1']],
        [0x30, ..] => vec![
            [0x21, b'J', b'C', b'5', b'4', b'4', b'4', b'R'],
            [0x22, b'7', b'2', b'5', b'2', b'3', b'6', b'7'],
        ],
        [0x02, 0x01, 0x0C, ..] => vec![[0x04, 0x41, 0x0C, 0x1A, 0x00, 0, 0, 0]],
        [0x02, 0x01, pid, ..] => vec![[0x03, 0x41, pid, 0x7B, 0, 0, 0, 0]],
        _ => vec![],
    }
}

async fn simulated_ecm(scanner: &DemoScanner, mut rx: mpsc::UnboundedReceiver<CanFrame>) {
    while let Some(request) = rx.recv().await {
        sleep(Duration::from_millis(1)).await;
        scanner.on_bus_interrupt(BusEvent::Transmitted);
        for data in ecm_answer(&request) {
            sleep(Duration::from_millis(2)).await;
            let frame = CanFrame::new(EcuRole::Ecm.response_id(), data);
            scanner.on_bus_interrupt(BusEvent::Received(frame));
        }
    }
}

// ============================================================================
// Scripted user
// ============================================================================

async fn user(scanner: &DemoScanner) {
    scanner.show_start_menu().await;
    sleep(Duration::from_millis(100)).await;

    println!("\n1. Selecting the ECM");
    scanner.select_ecu(0);
    sleep(Duration::from_millis(100)).await;

    println!("\n2. Reading stored codes");
    scanner.select_service(1);
    sleep(Duration::from_millis(500)).await;
    scanner.press(Button::Left);
    sleep(Duration::from_millis(100)).await;

    println!("\n3. Reading the VIN");
    scanner.select_service(0);
    sleep(Duration::from_millis(4_500)).await;

    println!("\n4. A few rounds of live data");
    scanner.select_service(4);
    sleep(Duration::from_millis(60)).await;
    scanner.press(Button::Menu);
    sleep(Duration::from_millis(300)).await;
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== obd-scanner simulated scan ===\n");

    let (tx, rx) = mpsc::unbounded_channel();
    let scanner: &'static DemoScanner = SCANNER.init(Scanner::new(
        ChannelBus(tx),
        ConsoleDisplay,
        Timings::DEFAULT,
    ));

    let device = async {
        tokio::join!(
            scanner.run_dispatcher(),
            scanner.run_read_dtc_task(TokioTimer),
            scanner.run_erase_dtc_task(TokioTimer),
            scanner.run_vehicle_info_task(TokioTimer),
            scanner.run_freeze_frame_task(TokioTimer),
            scanner.run_live_data_task(TokioTimer),
        )
    };

    tokio::select! {
        _ = user(scanner) => println!("\nSimulated scan complete."),
        _ = device => unreachable!("service tasks never return"),
        _ = simulated_ecm(scanner, rx) => println!("ECU link closed"),
    }
}
