/// Test doubles simulating the CAN controller, the display, the timer, and an
/// answering ECU during integration tests.
use obd_scanner::protocol::{
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
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

#[allow(dead_code)]
pub type TestScanner = Scanner<MockCanBus, RecordingDisplay>;

/// Delay between a frame on the bus and the interrupt it causes.
const BUS_LATENCY: Duration = Duration::from_millis(1);

//==================================================================================BUS
#[derive(Clone)]
#[allow(dead_code)]
/// In-memory CAN controller: queued frames go to the simulated ECU, every
/// sent frame and receive filter is recorded.
pub struct MockCanBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    sent: Arc<Mutex<Vec<CanFrame>>>,
    filter: Arc<Mutex<Option<(CanId, u16)>>>,
}

#[allow(dead_code)]
impl MockCanBus {
    /// Frames queued so far, oldest first.
    pub fn sent(&self) -> Vec<CanFrame> {
        self.sent.lock().unwrap().clone()
    }

    /// Receive filter currently loaded.
    pub fn filter(&self) -> Option<(CanId, u16)> {
        *self.filter.lock().unwrap()
    }
}

impl CanBus for MockCanBus {
    type Error = ();

    fn configure_rx(&mut self, filter: CanId, mask: u16) -> Result<(), Self::Error> {
        *self.filter.lock().unwrap() = Some((filter, mask));
        Ok(())
    }

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.sent.lock().unwrap().push(*frame);
        self.tx.send(*frame).map_err(|_| ())?;
        Ok(())
    }
}

//==================================================================================TIMER
#[derive(Clone, Default)]
#[allow(dead_code)]
/// Timer based on `tokio::time::sleep`, recording every requested delay.
pub struct MockTimer {
    waits: Arc<Mutex<Vec<u32>>>,
}

#[allow(dead_code)]
impl MockTimer {
    pub fn waits(&self) -> Vec<u32> {
        self.waits.lock().unwrap().clone()
    }
}

impl DiagTimer for MockTimer {
    async fn delay_ms(&mut self, millis: u32) {
        self.waits.lock().unwrap().push(millis);
        sleep(Duration::from_millis(millis as u64)).await;
    }
}

//==================================================================================DISPLAY
#[derive(Clone, Debug, PartialEq)]
#[allow(dead_code)]
pub enum DrawOp {
    Clear,
    FillRect { x: i16, y: i16, w: i16, h: i16, colour: u16 },
    Text { x: i16, y: i16, text: String, style: TextStyle },
    Char { x: i16, y: i16, c: char },
    Menu { page: MenuPage, cursor: u16 },
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Display recording every call.
pub struct RecordingDisplay {
    ops: Arc<Mutex<Vec<DrawOp>>>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Texts drawn, with their position, oldest first.
    pub fn texts(&self) -> Vec<(i16, i16, String)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, .. } => Some((x, y, text)),
                _ => None,
            })
            .collect()
    }

    /// Last text drawn at `(x, y)`.
    pub fn text_at(&self, x: i16, y: i16) -> Option<String> {
        self.texts()
            .into_iter()
            .rev()
            .find(|(tx, ty, _)| *tx == x && *ty == y)
            .map(|(_, _, text)| text)
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.texts().iter().any(|(_, _, drawn)| drawn == text)
    }

    /// Characters drawn one by one on row `y`, left to right.
    pub fn chars_on_row(&self, y: i16) -> String {
        let mut chars: Vec<(i16, char)> = self
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Char { x, y: row, c } if row == y => Some((x, c)),
                _ => None,
            })
            .collect();
        chars.sort_by_key(|(x, _)| *x);
        chars.into_iter().map(|(_, c)| c).collect()
    }

    /// Last menu drawn.
    pub fn last_menu(&self) -> Option<(MenuPage, u16)> {
        self.ops().into_iter().rev().find_map(|op| match op {
            DrawOp::Menu { page, cursor } => Some((page, cursor)),
            _ => None,
        })
    }
}

impl Display for RecordingDisplay {
    fn clear(&mut self) {
        self.ops.lock().unwrap().push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, colour: u16) {
        self.ops
            .lock()
            .unwrap()
            .push(DrawOp::FillRect { x, y, w, h, colour });
    }

    fn draw_text(&mut self, x: i16, y: i16, text: &str, style: TextStyle) {
        self.ops.lock().unwrap().push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            style,
        });
    }

    fn draw_char(&mut self, x: i16, y: i16, c: char, _style: TextStyle) {
        self.ops.lock().unwrap().push(DrawOp::Char { x, y, c });
    }

    fn draw_menu(&mut self, page: MenuPage, cursor: u16) {
        self.ops.lock().unwrap().push(DrawOp::Menu { page, cursor });
    }
}

//==================================================================================ECU
#[allow(dead_code)]
/// Far end of the bus: sees every frame the scanner queues and answers
/// through the scanner's interrupt entry point.
pub struct SimulatedEcu {
    rx: mpsc::UnboundedReceiver<CanFrame>,
    filter: Arc<Mutex<Option<(CanId, u16)>>>,
    /// Report a bus status instead of a completed transmission.
    pub tx_status: Option<BusEvent>,
}

#[allow(dead_code)]
impl SimulatedEcu {
    /// Answer every queued frame with the frames `respond` returns. Frames the
    /// receive filter rejects are not delivered.
    pub async fn serve<F>(mut self, scanner: &TestScanner, mut respond: F)
    where
        F: FnMut(&CanFrame) -> Vec<CanFrame>,
    {
        while let Some(request) = self.rx.recv().await {
            sleep(BUS_LATENCY).await;
            scanner.on_bus_interrupt(self.tx_status.unwrap_or(BusEvent::Transmitted));
            for response in respond(&request) {
                sleep(BUS_LATENCY).await;
                let accepted = match *self.filter.lock().unwrap() {
                    Some((filter, mask)) => response.id.matches(filter, mask),
                    None => false,
                };
                if accepted {
                    scanner.on_bus_interrupt(BusEvent::Received(response));
                }
            }
        }
    }
}

#[allow(dead_code)]
/// Scanner wired to a simulated ECU and recording doubles.
pub fn rig() -> (TestScanner, SimulatedEcu, MockCanBus, RecordingDisplay, MockTimer) {
    let (tx, rx) = mpsc::unbounded_channel();
    let filter = Arc::new(Mutex::new(None));
    let bus = MockCanBus {
        tx,
        sent: Arc::default(),
        filter: filter.clone(),
    };
    let display = RecordingDisplay::default();
    let scanner = Scanner::new(bus.clone(), display.clone(), Timings::DEFAULT);
    let ecu = SimulatedEcu {
        rx,
        filter,
        tx_status: None,
    };
    (scanner, ecu, bus, display, MockTimer::default())
}

#[allow(dead_code)]
/// Frame sent by `ecu` on its response identifier.
pub fn response(ecu: EcuRole, data: [u8; 8]) -> CanFrame {
    CanFrame::new(ecu.response_id(), data)
}

#[allow(dead_code)]
/// `true` when `frame` is the OBD request starting with `bytes`.
pub fn is_request(frame: &CanFrame, bytes: &[u8]) -> bool {
    frame.data.starts_with(bytes)
}

#[allow(dead_code)]
/// Press `button` after `millis`, then stay pending.
pub async fn press_after(
    scanner: &TestScanner,
    millis: u64,
    button: obd_scanner::protocol::coordinator::cancel::Button,
) {
    sleep(Duration::from_millis(millis)).await;
    scanner.press(button);
    std::future::pending::<()>().await
}
