//! Live-data catalog: the six mode 01 PIDs the scanner can scale, their screen
//! rows, and value formatting.
use core::fmt::Write;

use heapless::String;

use crate::error::LiveDataError;

/// Entries in the catalog.
pub const NUM_LIVE_DATA_PIDS: usize = 6;
/// Characters shown for a value.
pub const LIVE_VALUE_CHARS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
/// Decodable PIDs, in screen-row order.
pub enum LivePid {
    EngineLoad = 0x04,
    CoolantTemperature = 0x05,
    ShortTermFuelTrim = 0x06,
    LongTermFuelTrim = 0x07,
    EngineRpm = 0x0C,
    VehicleSpeed = 0x0D,
}

impl LivePid {
    /// Catalog order (also the polling order on the ECM).
    pub const ALL: [LivePid; NUM_LIVE_DATA_PIDS] = [
        LivePid::EngineLoad,
        LivePid::CoolantTemperature,
        LivePid::ShortTermFuelTrim,
        LivePid::LongTermFuelTrim,
        LivePid::EngineRpm,
        LivePid::VehicleSpeed,
    ];

    /// Catalog entry for a PID number.
    pub fn from_pid(pid: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|entry| entry.pid() == pid)
    }

    /// PID number on the wire.
    #[inline]
    pub const fn pid(self) -> u8 {
        self as u8
    }

    /// Screen row (index in the catalog).
    pub const fn row(self) -> usize {
        match self {
            LivePid::EngineLoad => 0,
            LivePid::CoolantTemperature => 1,
            LivePid::ShortTermFuelTrim => 2,
            LivePid::LongTermFuelTrim => 3,
            LivePid::EngineRpm => 4,
            LivePid::VehicleSpeed => 5,
        }
    }

    /// Row label.
    pub const fn label(self) -> &'static str {
        match self {
            LivePid::EngineLoad => "Charge motor:",
            LivePid::CoolantTemperature => "Motor temperature:",
            LivePid::ShortTermFuelTrim => "S.F.C.(Bank 1):",
            LivePid::LongTermFuelTrim => "L.F.C.(Bank 1):",
            LivePid::EngineRpm => "RPM:",
            LivePid::VehicleSpeed => "Speed:",
        }
    }

    /// Physical value from data bytes `A` and `B`.
    pub fn decode(self, a: u8, b: u8) -> f64 {
        let a = a as f64;
        let b = b as f64;
        match self {
            LivePid::EngineLoad => a * 100.0 / 255.0,
            LivePid::CoolantTemperature => a - 40.0,
            LivePid::ShortTermFuelTrim | LivePid::LongTermFuelTrim => (a - 128.0) * 100.0 / 128.0,
            LivePid::EngineRpm => (a * 256.0 + b) / 4.0,
            LivePid::VehicleSpeed => a,
        }
    }
}

/// Latest value per catalog row, overwritten in place.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LiveValues([f64; NUM_LIVE_DATA_PIDS]);

impl LiveValues {
    pub const fn new() -> Self {
        Self([0.0; NUM_LIVE_DATA_PIDS])
    }

    pub fn set(&mut self, pid: LivePid, value: f64) {
        self.0[pid.row()] = value;
    }

    pub fn get(&self, pid: LivePid) -> f64 {
        self.0[pid.row()]
    }
}

/// Decode a live-data response.
///
/// * `payload` – data bytes after mode and PID (`A`, then `B` when present)
/// * `pid` – PID echoed by the ECU
pub fn decode_live_response(payload: &[u8], pid: u8) -> Result<(LivePid, f64), LiveDataError> {
    let entry = LivePid::from_pid(pid).ok_or(LiveDataError::UnknownPid { pid })?;
    let (&a, rest) = payload.split_first().ok_or(LiveDataError::MissingData)?;
    let b = rest.first().copied().unwrap_or(0);
    Ok((entry, entry.decode(a, b)))
}

/// Five visible characters of `value` printed with six decimals. When the
/// fifth character would be the decimal point, the value is shifted right by
/// one space and the point dropped (`1664.0` shows as `" 1664"`).
pub fn format_live_value(value: f64) -> String<LIVE_VALUE_CHARS> {
    let mut full: String<32> = String::new();
    // Values are bounded by the one/two byte scalings, far below 32 characters.
    let _ = write!(full, "{:.6}", value);
    let visible = full.get(..LIVE_VALUE_CHARS).unwrap_or(full.as_str());

    let mut out = String::new();
    if visible.as_bytes().get(LIVE_VALUE_CHARS - 1) == Some(&b'.') {
        let _ = out.push(' ');
        let _ = out.push_str(&visible[..LIVE_VALUE_CHARS - 1]);
    } else {
        let _ = out.push_str(visible);
    }
    out
}
