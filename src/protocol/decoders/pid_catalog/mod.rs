//! Supported-PID bitmaps ("PIDs supported [01-20]") for current data and
//! freeze-frame modes.
use heapless::Vec;

/// Largest set a bitmap can describe (four bytes).
pub const MAX_SUPPORTED_PIDS: usize = 32;

/// 1-based PID numbers, in ascending order.
pub type SupportedPids = Vec<u8, MAX_SUPPORTED_PIDS>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// OBD mode whose supported PIDs are queried.
pub enum PidMode {
    /// Mode 01: four-byte bitmap right after the echoed PID.
    CurrentData,
    /// Mode 02: one-byte bitmap after the echoed PID and frame number.
    FreezeFrame,
}

impl PidMode {
    /// Request bytes (single-frame length byte included).
    pub const fn request(&self) -> &'static [u8] {
        match self {
            PidMode::CurrentData => &[0x02, 0x01, 0x00],
            PidMode::FreezeFrame => &[0x03, 0x02, 0x00, 0x00],
        }
    }

    /// Position of the bitmap inside the raw response frame.
    pub const fn bitmap_range(&self) -> core::ops::Range<usize> {
        match self {
            PidMode::CurrentData => 3..7,
            PidMode::FreezeFrame => 4..5,
        }
    }
}

/// Positions of the set bits, most significant bit of the first byte being
/// PID 1. At most four bytes are read.
pub fn supported_pids(bitmap: &[u8]) -> SupportedPids {
    let mut pids = SupportedPids::new();
    for (index, byte) in bitmap.iter().take(MAX_SUPPORTED_PIDS / 8).enumerate() {
        for bit in 0..8u8 {
            if byte & (0x80 >> bit) != 0 {
                // Capacity matches the four-byte limit above.
                let _ = pids.push(index as u8 * 8 + bit + 1);
            }
        }
    }
    pids
}
