//! ASCII-hex working representation of a raw frame and the framing
//! predicates evaluated on it.
use core::ops::Range;

use crate::error::CodecError;
use crate::protocol::transport::can_frame::MAX_BYTES;
use crate::protocol::transport::iso_tp::{CONSECUTIVE_FRAME_DATA_BYTES, FIRST_FRAME_DATA_BYTES};

/// Number of hex characters in a view (two per payload byte).
pub const HEX_ARRAY: usize = 2 * MAX_BYTES;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Sixteen uppercase hexadecimal characters describing an eight-byte frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HexView([u8; HEX_ARRAY]);

impl HexView {
    /// Encode a raw buffer, high nibble first.
    pub fn from_raw(raw: &[u8; MAX_BYTES]) -> Self {
        let mut hex = [b'0'; HEX_ARRAY];
        for (i, byte) in raw.iter().enumerate() {
            hex[2 * i] = DIGITS[(byte >> 4) as usize];
            hex[2 * i + 1] = DIGITS[(byte & 0x0F) as usize];
        }
        Self(hex)
    }

    /// Parse sixteen hex characters (either case).
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let bytes = text.as_bytes();
        if bytes.len() != HEX_ARRAY {
            return Err(CodecError::PayloadTooShort {
                asked: HEX_ARRAY,
                available: bytes.len(),
            });
        }
        let mut hex = [b'0'; HEX_ARRAY];
        for (position, c) in bytes.iter().enumerate() {
            let upper = c.to_ascii_uppercase();
            if !DIGITS.contains(&upper) {
                return Err(CodecError::InvalidHexDigit { position });
            }
            hex[position] = upper;
        }
        Ok(Self(hex))
    }

    /// Decode back to the raw buffer.
    pub fn to_raw(&self) -> [u8; MAX_BYTES] {
        let mut raw = [0u8; MAX_BYTES];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = (nibble(self.0[2 * i]) << 4) | nibble(self.0[2 * i + 1]);
        }
        raw
    }

    /// Whole view as text.
    pub fn as_str(&self) -> &str {
        // Only ASCII hex digits are ever stored.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Hex character at `position` (0..16).
    #[inline]
    pub fn digit(&self, position: usize) -> u8 {
        self.0[position]
    }

    /// Byte value of the two hex characters starting at `offset`.
    #[inline]
    pub fn byte_at(&self, offset: usize) -> u8 {
        (nibble(self.0[offset]) << 4) | nibble(self.0[offset + 1])
    }

    //==================================================================================FRAMING
    /// First hex digit is `2`.
    pub fn is_consecutive_frame(&self) -> bool {
        self.0[0] == b'2'
    }

    /// First hex digit is `3` (only ever emitted by the scanner).
    pub fn is_flow_control(&self) -> bool {
        self.0[0] == b'3'
    }

    /// Multi-frame header heuristic: third digit is not `4` and the frame is
    /// not a consecutive frame. Flow-control frames are not excluded; see
    /// [`LogicalFrame::decode`](crate::protocol::transport::iso_tp::logical_frame::LogicalFrame::decode).
    pub fn is_multiframe(&self) -> bool {
        self.0[2] != b'4' && self.0[0] != b'2'
    }

    /// Byte count announced by the frame: `[2..4)` for a first frame, fixed 8
    /// for a consecutive frame, `[0..2)` for a single frame.
    pub fn num_bytes(&self) -> u16 {
        if self.is_multiframe() {
            self.byte_at(2) as u16
        } else if self.is_consecutive_frame() {
            MAX_BYTES as u16
        } else {
            self.byte_at(0) as u16
        }
    }

    /// Rolling 4-bit sequence number of a consecutive frame.
    pub fn sequence_number(&self) -> Option<u8> {
        self.is_consecutive_frame().then(|| nibble(self.0[1]))
    }

    /// Consecutive frames still to come after this first frame:
    /// `(n - 6) / 7`, plus one when the division leaves a remainder.
    ///
    /// Truncating signed arithmetic is kept on purpose, so a header announcing
    /// fewer than six bytes still expects one continuation frame.
    pub fn consecutive_frames_to_receive(&self) -> Option<u16> {
        if !self.is_multiframe() {
            return None;
        }
        let remaining = self.num_bytes() as i32 - FIRST_FRAME_DATA_BYTES as i32;
        let step = CONSECUTIVE_FRAME_DATA_BYTES as i32;
        let mut frames = remaining / step;
        if remaining % step != 0 {
            frames += 1;
        }
        Some(frames.max(0) as u16)
    }

    //==================================================================================EXTRACTION
    /// Full frame text (header included), sized by the announced byte count.
    pub fn frame_hex(&self) -> &str {
        let size = if self.is_multiframe() {
            self.num_bytes() as usize * 2
        } else {
            (self.num_bytes() as usize + 1) * 2
        };
        self.slice(0..size)
    }

    /// Data text with the protocol header stripped:
    /// - first frame: PCI + mode (+ info type when the mode digit is `9`);
    /// - consecutive frame: the PCI byte;
    /// - single frame: length + mode (+ PID when the mode digit is `1`, + PID
    ///   and frame number when it is `2`).
    pub fn data_hex(&self) -> &str {
        self.slice(self.data_window())
    }

    /// Raw data bytes of the frame as carried for ASCII payloads (VIN).
    pub fn data_ascii_range(&self) -> Range<usize> {
        if self.is_multiframe() {
            let start = if self.0[5] == b'9' { 5 } else { 3 };
            start..start + 3
        } else if self.is_consecutive_frame() {
            1..1 + CONSECUTIVE_FRAME_DATA_BYTES
        } else {
            let window = self.data_window();
            window.start / 2..window.end / 2
        }
    }

    fn data_window(&self) -> Range<usize> {
        let n = self.num_bytes() as usize;
        let (start, size) = if self.is_multiframe() {
            (if self.0[5] == b'9' { 8 } else { 6 }, n * 2)
        } else if self.is_consecutive_frame() {
            (2, CONSECUTIVE_FRAME_DATA_BYTES * 2)
        } else {
            match self.0[3] {
                b'1' => (6, n.saturating_sub(2) * 2),
                b'2' => (8, n.saturating_sub(3) * 2),
                _ => (4, n.saturating_sub(1) * 2),
            }
        };
        start..start + size
    }

    fn slice(&self, range: Range<usize>) -> &str {
        let end = range.end.min(HEX_ARRAY);
        let start = range.start.min(end);
        &self.as_str()[start..end]
    }
}

impl core::fmt::Display for HexView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of one uppercase hex digit. Callers only pass validated digits.
#[inline]
fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        b'a'..=b'f' => c - b'a' + 10,
        _ => 0,
    }
}

/// Byte values of a hex string, two characters per byte. A trailing odd
/// character is ignored.
pub fn hex_bytes(text: &str) -> impl Iterator<Item = u8> + '_ {
    text.as_bytes()
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
}
