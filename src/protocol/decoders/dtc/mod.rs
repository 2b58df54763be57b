//! Diagnostic Trouble Code decoding (SAE J2012 two-byte form).
use crate::error::DtcDecodeError;
use crate::protocol::transport::iso_tp::hex_view::hex_bytes;

/// Characters in a decoded trouble code.
pub const DTC_CHARS: usize = 5;
/// Filler pattern an ECU sends instead of a trouble code.
pub const DTC_SENTINEL: [u8; 2] = [0xA5, 0xA5];
/// Code meaning "no trouble code stored".
pub const NO_DTC: &str = "P0000";

const CATEGORIES: [u8; 4] = *b"PCBU";
const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

#[derive(Clone, Copy, PartialEq, Eq)]
/// Five-character trouble code such as `P0107`.
pub struct Dtc([u8; DTC_CHARS]);

impl Dtc {
    /// Text form.
    pub fn as_str(&self) -> &str {
        // Built only from ASCII tables.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// System letter: `P`owertrain, `C`hassis, `B`ody or network (`U`).
    pub fn category(&self) -> char {
        self.0[0] as char
    }

    /// `false` for `P0000`.
    pub fn is_valid(&self) -> bool {
        valid_dtc(self.as_str())
    }

    /// Characters in display order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().map(|&c| c as char)
    }
}

impl core::fmt::Debug for Dtc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Dtc({})", self.as_str())
    }
}

impl core::fmt::Display for Dtc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Dtc {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

/// Decode two raw bytes.
///
/// The two high bits of the first nibble select the category, its two low
/// bits give the first digit, the remaining three nibbles follow unchanged.
pub fn decode_dtc(raw: &[u8; 2]) -> Result<Dtc, DtcDecodeError> {
    if *raw == DTC_SENTINEL {
        return Err(DtcDecodeError::Sentinel);
    }
    let first = raw[0] >> 4;
    Ok(Dtc([
        CATEGORIES[(first >> 2) as usize],
        b'0' + (first & 0x03),
        DIGITS[(raw[0] & 0x0F) as usize],
        DIGITS[(raw[1] >> 4) as usize],
        DIGITS[(raw[1] & 0x0F) as usize],
    ]))
}

/// Decode four hex characters as carried in a response (`"0107"`).
pub fn decode_dtc_hex(text: &str) -> Result<Dtc, DtcDecodeError> {
    if text.len() != 4 || !text.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(DtcDecodeError::InvalidInput);
    }
    if text.eq_ignore_ascii_case("A5A5") {
        return Err(DtcDecodeError::Sentinel);
    }
    let mut raw = [0u8; 2];
    for (slot, byte) in raw.iter_mut().zip(hex_bytes(text)) {
        *slot = byte;
    }
    decode_dtc(&raw)
}

/// `false` only for the "no code" value `P0000`.
pub fn valid_dtc(code: &str) -> bool {
    code != NO_DTC
}
