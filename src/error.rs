//! Error definitions shared across library modules.
//! Expected end states of a diagnostic service (no stored codes, mode not
//! implemented, reception timeout…) are not errors: they are reported as
//! [`ServiceOutcome`](crate::protocol::session::ServiceOutcome) values.
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised while building a CAN identifier or frame.
pub enum CanIdBuildError {
    /// Identifier does not fit in 11 bits.
    #[error("Standard identifier out of range: {id:#X}")]
    OutOfRange { id: u32 },
    /// Extended (29-bit) identifiers are not used by this scanner.
    #[error("Extended identifiers are not supported")]
    ExtendedId,
    /// Remote frames carry no payload and are not part of the protocol.
    #[error("Remote frames are not supported")]
    RemoteFrame,
    /// Payload longer than a classic CAN frame.
    #[error("Payload too long: {len} bytes")]
    PayloadTooLong { len: usize },
}

//================================================================================CODEC_ERROR

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures of the frame codec (raw bytes <-> hex view <-> logical frame).
pub enum CodecError {
    /// A character of the hex view is not an uppercase hexadecimal digit.
    #[error("Invalid hex digit at position {position}")]
    InvalidHexDigit { position: usize },
    /// The frame is not a multi-frame header where one was required.
    #[error("Frame is not a first frame")]
    NotFirstFrame,
    /// The payload is shorter than the field being read.
    #[error("Payload too short -> asked: {asked}, available: {available}")]
    PayloadTooShort { asked: usize, available: usize },
    /// Reassembly buffer capacity exceeded.
    #[error("Reassembly buffer overflow")]
    BufferOverflow,
}

//================================================================================DECODER_ERRORS

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Reasons a trouble code cannot be decoded.
pub enum DtcDecodeError {
    /// The ECU sent the `A5A5` filler instead of a code.
    #[error("Sentinel filler pattern, not a trouble code")]
    Sentinel,
    /// Input is not four hexadecimal characters.
    #[error("Invalid trouble code input")]
    InvalidInput,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures while turning a live-data response into a physical value.
pub enum LiveDataError {
    /// The PID is not part of the decodable catalog.
    #[error("Unknown PID {pid:#04X}")]
    UnknownPid { pid: u8 },
    /// The response carries no data byte.
    #[error("Missing data byte")]
    MissingData,
}

//==================================================================================SERVICE_ERROR

#[derive(Error, Debug)]
/// Unrecoverable failures of a service run. The run is abandoned and the
/// scanner returns to the menu.
pub enum ServiceError<E: core::fmt::Debug> {
    /// Transport adapter refused to queue a frame.
    #[error("CAN bus send error: {0:?}")]
    Send(E),
    /// Transport adapter refused the receive filter.
    #[error("CAN bus configuration error: {0:?}")]
    Configure(E),
    /// A received frame could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A trouble code could not be decoded.
    #[error(transparent)]
    Dtc(#[from] DtcDecodeError),
    /// Frame construction failed.
    #[error(transparent)]
    Build(#[from] CanIdBuildError),
}
