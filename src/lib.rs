//! `obd-scanner` library: the protocol engine of a handheld OBD-II scanner
//! running in a `no_std` environment. The crate exposes the CAN transport
//! (identifiers, raw frames, the ISO-TP-like frame codec), the pure decoders
//! (trouble codes, supported-PID bitmaps, live sensor values), the task
//! coordination primitives, and the diagnostic service sessions that tie them
//! to a display.
#![no_std]
//==================================================================================
/// Codec, decoder, and service errors.
pub mod error;
/// OBD-II protocol implementation: CAN transport, decoders, coordination,
/// service sessions, and the display contract.
pub mod protocol;
//==================================================================================
