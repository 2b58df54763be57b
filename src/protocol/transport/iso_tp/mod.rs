//! ISO-TP-like segmentation used by OBD-II on CAN: raw frame <-> hex view,
//! frame classification (single / first / consecutive / flow control),
//! request construction, and multi-frame reassembly.
//!
//! The classification rules work on the hexadecimal text of the frame, as the
//! scanner's ECUs are known to answer in that shape:
//! - first hex digit `2` → consecutive frame;
//! - otherwise third hex digit other than `4` → first frame of a multi-frame
//!   response;
//! - anything else → single frame.
//!
//! [`LogicalFrame`](logical_frame::LogicalFrame) adds one case on top: a first
//! hex digit `3` is a flow-control frame, although
//! [`HexView::is_multiframe`](hex_view::HexView::is_multiframe) still reports
//! it as multi-frame. Only the scanner emits flow control, so no response
//! frame takes that path.
//!
//! The first-frame test is a heuristic (a positive OBD response is `4x`, so a
//! single frame normally shows `4` there), not a length-prefix check.

/// Data bytes carried by a first frame after its two PCI bytes.
pub const FIRST_FRAME_DATA_BYTES: usize = 6;
/// Data bytes carried by a consecutive frame after its PCI byte.
pub const CONSECUTIVE_FRAME_DATA_BYTES: usize = 7;
/// Largest byte count a first frame can announce (one length byte).
pub const MAX_ANNOUNCED_BYTES: usize = 0xFF;

pub mod assembler;
pub mod builder;
pub mod hex_view;
pub mod logical_frame;
