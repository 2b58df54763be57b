//! Typed view of a received frame, produced once by the codec so session code
//! never re-parses the hex text.
use crate::protocol::transport::iso_tp::hex_view::{hex_bytes, HexView};

/// Logical frame kinds with their announced byte count and data text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalFrame<'a> {
    /// Whole response in one frame.
    Single { byte_count: u16, payload: &'a str },
    /// Header of a multi-frame response.
    First {
        byte_count: u16,
        consecutive_frames: u16,
        payload: &'a str,
    },
    /// Continuation of a multi-frame response.
    Consecutive { sequence: u8, payload: &'a str },
    /// Receiver-side "go ahead".
    FlowControl { payload: &'a str },
}

impl<'a> LogicalFrame<'a> {
    /// Classify `hex` and borrow its data text.
    ///
    /// A first hex digit `3` decodes as [`FlowControl`](Self::FlowControl)
    /// even though [`HexView::is_multiframe`] is `true` for it.
    pub fn decode(hex: &'a HexView) -> Self {
        if hex.is_consecutive_frame() {
            LogicalFrame::Consecutive {
                sequence: hex.sequence_number().unwrap_or(0),
                payload: hex.data_hex(),
            }
        } else if hex.is_flow_control() {
            LogicalFrame::FlowControl {
                payload: &hex.as_str()[2..],
            }
        } else if hex.is_multiframe() {
            LogicalFrame::First {
                byte_count: hex.num_bytes(),
                consecutive_frames: hex.consecutive_frames_to_receive().unwrap_or(0),
                payload: hex.data_hex(),
            }
        } else {
            LogicalFrame::Single {
                byte_count: hex.num_bytes(),
                payload: hex.data_hex(),
            }
        }
    }

    /// Data text with the protocol header stripped.
    pub fn payload(&self) -> &'a str {
        match *self {
            LogicalFrame::Single { payload, .. }
            | LogicalFrame::First { payload, .. }
            | LogicalFrame::Consecutive { payload, .. }
            | LogicalFrame::FlowControl { payload } => payload,
        }
    }

    /// Data bytes (two hex characters each).
    pub fn payload_bytes(&self) -> impl Iterator<Item = u8> + 'a {
        hex_bytes(self.payload())
    }

    /// Byte count carried by the header (fixed 8 for consecutive frames).
    pub fn byte_count(&self) -> u16 {
        match *self {
            LogicalFrame::Single { byte_count, .. } | LogicalFrame::First { byte_count, .. } => {
                byte_count
            }
            LogicalFrame::Consecutive { .. } | LogicalFrame::FlowControl { .. } => 8,
        }
    }

    /// `true` for the header of a multi-frame response.
    pub fn is_first(&self) -> bool {
        matches!(self, LogicalFrame::First { .. })
    }
}
