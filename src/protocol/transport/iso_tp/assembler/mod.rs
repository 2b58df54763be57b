//! Multi-frame reassembly: gathers the data bytes of a first frame and its
//! consecutive frames into one logical message.
use crate::error::CodecError;
use crate::protocol::transport::can_frame::MAX_BYTES;
use crate::protocol::transport::iso_tp::logical_frame::LogicalFrame;
use crate::protocol::transport::iso_tp::{
    CONSECUTIVE_FRAME_DATA_BYTES, FIRST_FRAME_DATA_BYTES, MAX_ANNOUNCED_BYTES,
};

//==================================================================================Constants

/// Continuation frames following the largest announced byte count.
pub const MAX_CONSECUTIVE_FRAMES: usize =
    (MAX_ANNOUNCED_BYTES - FIRST_FRAME_DATA_BYTES).div_ceil(CONSECUTIVE_FRAME_DATA_BYTES);

/// Capacity of the reassembly buffer, in data bytes: a whole first frame plus
/// every continuation frame of the largest message.
pub const REASSEMBLY_CAPACITY: usize =
    MAX_BYTES + MAX_CONSECUTIVE_FRAMES * CONSECUTIVE_FRAME_DATA_BYTES;

//==================================================================================Enums and Structs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// Frame not part of the running exchange (no exchange started, already
    /// complete, or not a continuation frame).
    Ignored,
    /// Frame integrated; continuation frames are still missing.
    FragmentConsumed,
    /// Every announced continuation frame was received.
    MessageComplete,
}

/// Possible states of the buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum AssemblyState {
    Idle,
    InProgress,
    Complete,
}

/// Fixed buffer owned by the session routine running one exchange.
#[derive(Debug, Clone)]
pub struct ReassemblyBuffer {
    state: AssemblyState,
    buffer: [u8; REASSEMBLY_CAPACITY],
    len: usize,
    expected_frames: u16,
    frames_received: u16,
}

impl Default for ReassemblyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReassemblyBuffer {
    /// Empty, idle buffer.
    pub const fn new() -> Self {
        Self {
            state: AssemblyState::Idle,
            buffer: [0; REASSEMBLY_CAPACITY],
            len: 0,
            expected_frames: 0,
            frames_received: 0,
        }
    }

    /// Drop any collected data.
    pub fn reset(&mut self) {
        self.state = AssemblyState::Idle;
        self.len = 0;
        self.expected_frames = 0;
        self.frames_received = 0;
    }

    //==================================================================================Process Functions
    /// Start an exchange from its first response frame.
    ///
    /// A first frame arms the buffer for its announced continuation frames; a
    /// single frame completes it at once.
    pub fn start(&mut self, frame: &LogicalFrame<'_>) -> Result<ProcessResult, CodecError> {
        let expected_frames = match *frame {
            LogicalFrame::First {
                consecutive_frames, ..
            } => consecutive_frames,
            LogicalFrame::Single { .. } => 0,
            _ => return Err(CodecError::NotFirstFrame),
        };
        self.reset();
        self.expected_frames = expected_frames;
        self.append(frame)?;
        if expected_frames == 0 {
            self.state = AssemblyState::Complete;
            Ok(ProcessResult::MessageComplete)
        } else {
            self.state = AssemblyState::InProgress;
            Ok(ProcessResult::FragmentConsumed)
        }
    }

    /// Feed a continuation frame.
    ///
    /// Frames are appended in arrival order; the sequence number is not
    /// checked.
    pub fn push(&mut self, frame: &LogicalFrame<'_>) -> Result<ProcessResult, CodecError> {
        if !matches!(frame, LogicalFrame::Consecutive { .. })
            || self.state != AssemblyState::InProgress
        {
            return Ok(ProcessResult::Ignored);
        }
        self.append(frame)?;
        self.frames_received += 1;

        if self.frames_received >= self.expected_frames {
            self.state = AssemblyState::Complete;
            Ok(ProcessResult::MessageComplete)
        } else {
            Ok(ProcessResult::FragmentConsumed)
        }
    }

    fn append(&mut self, frame: &LogicalFrame<'_>) -> Result<(), CodecError> {
        for byte in frame.payload_bytes() {
            let slot = self
                .buffer
                .get_mut(self.len)
                .ok_or(CodecError::BufferOverflow)?;
            *slot = byte;
            self.len += 1;
        }
        Ok(())
    }

    //==================================================================================Accessors
    /// Data bytes collected so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// `true` once every announced continuation frame has arrived.
    pub fn is_complete(&self) -> bool {
        self.state == AssemblyState::Complete
    }

    /// Continuation frames accepted so far.
    pub fn frames_received(&self) -> u16 {
        self.frames_received
    }

    /// Continuation frames announced by the first frame.
    pub fn expected_frames(&self) -> u16 {
        self.expected_frames
    }
}
