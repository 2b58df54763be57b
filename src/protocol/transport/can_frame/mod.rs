//! In-memory representation of a classic CAN frame as exchanged with the ECU.
use crate::error::CanIdBuildError;
use crate::protocol::transport::can_id::CanId;

/// Classic CAN payload size.
pub const MAX_BYTES: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw frame as read from / written to the CAN controller message objects.
pub struct CanFrame {
    /// 11-bit identifier.
    pub id: CanId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; MAX_BYTES],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Frame carrying the full eight-byte buffer.
    pub const fn new(id: CanId, data: [u8; MAX_BYTES]) -> Self {
        Self {
            id,
            data,
            len: MAX_BYTES,
        }
    }

    /// Valid bytes only.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len.min(MAX_BYTES)]
    }

    /// Converts a driver frame. Extended and remote frames are refused; the
    /// unused tail of the buffer is zeroed.
    pub fn from_embedded<F: embedded_can::Frame>(frame: &F) -> Result<Self, CanIdBuildError> {
        if frame.is_remote_frame() {
            return Err(CanIdBuildError::RemoteFrame);
        }
        let id = CanId::try_from(frame.id())?;
        let payload = frame.data();
        if payload.len() > MAX_BYTES {
            return Err(CanIdBuildError::PayloadTooLong { len: payload.len() });
        }
        let mut data = [0u8; MAX_BYTES];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            data,
            len: payload.len(),
        })
    }

    /// Builds a driver frame carrying the valid bytes of `self`.
    pub fn to_embedded<F: embedded_can::Frame>(&self) -> Option<F> {
        F::new(self.id, self.payload())
    }
}
