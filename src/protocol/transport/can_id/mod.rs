//! 11-bit CAN identifiers used by OBD-II on CAN (ISO 15765-4) and the
//! addressable ECU roles.
use crate::error::CanIdBuildError;
use embedded_can::{Id, StandardId};

/// Functional (broadcast) diagnostic request identifier.
pub const REMOTE_REQUEST_ID: CanId = CanId(0x7DF);
/// Receive mask selecting an exact 11-bit match on the response identifier.
pub const MASK_RESPONSE_ID: u16 = 0x7FF;

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Standard (11-bit) CAN identifier stored inside a `u16`.
pub struct CanId(pub(crate) u16);

impl CanId {
    /// Validates the raw value and wraps it.
    pub const fn new(raw: u16) -> Result<Self, CanIdBuildError> {
        if raw > 0x7FF {
            return Err(CanIdBuildError::OutOfRange { id: raw as u32 });
        }
        Ok(Self(raw))
    }

    /// Raw 11-bit value.
    #[inline]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// `true` when `self` passes a receive filter `filter`/`mask`.
    #[inline]
    pub const fn matches(&self, filter: CanId, mask: u16) -> bool {
        (self.0 & mask) == (filter.0 & mask)
    }
}

impl From<StandardId> for CanId {
    fn from(id: StandardId) -> Self {
        Self(id.as_raw())
    }
}

impl From<CanId> for StandardId {
    fn from(id: CanId) -> Self {
        // `CanId` never holds more than 11 bits.
        StandardId::new(id.0).unwrap_or(StandardId::MAX)
    }
}

impl From<CanId> for Id {
    fn from(id: CanId) -> Self {
        Id::Standard(id.into())
    }
}

impl TryFrom<Id> for CanId {
    type Error = CanIdBuildError;

    fn try_from(id: Id) -> Result<Self, Self::Error> {
        match id {
            Id::Standard(std_id) => Ok(std_id.into()),
            Id::Extended(_) => Err(CanIdBuildError::ExtendedId),
        }
    }
}

//==================================================================================ECU_ROLE
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Addressable control units, each with a fixed physical request/response pair.
pub enum EcuRole {
    /// Engine control module.
    #[default]
    Ecm,
    /// Transmission control module.
    Tcm,
    /// Anti-lock braking system.
    Abs,
}

impl EcuRole {
    /// Roles in ECU-menu order.
    pub const ALL: [EcuRole; 3] = [EcuRole::Ecm, EcuRole::Tcm, EcuRole::Abs];

    /// Role shown at `cursor` in the ECU menu.
    pub fn from_cursor(cursor: u16) -> Option<Self> {
        Self::ALL.get(cursor as usize).copied()
    }

    /// Physical request identifier (flow-control frames are sent here).
    pub const fn request_id(&self) -> CanId {
        match self {
            EcuRole::Ecm => CanId(0x7E0),
            EcuRole::Tcm => CanId(0x7E1),
            EcuRole::Abs => CanId(0x7E2),
        }
    }

    /// Response identifier the receive filter is set to.
    pub const fn response_id(&self) -> CanId {
        match self {
            EcuRole::Ecm => CanId(0x7E8),
            EcuRole::Tcm => CanId(0x7E9),
            EcuRole::Abs => CanId(0x7EA),
        }
    }
}
