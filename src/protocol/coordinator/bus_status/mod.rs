//! CAN controller status flags as raised by the status interrupt, and the
//! texts shown when they are drained.
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    /// Controller status register layout plus the message-lost bit of the
    /// receive object.
    pub struct BusErrorFlags: u32 {
        /// Last error code field (see [`LastErrorCode`]).
        const LEC_MASK = 0x07;
        /// A frame was sent since the last read.
        const TX_OK = 0x08;
        /// A frame was received since the last read.
        const RX_OK = 0x10;
        /// Error passive level reached.
        const PASSIVE = 0x20;
        /// Warning level reached.
        const WARNING = 0x40;
        /// Controller is bus-off.
        const BUS_OFF = 0x80;
        /// A received frame was overwritten before being read.
        const DATA_LOST = 0x100;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BusErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "BusErrorFlags({=u32:#x})", self.bits())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Value of the last-error-code field.
pub enum LastErrorCode {
    None,
    Stuff,
    Form,
    Ack,
    /// Recessive bit could not be sent.
    Bit1,
    /// Dominant bit could not be sent.
    Bit0,
    Crc,
    /// No event since the field was last read.
    Unused,
}

impl LastErrorCode {
    /// `true` for an actual protocol error.
    pub const fn is_error(self) -> bool {
        !matches!(self, LastErrorCode::None | LastErrorCode::Unused)
    }

    pub const fn message(self) -> Option<&'static str> {
        match self {
            LastErrorCode::Stuff => Some("\nA bit stuffing error has occurred\n"),
            LastErrorCode::Form => Some("\nA formatting error has occurred\n"),
            LastErrorCode::Ack => Some("\nAn acknowledge error has occurred\n"),
            LastErrorCode::Bit1 => {
                Some("\nThe bus remained a bit level of 1 for longer than is allowed\n")
            }
            LastErrorCode::Bit0 => {
                Some("\nThe bus remained a bit level of 0 for longer than is allowed\n")
            }
            LastErrorCode::Crc => Some("\nA CRC error has occurred\n"),
            LastErrorCode::None | LastErrorCode::Unused => None,
        }
    }
}

impl BusErrorFlags {
    /// Conditions that are faults rather than plain status.
    pub const FAULTS: Self = Self::PASSIVE
        .union(Self::WARNING)
        .union(Self::BUS_OFF)
        .union(Self::DATA_LOST);

    /// Decoded last-error-code field.
    pub fn last_error_code(&self) -> LastErrorCode {
        match self.bits() & Self::LEC_MASK.bits() {
            0 => LastErrorCode::None,
            1 => LastErrorCode::Stuff,
            2 => LastErrorCode::Form,
            3 => LastErrorCode::Ack,
            4 => LastErrorCode::Bit1,
            5 => LastErrorCode::Bit0,
            6 => LastErrorCode::Crc,
            _ => LastErrorCode::Unused,
        }
    }

    /// `true` when a fault or a protocol error is raised. TX_OK / RX_OK alone
    /// are plain status.
    pub fn is_error(&self) -> bool {
        self.intersects(Self::FAULTS) || self.last_error_code().is_error()
    }

    /// Texts for every raised condition, most severe first.
    pub fn messages(&self) -> impl Iterator<Item = &'static str> {
        let flags = *self;
        let fixed = [
            (Self::BUS_OFF, "\nCAN controller has entered a Bus Off state\n"),
            (
                Self::WARNING,
                "\nCAN controller error level has reached warning level\n",
            ),
            (
                Self::PASSIVE,
                "\nCAN controller error level has reached error passive level\n",
            ),
            (
                Self::RX_OK,
                "\nA message was received successfully since the last read of this status\n",
            ),
            (
                Self::TX_OK,
                "\nA message was transmitted successfully since the last read of this status\n",
            ),
        ];
        fixed
            .into_iter()
            .filter(move |(flag, _)| flags.contains(*flag))
            .map(|(_, text)| text)
            .chain(flags.last_error_code().message())
            .chain(
                flags
                    .contains(Self::DATA_LOST)
                    .then_some("\nCAN message loss detected\n"),
            )
    }
}
