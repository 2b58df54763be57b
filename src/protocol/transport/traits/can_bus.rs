//! Minimal abstraction over the CAN controller driver. Allows the scanner to
//! plug into various implementations (embedded HAL, desktop driver, test
//! double, etc.).
//!
//! Reception is interrupt driven: the driver's interrupt handler forwards
//! every completed reception, completed transmission, and status change to
//! [`Scanner::on_bus_interrupt`](crate::protocol::session::Scanner::on_bus_interrupt)
//! as a [`BusEvent`].
use crate::protocol::coordinator::bus_status::BusErrorFlags;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use futures_util::Future;

/// Contract to configure the receive object and queue frames for transmission.
pub trait CanBus {
    type Error: core::fmt::Debug;
    /// Load the receive message object with an identifier filter.
    fn configure_rx(&mut self, filter: CanId, mask: u16) -> Result<(), Self::Error>;
    /// Load the transmit message object. Resolves once the frame is queued;
    /// completion is reported later through [`BusEvent::Transmitted`].
    fn send<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Cause of a CAN controller interrupt.
pub enum BusEvent {
    /// The receive object holds a new frame.
    Received(CanFrame),
    /// The transmit object finished sending.
    Transmitted,
    /// Controller status interrupt with its raised error flags.
    BusError(BusErrorFlags),
}
