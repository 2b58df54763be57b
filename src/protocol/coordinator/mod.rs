//! Interrupt-to-task signalling and menu dispatch: event flags, the received
//! frame mailbox, bus status accumulation, cancellation, and the session
//! context written by the dispatcher.
//!
//! Everything here is interrupt safe (`CriticalSectionRawMutex`) and
//! allocation free, so a [`Scanner`](crate::protocol::session::Scanner) can
//! live in a `static`.
pub mod bus_status;
pub mod cancel;
pub mod dispatcher;
pub mod event_flags;
pub mod mailbox;
