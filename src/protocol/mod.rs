//! High-level components of the scanner: CAN transport and frame codec,
//! pure decoders, task coordination, diagnostic sessions, and the display
//! contract.
pub mod coordinator;
pub mod decoders;
pub mod session;
pub mod transport;
pub mod ui;
