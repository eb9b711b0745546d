//! Transports that own a [`ConsoleRuntime`](super::ConsoleRuntime) and feed it events.

pub mod cli;
pub mod socket;
