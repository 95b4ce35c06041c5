// Network layer module
// Async TCP serving for the Tacview real-time telemetry protocol

pub mod client;
pub mod connection;
pub mod listener;

pub use client::{AcmiSession, CloseReason, SessionState};
pub use connection::Connection;
pub use listener::TacviewServer;
