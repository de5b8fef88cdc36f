//! Capability proxy: JSON-RPC 2.0 over the stdio of child processes.

pub mod pool;
pub mod session;
