//! # distcalc-agent
//!
//! The compute service. Each binary operation is raced across a configured
//! number of redundant worker threads and the first published outcome wins.
//! The service can be called in-process through [`LocalComputeClient`] or
//! served over TCP by [`AgentServer`] and reached with [`TcpComputeClient`].

pub mod cancel;
pub mod client;
pub mod local;
pub mod race;
pub mod server;
pub mod service;

// Re-exports
pub use cancel::CancellationToken;
pub use client::TcpComputeClient;
pub use local::LocalComputeClient;
pub use race::{first_of, RaceError};
pub use server::{AgentServer, ServeError};
pub use service::{ComputeConfig, ComputeService};
