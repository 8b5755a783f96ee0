//! Constants for defaults and process exit codes.

/// Default address the compute agent listens on.
pub const DEFAULT_AGENT_ADDR: &str = "127.0.0.1:5050";

/// Default number of redundant compute workers per call.
pub const DEFAULT_WORKERS: usize = 1;

/// Upper bound on redundant compute workers per call.
///
/// Losing workers are never preempted, so every call costs N threads.
pub const MAX_WORKERS: usize = 64;

/// Owner used when the caller does not identify itself.
pub const DEFAULT_OWNER: &str = "local";

/// Default timeout (in milliseconds) for a remote compute call.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;

/// Default time (in milliseconds) the agent waits for the next request line
/// before closing a connection.
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 60_000;

/// Exit codes for the CLI application.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// Malformed input: parse, evaluation or compute fault.
    pub const ERROR_INPUT: i32 = 2;
    /// The compute service could not be reached.
    pub const ERROR_TRANSPORT: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
}
