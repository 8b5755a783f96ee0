//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use distcalc_agent::ComputeConfig;
use distcalc_core::constants::{DEFAULT_AGENT_ADDR, DEFAULT_OWNER, DEFAULT_WORKERS};
use distcalc_core::{ConfigError, OperationTimes, Owner};

/// distcalc: evaluate arithmetic expressions on a redundant compute agent.
#[derive(Parser, Debug)]
#[command(name = "distcalc", version, about)]
pub struct AppConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Snapshot file holding expressions across runs.
    #[arg(long, global = true, env = "DISTCALC_STORE")]
    pub store: Option<PathBuf>,

    /// User the expressions belong to.
    #[arg(long, global = true, env = "DISTCALC_OWNER", default_value = DEFAULT_OWNER)]
    pub owner: String,

    /// Redundant workers raced per operation.
    #[arg(long, global = true, env = "COMPUTING_POWER", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Simulated addition time in milliseconds.
    #[arg(long, global = true, env = "TIME_ADDITION_MS", allow_hyphen_values = true)]
    pub time_addition_ms: Option<i64>,

    /// Simulated subtraction time in milliseconds.
    #[arg(long, global = true, env = "TIME_SUBTRACTION_MS", allow_hyphen_values = true)]
    pub time_subtraction_ms: Option<i64>,

    /// Simulated multiplication time in milliseconds.
    #[arg(long, global = true, env = "TIME_MULTIPLICATIONS_MS", allow_hyphen_values = true)]
    pub time_multiplication_ms: Option<i64>,

    /// Simulated division time in milliseconds.
    #[arg(long, global = true, env = "TIME_DIVISIONS_MS", allow_hyphen_values = true)]
    pub time_division_ms: Option<i64>,

    /// Per-call timeout for a remote agent (e.g., "500ms", "5s", "1m").
    #[arg(long, global = true, default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Give up on a compute call when no worker answers within this time.
    #[arg(long, global = true, env = "DISTCALC_DEADLINE", value_parser = parse_duration)]
    pub deadline: Option<Duration>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only output values).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the compute service over TCP.
    Agent {
        /// Address to listen on.
        #[arg(long, env = "DISTCALC_AGENT_ADDR", default_value = DEFAULT_AGENT_ADDR)]
        listen: String,

        /// Close connections idle for longer than this.
        #[arg(long, default_value = "60s", value_parser = parse_duration)]
        idle_timeout: Duration,
    },

    /// Evaluate one or more expressions.
    Eval {
        /// Infix expressions, e.g. "2+2*3".
        #[arg(required = true)]
        expressions: Vec<String>,

        /// Remote agent address; computes in-process when omitted.
        #[arg(long)]
        agent: Option<String>,

        /// Show postfix form, operation count and duration.
        #[arg(short, long)]
        details: bool,
    },

    /// List stored expressions.
    List,

    /// Show one stored expression with its operations.
    Get {
        /// Expression id.
        id: String,
    },

    /// Delete all stored expressions.
    Clear,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    #[must_use]
    pub fn owner(&self) -> Owner {
        Owner::new(self.owner.as_str())
    }

    /// Operation-time table; every operator must be configured.
    pub fn operation_times(&self) -> Result<OperationTimes, ConfigError> {
        let entries = [
            ('+', self.time_addition_ms),
            ('-', self.time_subtraction_ms),
            ('*', self.time_multiplication_ms),
            ('/', self.time_division_ms),
        ];
        OperationTimes::from_millis(
            entries
                .into_iter()
                .filter_map(|(symbol, millis)| millis.map(|ms| (symbol, ms))),
        )
    }

    /// Configuration for an in-process or served compute service.
    pub fn compute_config(&self) -> Result<ComputeConfig, ConfigError> {
        let config = ComputeConfig::new(self.workers, self.operation_times()?)?;
        Ok(match self.deadline {
            Some(deadline) => config.with_deadline(deadline),
            None => config,
        })
    }
}

/// Parse a duration string like "500ms", "30s", "5m" or "1h".
/// A bare number is seconds.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (digits, millis_per_unit) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000)
    } else {
        (s, 1_000)
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{s}'"))?;
    if value == 0 {
        return Err("duration must be positive".to_string());
    }
    Ok(Duration::from_millis(value.saturating_mul(millis_per_unit)))
}
