//! The compute service.
//!
//! Every call races the configured number of redundant workers. Each worker
//! sleeps for the operator's configured time, then applies the operator.
//! A fault is published instead of a result, never alongside one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use distcalc_core::constants::MAX_WORKERS;
use distcalc_core::{
    apply, CalcError, ComputeRequest, ComputeResponse, ConfigError, OperationTimes, Operator,
};

use crate::race::{first_of, RaceError};

/// Validated compute service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeConfig {
    workers: usize,
    times: OperationTimes,
    deadline: Option<Duration>,
}

impl ComputeConfig {
    /// Create a configuration with `workers` redundant workers per call.
    ///
    /// # Errors
    ///
    /// `workers` must be in `1..=MAX_WORKERS`.
    pub fn new(workers: usize, times: OperationTimes) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if workers > MAX_WORKERS {
            return Err(ConfigError::TooManyWorkers(workers, MAX_WORKERS));
        }
        Ok(Self {
            workers,
            times,
            deadline: None,
        })
    }

    /// Give up on a call if no worker publishes within `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn times(&self) -> &OperationTimes {
        &self.times
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

/// Computes single binary operations with simulated latency.
#[derive(Debug)]
pub struct ComputeService {
    config: ComputeConfig,
    calls: AtomicU64,
}

impl ComputeService {
    #[must_use]
    pub fn new(config: ComputeConfig) -> Self {
        Self {
            config,
            calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    /// Number of calls served so far.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Compute `left <symbol> right`.
    ///
    /// An unknown symbol is rejected before any worker is started.
    ///
    /// # Errors
    ///
    /// `CalcError::Compute` for division by zero or an unknown operator;
    /// `CalcError::Transport` if the race produced no outcome.
    pub fn compute(&self, left: f32, right: f32, symbol: char) -> Result<f32, CalcError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let op = Operator::try_from(symbol).map_err(CalcError::Compute)?;
        let delay = self.config.times.get(op);
        let started = Instant::now();

        debug!(
            operator = %op,
            left,
            right,
            workers = self.config.workers,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "racing workers"
        );

        let outcome = first_of(self.config.workers, self.config.deadline, move |_, done| {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            if done.is_cancelled() {
                return None;
            }
            Some(apply(op, left, right))
        });

        match outcome {
            Ok(Ok(value)) => {
                debug!(operator = %op, result = value, elapsed = ?started.elapsed(), "computed");
                Ok(value)
            }
            Ok(Err(kind)) => {
                debug!(operator = %op, fault = %kind, "computation fault");
                Err(CalcError::Compute(kind))
            }
            Err(err) => {
                warn!(operator = %op, error = %err, "race produced no outcome");
                Err(race_failure(&err))
            }
        }
    }

    /// Serve one wire request.
    #[must_use]
    pub fn handle(&self, request: &ComputeRequest) -> ComputeResponse {
        let symbol = match request.operator_symbol() {
            Ok(symbol) => symbol,
            Err(kind) => return ComputeResponse::from(Err(kind)),
        };
        match self.compute(request.left, request.right, symbol) {
            Ok(result) => ComputeResponse::Result { result },
            Err(CalcError::Compute(kind)) => ComputeResponse::from(Err(kind)),
            Err(other) => ComputeResponse::Error {
                error: other.to_string(),
            },
        }
    }
}

fn race_failure(err: &RaceError) -> CalcError {
    match err {
        RaceError::NoWorkers => CalcError::Config(err.to_string()),
        RaceError::Abandoned(_) | RaceError::TimedOut(_) | RaceError::Spawn(_) => {
            CalcError::Transport(err.to_string())
        }
    }
}
