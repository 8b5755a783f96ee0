//! Error handling and exit codes.

use distcalc_agent::ServeError;
use distcalc_core::constants::exit_codes;
use distcalc_core::{CalcError, ConfigError};

/// Exit code for an evaluation error.
pub fn handle_error(err: &CalcError) -> i32 {
    match err {
        CalcError::Parse(_) | CalcError::Evaluation(_) | CalcError::Compute(_) => {
            exit_codes::ERROR_INPUT
        }
        CalcError::Transport(_) => exit_codes::ERROR_TRANSPORT,
        CalcError::Config(_) => exit_codes::ERROR_CONFIG,
        CalcError::Store(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for an error that aborted the run.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(calc) = err.downcast_ref::<CalcError>() {
        return handle_error(calc);
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return exit_codes::ERROR_CONFIG;
    }
    if let Some(ServeError::Bind(_)) = err.downcast_ref::<ServeError>() {
        return exit_codes::ERROR_CONFIG;
    }
    exit_codes::ERROR_GENERIC
}
