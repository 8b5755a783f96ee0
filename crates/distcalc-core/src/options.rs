//! Per-operator simulated latency.

use std::time::Duration;

use crate::error::ConfigError;
use crate::token::Operator;

/// How long a compute worker sleeps before applying each operator.
///
/// Construction fails unless every operator has a non-negative time, so a
/// value of this type is always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimes {
    addition: Duration,
    subtraction: Duration,
    multiplication: Duration,
    division: Duration,
}

impl OperationTimes {
    /// Same time for every operator.
    #[must_use]
    pub fn uniform(time: Duration) -> Self {
        Self {
            addition: time,
            subtraction: time,
            multiplication: time,
            division: time,
        }
    }

    /// Build from `(symbol, milliseconds)` entries.
    ///
    /// # Errors
    ///
    /// Fails on a missing operator, a negative time, or a symbol that is not
    /// an operator. Later duplicates overwrite earlier ones.
    ///
    /// # Example
    /// ```
    /// use distcalc_core::{ConfigError, OperationTimes};
    ///
    /// let times = OperationTimes::from_millis([('+', 10), ('-', 10), ('*', 20), ('/', 20)]);
    /// assert!(times.is_ok());
    ///
    /// let missing = OperationTimes::from_millis([('+', 10), ('-', 10), ('*', 20)]);
    /// assert_eq!(missing, Err(ConfigError::MissingOperationTime('/')));
    /// ```
    pub fn from_millis<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (char, i64)>,
    {
        let mut table: [Option<Duration>; 4] = [None; 4];
        for (symbol, millis) in entries {
            let op = Operator::from_symbol(symbol).ok_or(ConfigError::UnknownOperator(symbol))?;
            let millis = u64::try_from(millis)
                .map_err(|_| ConfigError::NegativeOperationTime(symbol, millis))?;
            table[slot(op)] = Some(Duration::from_millis(millis));
        }

        let lookup = |op: Operator| {
            table[slot(op)].ok_or(ConfigError::MissingOperationTime(op.symbol()))
        };
        Ok(Self {
            addition: lookup(Operator::Add)?,
            subtraction: lookup(Operator::Sub)?,
            multiplication: lookup(Operator::Mul)?,
            division: lookup(Operator::Div)?,
        })
    }

    /// Time configured for `op`.
    #[must_use]
    pub fn get(&self, op: Operator) -> Duration {
        match op {
            Operator::Add => self.addition,
            Operator::Sub => self.subtraction,
            Operator::Mul => self.multiplication,
            Operator::Div => self.division,
        }
    }
}

impl Default for OperationTimes {
    fn default() -> Self {
        Self::uniform(Duration::ZERO)
    }
}

fn slot(op: Operator) -> usize {
    match op {
        Operator::Add => 0,
        Operator::Sub => 1,
        Operator::Mul => 2,
        Operator::Div => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_table() {
        let times =
            OperationTimes::from_millis([('+', 1), ('-', 2), ('*', 3), ('/', 4)]).unwrap();
        assert_eq!(times.get(Operator::Add), Duration::from_millis(1));
        assert_eq!(times.get(Operator::Sub), Duration::from_millis(2));
        assert_eq!(times.get(Operator::Mul), Duration::from_millis(3));
        assert_eq!(times.get(Operator::Div), Duration::from_millis(4));
    }

    #[test]
    fn missing_entry_is_fatal() {
        let err = OperationTimes::from_millis([('+', 1), ('*', 3), ('/', 4)]).unwrap_err();
        assert_eq!(err, ConfigError::MissingOperationTime('-'));
    }

    #[test]
    fn negative_entry_is_fatal() {
        let err =
            OperationTimes::from_millis([('+', 1), ('-', -5), ('*', 3), ('/', 4)]).unwrap_err();
        assert_eq!(err, ConfigError::NegativeOperationTime('-', -5));
    }

    #[test]
    fn unknown_operator_is_fatal() {
        let err = OperationTimes::from_millis([('^', 1)]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownOperator('^'));
    }

    #[test]
    fn zero_times_allowed() {
        let times =
            OperationTimes::from_millis([('+', 0), ('-', 0), ('*', 0), ('/', 0)]).unwrap();
        assert_eq!(times, OperationTimes::default());
    }

    #[test]
    fn uniform_applies_to_all() {
        let times = OperationTimes::uniform(Duration::from_millis(7));
        for op in Operator::ALL {
            assert_eq!(times.get(op), Duration::from_millis(7));
        }
    }
}
