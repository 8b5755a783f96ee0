//! CLI output formatting.

use std::time::Duration;

use console::style;

use distcalc_core::{Expression, Operation, Status};

/// Check if color output is disabled via `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

/// Format a computed value.
///
/// Results pass through `f32` on the wire, so they are printed at `f32`
/// precision: `0.1+0.2` shows as `0.3`, not `0.30000001192092896`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_value(value: f64) -> String {
    let narrow = value as f32;
    if narrow == 0.0 {
        // Drop the sign of negative zero.
        return "0".to_string();
    }
    narrow.to_string()
}

/// Format a duration for display.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1_000 {
        format!("{micros}µs")
    } else if micros < 1_000_000 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else if d.as_secs() < 60 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{}m{}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}

/// Format a status label, colored unless `color` is false.
#[must_use]
pub fn format_status(status: Status, color: bool) -> String {
    paint(status, status.as_str().to_string(), color)
}

fn paint(status: Status, text: String, color: bool) -> String {
    if !color {
        return text;
    }
    match status {
        Status::Pending => style(text).yellow().to_string(),
        Status::Completed => style(text).green().to_string(),
        Status::Failed => style(text).red().bold().to_string(),
    }
}

/// One line of an expression listing: id, status, source and outcome.
#[must_use]
pub fn format_expression_row(expression: &Expression, color: bool) -> String {
    let outcome = match (&expression.result, &expression.error) {
        (Some(value), _) => format!("= {}", format_value(*value)),
        (None, Some(error)) => format!("({error})"),
        (None, None) => String::new(),
    };
    format!(
        "{}  {}  {}  {}",
        expression.id,
        paint(expression.status, format!("{:<9}", expression.status.as_str()), color),
        expression.source,
        outcome
    )
    .trim_end()
    .to_string()
}

/// One traced operation, e.g. `2 * 3 = 6`.
#[must_use]
pub fn format_operation(operation: &Operation) -> String {
    let outcome = match (&operation.result, &operation.error) {
        (Some(value), _) => format!("= {}", format_value(*value)),
        (None, Some(error)) => format!("! {error}"),
        (None, None) => "...".to_string(),
    };
    format!(
        "{} {} {} {}",
        format_value(operation.left),
        operation.operator,
        format_value(operation.right),
        outcome
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use distcalc_core::Outcome;

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(8.0), "8");
        assert_eq!(format_value(-9.0), "-9");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(f64::from(0.1f32 + 0.2f32)), "0.3");
    }

    #[test]
    fn duration_ranges() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_millis(42)), "42.0ms");
        assert_eq!(format_duration(Duration::from_millis(3_250)), "3.25s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
    }

    #[test]
    fn status_without_color() {
        assert_eq!(format_status(Status::Failed, false), "failed");
        assert_eq!(format_status(Status::Completed, false), "completed");
    }

    #[test]
    fn expression_rows() {
        let mut ok = Expression::pending("id1".into(), "alice".into(), "2+2*3");
        ok.finish(Outcome::Completed(8.0));
        assert_eq!(format_expression_row(&ok, false), "id1  completed  2+2*3  = 8");

        let mut bad = Expression::pending("id2".into(), "alice".into(), "4/0");
        bad.finish(Outcome::Failed("division by zero".into()));
        assert_eq!(
            format_expression_row(&bad, false),
            "id2  failed     4/0  (division by zero)"
        );

        let pending = Expression::pending("id3".into(), "alice".into(), "1+1");
        assert_eq!(format_expression_row(&pending, false), "id3  pending    1+1");
    }

    #[test]
    fn operation_lines() {
        let mut op = Operation::new("e".into(), "alice".into(), 2.0, 3.0, '*');
        assert_eq!(format_operation(&op), "2 * 3 ...");
        op.result = Some(6.0);
        assert_eq!(format_operation(&op), "2 * 3 = 6");
        op.result = None;
        op.error = Some("division by zero".into());
        assert_eq!(format_operation(&op), "2 * 3 ! division by zero");
    }
}
