//! CLI result presenter.

use distcalc_core::{Expression, Operation, Status};
use distcalc_orchestration::interfaces::{EvaluationReport, ResultPresenter};

use crate::output::{
    format_duration, format_expression_row, format_operation, format_status, format_value,
    is_color_disabled,
};

/// CLI result presenter.
///
/// In quiet mode only bare values reach stdout. Errors always go to stderr.
pub struct CLIResultPresenter {
    verbose: bool,
    quiet: bool,
    color: bool,
}

impl CLIResultPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            color: !is_color_disabled(),
        }
    }

    /// Force colored output on or off.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Render an evaluation report as the lines that would be printed.
    #[must_use]
    pub fn render_evaluation(&self, report: &EvaluationReport, details: bool) -> Vec<String> {
        if self.quiet {
            return match &report.outcome {
                Ok(value) => vec![format_value(*value)],
                Err(_) => Vec::new(),
            };
        }

        let mut lines = vec![
            format!("Expression: {}", report.source),
            format!("ID: {}", report.expression_id),
        ];
        if details || self.verbose {
            if let Some(postfix) = &report.postfix {
                lines.push(format!("Postfix: {postfix}"));
            }
            lines.push(format!("Operations: {}", report.operations));
            lines.push(format!("Duration: {}", format_duration(report.duration)));
        }
        match &report.outcome {
            Ok(value) => lines.push(format!("Result: {}", format_value(*value))),
            Err(_) => lines.push(format!(
                "Status: {}",
                format_status(Status::Failed, self.color)
            )),
        }
        lines
    }

    /// Render a stored expression and its traced operations.
    #[must_use]
    pub fn render_expression(&self, expression: &Expression, operations: &[Operation]) -> Vec<String> {
        if self.quiet {
            return expression.result.map(format_value).into_iter().collect();
        }

        let mut lines = vec![
            format!("ID: {}", expression.id),
            format!("Owner: {}", expression.owner),
            format!("Expression: {}", expression.source),
            format!("Status: {}", format_status(expression.status, self.color)),
        ];
        if let Some(value) = expression.result {
            lines.push(format!("Result: {}", format_value(value)));
        }
        if let Some(error) = &expression.error {
            lines.push(format!("Error: {error}"));
        }
        if !operations.is_empty() {
            lines.push("Operations:".to_string());
            lines.extend(operations.iter().map(|op| format!("  {}", format_operation(op))));
        }
        lines
    }

    /// Render an expression listing.
    #[must_use]
    pub fn render_expressions(&self, expressions: &[Expression]) -> Vec<String> {
        if self.quiet {
            return expressions.iter().map(|e| e.id.to_string()).collect();
        }
        if expressions.is_empty() {
            return vec!["No expressions.".to_string()];
        }
        expressions
            .iter()
            .map(|e| format_expression_row(e, self.color))
            .collect()
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_evaluation(&self, report: &EvaluationReport, details: bool) {
        for line in self.render_evaluation(report, details) {
            println!("{line}");
        }
        if let Err(err) = &report.outcome {
            self.present_error(&err.to_string());
        }
    }

    fn present_expression(&self, expression: &Expression, operations: &[Operation]) {
        for line in self.render_expression(expression, operations) {
            println!("{line}");
        }
    }

    fn present_expressions(&self, expressions: &[Expression]) {
        for line in self.render_expressions(expressions) {
            println!("{line}");
        }
    }

    fn present_cleared(&self, removed: usize) {
        if self.quiet {
            println!("{removed}");
        } else {
            println!("Removed {removed} expression(s).");
        }
    }

    fn present_error(&self, error: &str) {
        if self.color {
            eprintln!("{} {error}", console::style("Error:").red().bold());
        } else {
            eprintln!("Error: {error}");
        }
    }
}
