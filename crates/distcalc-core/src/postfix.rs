//! Infix to postfix conversion (shunting-yard).
//!
//! The accepted alphabet is ASCII digits, `+ - * /` and parentheses.
//! Whitespace is rejected like any other unexpected character.

use std::fmt;

use tracing::trace;

use crate::error::{CalcError, FaultKind};
use crate::token::{Operator, Token};

/// Entry on the operator stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    OpenParen,
    Operator(Operator),
}

/// An ordered postfix token sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Postfix {
    tokens: Vec<Token>,
}

impl Postfix {
    /// Tokens in evaluation order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of operator tokens, i.e. compute calls a full evaluation makes.
    #[must_use]
    pub fn operator_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Operator(_)))
            .count()
    }
}

impl<'a> IntoIterator for &'a Postfix {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Convert an infix expression to postfix order.
///
/// Multi-digit literals are buffered and emitted as one token. Operators of
/// equal precedence associate to the left.
///
/// # Errors
///
/// - `CalcError::Parse(FaultKind::UnexpectedSymbol)` for a character outside
///   the alphabet.
/// - `CalcError::Parse(FaultKind::BadExpression)` for unbalanced parentheses.
///
/// # Example
/// ```
/// use distcalc_core::to_postfix;
///
/// let postfix = to_postfix("2+2*3").unwrap();
/// assert_eq!(postfix.to_string(), "2 2 3 * +");
/// ```
pub fn to_postfix(expr: &str) -> Result<Postfix, CalcError> {
    let mut output = Vec::with_capacity(expr.len());
    let mut stack: Vec<Pending> = Vec::new();
    let mut digits = String::new();

    for ch in expr.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        flush_number(&mut digits, &mut output)?;

        match ch {
            '(' => stack.push(Pending::OpenParen),
            ')' => loop {
                match stack.pop() {
                    Some(Pending::Operator(op)) => output.push(Token::Operator(op)),
                    Some(Pending::OpenParen) => break,
                    None => return Err(CalcError::Parse(FaultKind::BadExpression)),
                }
            },
            _ => {
                let incoming = Operator::try_from(ch).map_err(CalcError::Parse)?;
                while let Some(&Pending::Operator(top)) = stack.last() {
                    if top.precedence() < incoming.precedence() {
                        break;
                    }
                    output.push(Token::Operator(top));
                    stack.pop();
                }
                stack.push(Pending::Operator(incoming));
            }
        }
    }

    flush_number(&mut digits, &mut output)?;

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Operator(op) => output.push(Token::Operator(op)),
            Pending::OpenParen => return Err(CalcError::Parse(FaultKind::BadExpression)),
        }
    }

    let postfix = Postfix { tokens: output };
    trace!(%postfix, "converted to postfix");
    Ok(postfix)
}

fn flush_number(digits: &mut String, output: &mut Vec<Token>) -> Result<(), CalcError> {
    if digits.is_empty() {
        return Ok(());
    }
    let value: f64 = digits
        .parse()
        .map_err(|_| CalcError::Parse(FaultKind::BadExpression))?;
    output.push(Token::Number(value));
    digits.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpn(expr: &str) -> String {
        to_postfix(expr).unwrap().to_string()
    }

    #[test]
    fn precedence_orders_operators() {
        assert_eq!(rpn("2+2*3"), "2 2 3 * +");
        assert_eq!(rpn("2*3+4"), "2 3 * 4 +");
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        assert_eq!(rpn("8-3-2"), "8 3 - 2 -");
        assert_eq!(rpn("8/4*2"), "8 4 / 2 *");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(rpn("(2+2)*3"), "2 2 + 3 *");
        assert_eq!(rpn("8-(3-2)"), "8 3 2 - -");
    }

    #[test]
    fn multi_digit_literals_are_buffered() {
        let postfix = to_postfix("123+45").unwrap();
        assert_eq!(
            postfix.tokens(),
            &[
                Token::Number(123.0),
                Token::Number(45.0),
                Token::Operator(Operator::Add)
            ]
        );
    }

    #[test]
    fn nested_expression() {
        assert_eq!(
            rpn("(3-(3+4)*2-4)+2+2*3"),
            "3 3 4 + 2 * - 4 - 2 + 2 3 * +"
        );
    }

    #[test]
    fn single_literal() {
        assert_eq!(rpn("7"), "7");
        assert_eq!(rpn("(7)"), "7");
    }

    #[test]
    fn empty_input_yields_empty_sequence() {
        assert!(to_postfix("").unwrap().is_empty());
    }

    #[test]
    fn unclosed_paren_is_bad_expression() {
        assert_eq!(
            to_postfix("(2+3"),
            Err(CalcError::Parse(FaultKind::BadExpression))
        );
    }

    #[test]
    fn unopened_paren_is_bad_expression() {
        assert_eq!(
            to_postfix("2+3)"),
            Err(CalcError::Parse(FaultKind::BadExpression))
        );
    }

    #[test]
    fn unknown_character_is_unexpected_symbol() {
        assert_eq!(
            to_postfix("2&3"),
            Err(CalcError::Parse(FaultKind::UnexpectedSymbol))
        );
        assert_eq!(
            to_postfix("2^3"),
            Err(CalcError::Parse(FaultKind::UnexpectedSymbol))
        );
    }

    #[test]
    fn whitespace_is_rejected() {
        assert_eq!(
            to_postfix("2 + 3"),
            Err(CalcError::Parse(FaultKind::UnexpectedSymbol))
        );
    }

    #[test]
    fn non_ascii_digit_is_rejected() {
        assert_eq!(
            to_postfix("2+\u{0663}"),
            Err(CalcError::Parse(FaultKind::UnexpectedSymbol))
        );
    }

    #[test]
    fn dangling_operator_still_converts() {
        // Underflow is detected by the evaluator, not the converter.
        assert_eq!(rpn("2+"), "2 +");
    }

    #[test]
    fn operator_count() {
        assert_eq!(to_postfix("1+2*3-4").unwrap().operator_count(), 3);
        assert_eq!(to_postfix("42").unwrap().operator_count(), 0);
    }
}
