#![no_main]

use libfuzzer_sys::fuzz_target;

use distcalc_core::{to_postfix, Token};

fuzz_target!(|data: &[u8]| {
    let Ok(expr) = std::str::from_utf8(data) else {
        return;
    };

    // Should not panic
    let Ok(postfix) = to_postfix(expr) else {
        return;
    };

    // Parentheses never survive conversion, and every other input byte
    // belongs to exactly one token.
    let numbers = postfix
        .tokens()
        .iter()
        .filter(|t| matches!(t, Token::Number(_)))
        .count();
    assert!(numbers + postfix.operator_count() <= expr.len());
    assert!(!postfix.to_string().contains('('));
});
