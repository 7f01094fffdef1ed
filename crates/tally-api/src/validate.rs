use crate::error::ApiError;

const ALLOWED: &[char] = &['(', ')', '*', '+', '-', '/', '.', ' '];

/// Longest expression accepted, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 64 * 1024;

/// Reject empty or oversized expressions and anything outside digits,
/// `( ) * + - / .` and space.
pub fn validate_expression(expression: &str) -> Result<(), ApiError> {
    if expression.trim().is_empty() {
        return Err(ApiError::InvalidRequest("expression is empty".into()));
    }
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "expression longer than {} bytes",
            MAX_EXPRESSION_LEN
        )));
    }
    if let Some(ch) = expression
        .chars()
        .find(|c| !c.is_ascii_digit() && !ALLOWED.contains(c))
    {
        return Err(ApiError::InvalidRequest(format!(
            "expression contains disallowed character '{}'",
            ch
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_allowed() {
        assert!(validate_expression("1+6").is_ok());
        assert!(validate_expression("(2.5 - 1) * 4 / 3").is_ok());
        // well-formedness is the evaluator's call
        assert!(validate_expression("1+").is_ok());
    }

    #[test]
    fn letters_and_blanks_are_rejected() {
        assert!(validate_expression("2^3").is_err());
        assert!(validate_expression("x + 1").is_err());
        assert!(validate_expression("1\t+ 1").is_err());
        assert!(validate_expression("").is_err());
        assert!(validate_expression("   ").is_err());
    }

    #[test]
    fn oversized_expressions_are_rejected() {
        assert!(validate_expression(&"1".repeat(MAX_EXPRESSION_LEN)).is_ok());

        let err = validate_expression(&"(".repeat(MAX_EXPRESSION_LEN + 1)).unwrap_err();
        assert!(err.to_string().contains("longer than"));
    }
}
