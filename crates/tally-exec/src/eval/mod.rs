//! Expression evaluation.
//!
//! [`Evaluator`] is the seam the solver calls; [`ArithmeticEvaluator`] is the
//! built-in implementation for `+ - * /`, parentheses, unary signs and decimals.

use crate::error::EvalError;

/// Deepest nesting of parentheses and unary signs the parser follows.
pub const MAX_DEPTH: usize = 256;

/// Turns an expression into a number.
///
/// Implementations may be slow; the solver runs them on the blocking pool.
pub trait Evaluator: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn evaluate(&self, expression: &str) -> Result<f64, EvalError>;
}

/// Recursive-descent evaluator with the usual precedence rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArithmeticEvaluator;

impl Evaluator for ArithmeticEvaluator {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn evaluate(&self, expression: &str) -> Result<f64, EvalError> {
        let mut parser = Parser::new(expression);
        parser.skip_ws();
        if parser.peek().is_none() {
            return Err(EvalError::Empty);
        }

        let value = parser.expr()?;
        parser.skip_ws();
        match parser.peek() {
            None => {}
            Some(')') => return Err(EvalError::UnbalancedParens),
            Some(ch) => {
                return Err(EvalError::UnexpectedChar {
                    ch,
                    pos: parser.pos,
                });
            }
        }

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NotFinite)
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    acc *= self.unary()?;
                }
                Some('/') => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    acc /= rhs;
                }
                _ => return Ok(acc),
            }
        }
    }

    // unary := ('+' | '-') unary | primary
    fn unary(&mut self) -> Result<f64, EvalError> {
        self.skip_ws();
        match self.peek() {
            Some(sign @ ('-' | '+')) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(if sign == '-' { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    // primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, EvalError> {
        self.skip_ws();
        match self.peek() {
            None => Err(EvalError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                self.skip_ws();
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    None => Err(EvalError::UnbalancedParens),
                    Some(ch) => Err(EvalError::UnexpectedChar { ch, pos: self.pos }),
                }
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.number(),
            Some(ch) => Err(EvalError::UnexpectedChar { ch, pos: self.pos }),
        }
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| EvalError::BadNumber(literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> Result<f64, EvalError> {
        ArithmeticEvaluator.evaluate(s)
    }

    #[test]
    fn simple_sum() {
        assert_eq!(eval("1+6"), Ok(7.0));
    }

    #[test]
    fn precedence_and_parens() {
        assert_eq!(eval("2 + 3 * 4"), Ok(14.0));
        assert_eq!(eval("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(eval("10 / 4 - 1"), Ok(1.5));
        assert_eq!(eval("8 - 3 - 2"), Ok(3.0));
        assert_eq!(eval("2 * (3 + (4 - 1)) / 3"), Ok(4.0));
    }

    #[test]
    fn unary_signs_and_decimals() {
        assert_eq!(eval("-3 + 5"), Ok(2.0));
        assert_eq!(eval("-(2 * 2)"), Ok(-4.0));
        assert_eq!(eval("1.5 * 2"), Ok(3.0));
        assert_eq!(eval(".5 + .25"), Ok(0.75));
    }

    #[test]
    fn malformed_expressions() {
        assert_eq!(eval("1+"), Err(EvalError::UnexpectedEnd));
        assert_eq!(eval(""), Err(EvalError::Empty));
        assert_eq!(eval("   "), Err(EvalError::Empty));
        assert_eq!(eval("(1+2"), Err(EvalError::UnbalancedParens));
        assert_eq!(eval("1+2)"), Err(EvalError::UnbalancedParens));
        assert_eq!(eval("1.2.3"), Err(EvalError::BadNumber("1.2.3".into())));
        assert!(matches!(
            eval("2 3"),
            Err(EvalError::UnexpectedChar { ch: '3', .. })
        ));
        assert!(matches!(
            eval("*2"),
            Err(EvalError::UnexpectedChar { ch: '*', pos: 0 })
        ));
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(eval("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("1/(2-2)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn nesting_is_bounded() {
        let limit = MAX_DEPTH;
        let ok = format!("{}1{}", "(".repeat(limit), ")".repeat(limit));
        assert_eq!(eval(&ok), Ok(1.0));
        assert_eq!(eval(&format!("{}1", "-".repeat(limit))), Ok(1.0));

        let deep = format!("{}1{}", "(".repeat(limit + 1), ")".repeat(limit + 1));
        assert_eq!(eval(&deep), Err(EvalError::TooDeep { limit }));
        assert_eq!(eval(&"(".repeat(200_000)), Err(EvalError::TooDeep { limit }));
        assert_eq!(eval(&"-".repeat(200_000)), Err(EvalError::TooDeep { limit }));
        assert_eq!(eval(&"(-".repeat(limit)), Err(EvalError::TooDeep { limit }));
    }

    #[test]
    fn depth_is_released_between_siblings() {
        let group = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        let wide = vec![group; 4].join("+");
        assert_eq!(eval(&wide), Ok(4.0));
    }
}
