use anyhow::{bail, Result};

/// Evaluate an arithmetic expression over `+ - * / ( )` and decimal literals
/// with standard operator precedence and f64 semantics.
///
/// Deliberately a small recursive-descent parser rather than any dynamic
/// evaluator; the caller has already whitelisted the character set.
pub fn evaluate(expr: &str) -> Result<f64> {
    let mut parser = Parser {
        src: expr.as_bytes(),
        pos: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.src.len() {
        bail!("unexpected character at position {}", parser.pos);
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    value /= self.factor()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64> {
        if self.peek() == Some(b'-') {
            self.pos += 1;
            return Ok(-self.factor()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek() != Some(b')') {
                    bail!("missing closing parenthesis");
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) => bail!("unexpected character '{}'", c as char),
            None => bail!("unexpected end of expression"),
        }
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == b'.') {
            self.pos += 1;
        }
        let literal = std::str::from_utf8(&self.src[start..self.pos])?;
        literal
            .parse::<f64>()
            .map_err(|_| anyhow::anyhow!("invalid number literal '{}'", literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(evaluate("2+2*3").unwrap(), 8.0);
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(evaluate("(2+2)*3").unwrap(), 12.0);
    }

    #[test]
    fn left_associative_subtraction_and_division() {
        assert_eq!(evaluate("10-3-2").unwrap(), 5.0);
        assert_eq!(evaluate("20/2/5").unwrap(), 2.0);
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(evaluate("1.5*4").unwrap(), 6.0);
        assert_eq!(evaluate("10/4").unwrap(), 2.5);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(evaluate("-5+10").unwrap(), 5.0);
        assert_eq!(evaluate("2*-3").unwrap(), -6.0);
        assert_eq!(evaluate("-(1+2)").unwrap(), -3.0);
    }

    #[test]
    fn division_by_zero_is_non_finite() {
        assert!(evaluate("10/0").unwrap().is_infinite());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1+").is_err());
        assert!(evaluate("1++2").is_err());
        assert!(evaluate("(1+2").is_err());
        assert!(evaluate("1.2.3").is_err());
        assert!(evaluate("1)2").is_err());
    }
}
