//! Lenient JSON repair for model output.
//!
//! DESIGN
//! ======
//! The generator is prompted for strict JSON but routinely emits small
//! defects. Repairs run in a fixed order on a candidate string:
//!
//! 1. strip one Markdown code fence (```` ``` ```` or ```` ```json ````)
//! 2. evaluate bare arithmetic in `x`/`y`/`width`/`height` values
//!    (`"y": 230 + 120` becomes `"y": 350`)
//! 3. drop trailing commas before `}` / `]`
//! 4. parse
//! 5. on failure, walk backwards over closing brackets and parse the longest
//!    bracket-balanced prefix that is valid JSON
//!
//! Everything here is pure: candidate in, `serde_json::Value` out.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ErrorCode;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?\s*```$").expect("fence pattern"));
static GEOMETRY_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(x|y|width|height)"\s*:\s*([^,}\]]+)"#).expect("geometry field pattern"));
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"));

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("empty input")]
    Empty,
    #[error("JSON parsing failed even after cleaning and truncation recovery: {0}")]
    Unparsable(#[source] serde_json::Error),
}

impl ErrorCode for SanitizeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_EMPTY_INPUT",
            Self::Unparsable(_) => "E_UNPARSABLE_JSON",
        }
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Repair and parse a candidate JSON text.
///
/// # Errors
///
/// Returns `Empty` for blank input and `Unparsable` when neither the cleaned
/// text nor any balanced prefix of it parses.
pub fn parse_lenient(raw: &str) -> Result<Value, SanitizeError> {
    let content = strip_fence(raw.trim());
    if content.is_empty() {
        return Err(SanitizeError::Empty);
    }
    let evaluated = evaluate_geometry_expressions(content);
    let cleaned = strip_trailing_commas(&evaluated);

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!(error = %e, len = cleaned.len(), "sanitize: direct parse failed, trying truncation recovery");
            if let Some(value) = recover_truncated(&cleaned) {
                warn!(len = cleaned.len(), "sanitize: recovered a truncated prefix");
                return Ok(value);
            }
            Err(SanitizeError::Unparsable(e))
        }
    }
}

// =============================================================================
// REPAIR STEPS
// =============================================================================

/// Remove one surrounding code fence, if present.
#[must_use]
pub fn strip_fence(content: &str) -> &str {
    match FENCE.captures(content).and_then(|caps| caps.get(1)) {
        Some(inner) if !inner.as_str().is_empty() => inner.as_str().trim(),
        _ => content,
    }
}

/// Replace arithmetic expressions in geometry fields with their value.
///
/// Only values made of digits, `.`, whitespace and at least one of
/// `+ - * /` are touched; anything else, and any expression that does not
/// evaluate to a finite number, is left as written.
#[must_use]
pub fn evaluate_geometry_expressions(content: &str) -> String {
    GEOMETRY_FIELD.replace_all(content, |caps: &Captures| {
        let whole = caps[0].to_string();
        let key = &caps[1];
        let expression = caps[2].trim();
        if !is_bare_arithmetic(expression) {
            return whole;
        }
        match eval_arithmetic(expression) {
            Some(value) if value.is_finite() => format!("\"{key}\": {value}"),
            _ => {
                warn!(key, expression, "sanitize: could not evaluate expression");
                whole
            }
        }
    })
    .into_owned()
}

/// Drop commas that directly precede a closing brace or bracket.
#[must_use]
pub fn strip_trailing_commas(content: &str) -> String {
    TRAILING_COMMA.replace_all(content, "$1").into_owned()
}

/// Parse the longest bracket-balanced prefix ending in `}` or `]`.
#[must_use]
pub fn recover_truncated(content: &str) -> Option<Value> {
    let closers: Vec<usize> = content
        .char_indices()
        .filter(|(_, c)| matches!(c, '}' | ']'))
        .map(|(i, _)| i)
        .collect();

    for &end in closers.iter().rev() {
        let prefix = &content[..=end];
        if !is_balanced(prefix) {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(prefix) {
            return Some(value);
        }
    }
    None
}

fn is_balanced(prefix: &str) -> bool {
    let count = |c: char| prefix.chars().filter(|&x| x == c).count();
    count('{') == count('}') && count('[') == count(']')
}

// =============================================================================
// ARITHMETIC
// =============================================================================

fn is_bare_arithmetic(expression: &str) -> bool {
    let has_operator = expression.contains(['+', '-', '*', '/']);
    let allowed = expression
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | '+' | '-' | '*' | '/'));
    has_operator && allowed
}

/// Evaluate `+ - * /` over decimal literals with the usual precedence and
/// unary signs. Returns `None` on any syntax error.
#[must_use]
pub fn eval_arithmetic(expression: &str) -> Option<f64> {
    let tokens = tokenize(expression)?;
    let mut parser = ExprParser { tokens: &tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos == tokens.len() { Some(value) } else { None }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
}

fn tokenize(expression: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut literal = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    literal.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            match literal.parse::<f64>() {
                Ok(n) => tokens.push(Token::Num(n)),
                Err(_) => return None,
            }
        } else if matches!(c, '+' | '-' | '*' | '/') {
            tokens.push(Token::Op(c));
            chars.next();
        } else {
            return None;
        }
    }
    Some(tokens)
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl ExprParser<'_> {
    fn peek_op(&self) -> Option<char> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek_op() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Some(value)
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek_op() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Some(value)
    }

    fn factor(&mut self) -> Option<f64> {
        match self.tokens.get(self.pos).copied()? {
            Token::Num(n) => {
                self.pos += 1;
                Some(n)
            }
            Token::Op('-') => {
                self.pos += 1;
                Some(-self.factor()?)
            }
            Token::Op('+') => {
                self.pos += 1;
                self.factor()
            }
            Token::Op(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;
