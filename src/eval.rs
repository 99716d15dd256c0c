//! Tiny expression language behind `dev eval`.
//!
//! Statements are separated by `;` or newlines. `let name = expr` binds a
//! value; the result is the value of the final statement if it is an
//! expression, `None` otherwise.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("unexpected {0}")]
    Unexpected(String),
    #[error("name `{0}` is not defined")]
    UnknownName(String),
    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("bad operand type for unary -: {0}")]
    BadOperand(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
    #[error("expression nested too deeply")]
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    Assign,
    LParen,
    RParen,
    Sep,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Int(i) => format!("number `{i}`"),
            Token::Float(x) => format!("number `{x}`"),
            Token::Str(s) => format!("string `{s}`"),
            Token::Ident(name) => format!("name `{name}`"),
            Token::Op(op) => format!("`{op}`"),
            Token::Assign => "`=`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Sep => "end of statement".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        let token = match c {
            '\n' | ';' => Token::Sep,
            c if c.is_whitespace() => continue,
            '0'..='9' => {
                let mut literal = c.to_string();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' || next == '_' {
                        literal.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let cleaned = literal.replace('_', "");
                if cleaned.contains('.') {
                    cleaned
                        .parse()
                        .map(Token::Float)
                        .map_err(|_| EvalError::InvalidNumber(literal))?
                } else {
                    cleaned
                        .parse()
                        .map(Token::Int)
                        .map_err(|_| EvalError::InvalidNumber(literal))?
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = c.to_string();
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Ident(name)
            }
            '"' | '\'' => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(end) if end == c => break,
                        Some(ch) => text.push(ch),
                        None => return Err(EvalError::UnterminatedString),
                    }
                }
                Token::Str(text)
            }
            '(' => Token::LParen,
            ')' => Token::RParen,
            '+' => Token::Op("+"),
            '-' => Token::Op("-"),
            '*' => Token::Op("*"),
            '/' => Token::Op("/"),
            '%' => Token::Op("%"),
            '=' if chars.peek() == Some(&'=') => {
                chars.next();
                Token::Op("==")
            }
            '=' => Token::Assign,
            '!' if chars.peek() == Some(&'=') => {
                chars.next();
                Token::Op("!=")
            }
            '<' | '>' => {
                let or_equal = chars.peek() == Some(&'=');
                if or_equal {
                    chars.next();
                }
                Token::Op(match (c, or_equal) {
                    ('<', false) => "<",
                    ('<', true) => "<=",
                    ('>', false) => ">",
                    _ => ">=",
                })
            }
            other => return Err(EvalError::UnexpectedChar(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Limit on parentheses and unary minus nesting, keeps recursion off the stack guard
const MAX_DEPTH: usize = 64;

struct Interpreter {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    env: HashMap<String, Value>,
}

impl Interpreter {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_op(&self, ops: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), EvalError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(EvalError::Unexpected(token.describe())),
            None => Err(EvalError::Unexpected("end of input".to_string())),
        }
    }

    fn run(&mut self) -> Result<Option<Value>, EvalError> {
        let mut last = None;
        loop {
            while self.peek() == Some(&Token::Sep) {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Ok(last);
            }

            last = self.statement()?;

            match self.peek() {
                None | Some(Token::Sep) => {}
                Some(token) => return Err(EvalError::Unexpected(token.describe())),
            }
        }
    }

    fn statement(&mut self) -> Result<Option<Value>, EvalError> {
        if matches!(self.peek(), Some(Token::Ident(kw)) if kw == "let") {
            self.pos += 1;
            let name = match self.advance() {
                Some(Token::Ident(name)) => name,
                Some(token) => return Err(EvalError::Unexpected(token.describe())),
                None => return Err(EvalError::Unexpected("end of input".to_string())),
            };
            self.expect(Token::Assign)?;
            let value = self.expr()?;
            self.env.insert(name, value);
            return Ok(None);
        }

        self.expr().map(Some)
    }

    fn expr(&mut self) -> Result<Value, EvalError> {
        let left = self.additive()?;
        match self.peek_op(&["==", "!=", "<", "<=", ">", ">="]) {
            Some(op) => {
                self.pos += 1;
                let right = self.additive()?;
                compare(op, &left, &right)
            }
            None => Ok(left),
        }
    }

    fn additive(&mut self) -> Result<Value, EvalError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek_op(&["+", "-"]) {
            self.pos += 1;
            let right = self.term()?;
            value = arithmetic(op, value, right)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Value, EvalError> {
        let mut value = self.unary()?;
        while let Some(op) = self.peek_op(&["*", "/", "%"]) {
            self.pos += 1;
            let right = self.unary()?;
            value = arithmetic(op, value, right)?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Value, EvalError> {
        if self.peek_op(&["-"]).is_some() {
            self.pos += 1;
            self.enter()?;
            let operand = self.unary()?;
            self.depth -= 1;
            return match operand {
                Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
                Value::Float(x) => Ok(Value::Float(-x)),
                other => Err(EvalError::BadOperand(other.type_name())),
            };
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, EvalError> {
        match self.advance() {
            Some(Token::Int(i)) => Ok(Value::Int(i)),
            Some(Token::Float(x)) => Ok(Value::Float(x)),
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" | "True" => Ok(Value::Bool(true)),
                "false" | "False" => Ok(Value::Bool(false)),
                _ => self
                    .env
                    .get(&name)
                    .cloned()
                    .ok_or(EvalError::UnknownName(name)),
            },
            Some(Token::LParen) => {
                self.enter()?;
                let value = self.expr()?;
                self.expect(Token::RParen)?;
                self.depth -= 1;
                Ok(value)
            }
            Some(token) => Err(EvalError::Unexpected(token.describe())),
            None => Err(EvalError::Unexpected("end of input".to_string())),
        }
    }
}

fn arithmetic(op: &'static str, left: Value, right: Value) -> Result<Value, EvalError> {
    let mismatch = |left: &Value, right: &Value| EvalError::TypeMismatch {
        op,
        left: left.type_name(),
        right: right.type_name(),
    };

    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            match op {
                "+" => a.checked_add(b).map(Value::Int).ok_or(EvalError::Overflow),
                "-" => a.checked_sub(b).map(Value::Int).ok_or(EvalError::Overflow),
                "*" => a.checked_mul(b).map(Value::Int).ok_or(EvalError::Overflow),
                "/" if b == 0 => Err(EvalError::DivisionByZero),
                "/" => Ok(Value::Float(a as f64 / b as f64)),
                _ if b == 0 => Err(EvalError::DivisionByZero),
                _ => a.checked_rem(b).map(Value::Int).ok_or(EvalError::Overflow),
            }
        }
        (Value::Str(a), Value::Str(b)) if op == "+" => Ok(Value::Str(format!("{a}{b}"))),
        _ => {
            let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
                return Err(mismatch(&left, &right));
            };
            match op {
                "+" => Ok(Value::Float(a + b)),
                "-" => Ok(Value::Float(a - b)),
                "*" => Ok(Value::Float(a * b)),
                _ if b == 0.0 => Err(EvalError::DivisionByZero),
                "/" => Ok(Value::Float(a / b)),
                _ => Ok(Value::Float(a % b)),
            }
        }
    }
}

fn compare(op: &'static str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    use std::cmp::Ordering;

    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) if matches!(op, "==" | "!=") => Some(a.cmp(b)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(EvalError::TypeMismatch {
                    op,
                    left: left.type_name(),
                    right: right.type_name(),
                })
            }
        },
    };

    let result = match (op, ordering) {
        ("==", ord) => ord == Some(Ordering::Equal),
        ("!=", ord) => ord != Some(Ordering::Equal),
        (_, None) => false,
        ("<", Some(ord)) => ord == Ordering::Less,
        ("<=", Some(ord)) => ord != Ordering::Greater,
        (">", Some(ord)) => ord == Ordering::Greater,
        (_, Some(ord)) => ord != Ordering::Less,
    };
    Ok(Value::Bool(result))
}

/// Drops surrounding backticks and spaces, as pasted from a code block
pub fn strip_code(code: &str) -> &str {
    code.trim_matches(|c| c == '`' || c == ' ')
}

pub fn evaluate(code: &str, bindings: HashMap<String, Value>) -> Result<Option<Value>, EvalError> {
    let tokens = tokenize(strip_code(code))?;
    Interpreter {
        tokens,
        pos: 0,
        depth: 0,
        env: bindings,
    }
    .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(code: &str) -> Result<Option<Value>, EvalError> {
        let bindings = [
            ("guilds".to_string(), Value::Int(12)),
            ("latency".to_string(), Value::Float(41.5)),
        ]
        .into_iter()
        .collect();
        evaluate(code, bindings)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), Some(Value::Int(7)));
        assert_eq!(eval("(1 + 2) * 3").unwrap(), Some(Value::Int(9)));
        assert_eq!(eval("-2 * -3").unwrap(), Some(Value::Int(6)));
        assert_eq!(eval("7 % 4").unwrap(), Some(Value::Int(3)));
        assert_eq!(eval("7 / 2").unwrap(), Some(Value::Float(3.5)));
    }

    #[test]
    fn test_bindings_and_last_expression() {
        assert_eq!(eval("guilds * 2").unwrap(), Some(Value::Int(24)));
        assert_eq!(
            eval("let x = guilds + 1\nx * 10").unwrap(),
            Some(Value::Int(130))
        );
        assert_eq!(eval("let y = 3; y").unwrap(), Some(Value::Int(3)));
        assert_eq!(eval("let y = 3").unwrap(), None);
        assert_eq!(eval("").unwrap(), None);
    }

    #[test]
    fn test_code_fences_are_stripped() {
        assert_eq!(eval("```1 + 1```").unwrap(), Some(Value::Int(2)));
        assert_eq!(eval("` latency > 40 `").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn test_strings_and_comparisons() {
        assert_eq!(
            eval("'po' + \"tato\"").unwrap(),
            Some(Value::Str("potato".to_string()))
        );
        assert_eq!(eval("2 == 2.0").unwrap(), Some(Value::Bool(true)));
        assert_eq!(eval("\"a\" < \"b\"").unwrap(), Some(Value::Bool(true)));
        assert_eq!(eval("true != false").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn test_errors() {
        assert_eq!(eval("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("nope"), Err(EvalError::UnknownName("nope".to_string())));
        assert_eq!(eval("'open"), Err(EvalError::UnterminatedString));
        assert_eq!(eval("1 $ 2"), Err(EvalError::UnexpectedChar('$')));
        assert!(matches!(eval("1 2"), Err(EvalError::Unexpected(_))));
        assert!(matches!(eval("(1 + 2"), Err(EvalError::Unexpected(_))));
        assert!(matches!(
            eval("'a' - 1"),
            Err(EvalError::TypeMismatch { op: "-", .. })
        ));
        assert_eq!(eval("-'a'"), Err(EvalError::BadOperand("str")));
        assert_eq!(eval("9223372036854775807 + 1"), Err(EvalError::Overflow));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let parens = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(eval(&parens), Err(EvalError::TooDeep));
        assert_eq!(eval(&"-".repeat(2000)), Err(EvalError::TooDeep));

        let shallow = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(eval(&shallow).unwrap(), Some(Value::Int(1)));
        assert_eq!(eval("((1) + (2)) * ((3))").unwrap(), Some(Value::Int(9)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
