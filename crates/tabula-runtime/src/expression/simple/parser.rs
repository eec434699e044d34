//! Parser for the built-in expression language
//!
//! Grammar, lowest precedence first:
//! - `a || b`, `a or b`
//! - `a && b`, `a and b`
//! - `a == b`, `!=`, `<`, `<=`, `>`, `>=`, `a in [x, y]`, `a not in [x, y]`
//! - `a + b`, `a - b`
//! - `a * b`, `a / b`
//! - `!a`, `not a`, `-a`
//! - literals, variables, `( ... )`

use super::super::ExpressionError;
use tabula_core::Value;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Negate,
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Literal(Value),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        left: Box<Node>,
        op: BinaryOp,
        right: Box<Node>,
    },
    Membership {
        value: Box<Node>,
        list: Vec<Node>,
        negated: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Integer(i64),
    Double(f64),
    Str(String),
    Ident(String),
    Symbol(&'static str),
}

/// Parse expression text into a tree
pub(crate) fn parse(text: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
    };

    if parser.tokens.is_empty() {
        return Err(parser.error(0, "empty expression"));
    }

    let node = parser.parse_or()?;
    if let Some((offset, token)) = parser.tokens.get(parser.pos) {
        return Err(parser.error(*offset, &format!("unexpected token {:?}", token)));
    }
    Ok(node)
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, ExpressionError> {
    // Two-character symbols first
    const SYMBOLS: [&str; 18] = [
        "==", "!=", "<=", ">=", "&&", "||", "<", ">", "!", "+", "-", "*", "/", "(", ")", "[", "]",
        ",",
    ];

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' {
            let mut literal = String::new();
            let mut j = i + 1;
            let mut closed = false;
            while j < chars.len() {
                let (_, ch) = chars[j];
                if ch == '\\' && j + 1 < chars.len() {
                    literal.push(chars[j + 1].1);
                    j += 2;
                    continue;
                }
                if ch == c {
                    closed = true;
                    break;
                }
                literal.push(ch);
                j += 1;
            }
            if !closed {
                return Err(parse_error(text, offset, "unterminated string literal"));
            }
            tokens.push((offset, Token::Str(literal)));
            i = j + 1;
            continue;
        }

        if c.is_ascii_digit() {
            let mut j = i;
            let mut is_double = false;
            while j < chars.len() && (chars[j].1.is_ascii_digit() || chars[j].1 == '.') {
                if chars[j].1 == '.' {
                    is_double = true;
                }
                j += 1;
            }
            let end = chars.get(j).map_or(text.len(), |(o, _)| *o);
            let raw = &text[offset..end];
            let token = if is_double {
                raw.parse::<f64>()
                    .map(Token::Double)
                    .map_err(|_| parse_error(text, offset, "invalid decimal literal"))?
            } else {
                raw.parse::<i64>()
                    .map(Token::Integer)
                    .map_err(|_| parse_error(text, offset, "integer literal out of range"))?
            };
            tokens.push((offset, token));
            i = j;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut j = i;
            while j < chars.len()
                && (chars[j].1.is_alphanumeric() || chars[j].1 == '_' || chars[j].1 == '.')
            {
                j += 1;
            }
            let end = chars.get(j).map_or(text.len(), |(o, _)| *o);
            tokens.push((offset, Token::Ident(text[offset..end].to_string())));
            i = j;
            continue;
        }

        let rest = &text[offset..];
        match SYMBOLS.iter().find(|symbol| rest.starts_with(**symbol)) {
            Some(symbol) => {
                tokens.push((offset, Token::Symbol(*symbol)));
                i += symbol.len();
            }
            None => {
                return Err(parse_error(
                    text,
                    offset,
                    &format!("unexpected character '{}'", c),
                ))
            }
        }
    }

    Ok(tokens)
}

fn parse_error(text: &str, offset: usize, message: &str) -> ExpressionError {
    ExpressionError::Parse {
        expression: text.to_string(),
        offset,
        message: message.to_string(),
    }
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, offset: usize, message: &str) -> ExpressionError {
        parse_error(self.text, offset, message)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, token)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.text.len(), |(offset, _)| *offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, token)| token.clone());
        self.pos += 1;
        token
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if matches!(self.peek(), Some(Token::Symbol(s)) if *s == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(s)) if s == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<(), ExpressionError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.error(self.offset(), &format!("expected '{}'", symbol)))
        }
    }

    fn parse_or(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_and()?;
        while self.eat_symbol("||") || self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_comparison()?;
        while self.eat_symbol("&&") || self.eat_keyword("and") {
            let right = self.parse_comparison()?;
            left = binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Node, ExpressionError> {
        let left = self.parse_additive()?;

        const COMPARISONS: [(&str, BinaryOp); 6] = [
            ("==", BinaryOp::Eq),
            ("!=", BinaryOp::Ne),
            ("<=", BinaryOp::Le),
            (">=", BinaryOp::Ge),
            ("<", BinaryOp::Lt),
            (">", BinaryOp::Gt),
        ];
        for (symbol, op) in COMPARISONS {
            if self.eat_symbol(symbol) {
                let right = self.parse_additive()?;
                return Ok(binary(left, op, right));
            }
        }

        if self.eat_keyword("in") {
            let list = self.parse_list()?;
            return Ok(membership(left, list, false));
        }

        if matches!(self.peek(), Some(Token::Ident(s)) if s == "not")
            && matches!(self.tokens.get(self.pos + 1), Some((_, Token::Ident(s))) if s == "in")
        {
            self.pos += 2;
            let list = self.parse_list()?;
            return Ok(membership(left, list, true));
        }

        Ok(left)
    }

    fn parse_list(&mut self) -> Result<Vec<Node>, ExpressionError> {
        self.expect_symbol("[")?;
        let mut items = Vec::new();
        if self.eat_symbol("]") {
            return Ok(items);
        }
        loop {
            items.push(self.parse_or()?);
            if self.eat_symbol("]") {
                return Ok(items);
            }
            self.expect_symbol(",")?;
        }
    }

    fn parse_additive(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_term()?;
        loop {
            let op = if self.eat_symbol("+") {
                BinaryOp::Add
            } else if self.eat_symbol("-") {
                BinaryOp::Sub
            } else {
                return Ok(left);
            };
            let right = self.parse_term()?;
            left = binary(left, op, right);
        }
    }

    fn parse_term(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.eat_symbol("*") {
                BinaryOp::Mul
            } else if self.eat_symbol("/") {
                BinaryOp::Div
            } else {
                return Ok(left);
            };
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Node, ExpressionError> {
        if self.eat_symbol("!") || self.eat_keyword("not") {
            let operand = self.parse_unary()?;
            return Ok(Node::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        if self.eat_symbol("-") {
            let operand = self.parse_unary()?;
            return Ok(Node::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, ExpressionError> {
        let offset = self.offset();
        match self.next() {
            Some(Token::Integer(i)) => Ok(Node::Literal(Value::Integer(i))),
            Some(Token::Double(d)) => Ok(Node::Literal(Value::Double(d))),
            Some(Token::Str(s)) => Ok(Node::Literal(Value::String(s))),
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "true" => Node::Literal(Value::Bool(true)),
                "false" => Node::Literal(Value::Bool(false)),
                "null" => Node::Literal(Value::Null),
                _ => Node::Variable(name),
            }),
            Some(Token::Symbol("(")) => {
                let node = self.parse_or()?;
                self.expect_symbol(")")?;
                Ok(node)
            }
            Some(token) => Err(self.error(offset, &format!("unexpected token {:?}", token))),
            None => Err(self.error(offset, "unexpected end of expression")),
        }
    }
}

fn binary(left: Node, op: BinaryOp, right: Node) -> Node {
    Node::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn membership(value: Node, list: Vec<Node>, negated: bool) -> Node {
    Node::Membership {
        value: Box::new(value),
        list,
        negated,
    }
}
