//! Script reader: source text → [`Stmt`] / [`Expr`].
//!
//! The notation is deliberately small; it exists to write composite literals
//! and index chains down, not to be a general language.
//!
//! ```text
//! # comment
//! let n = 2
//! const base = 10
//! let d = &d{1: "one", n: "two", base + n: "twelve"}
//! let l = &l[1, 2, 3, [4, 5]]
//! let a = &a(1.5, 'c', {"k": true})
//! d[1] = "uno"
//! l[-1][0] = 40
//! print a[-1].k
//! print(len(l), 0..3)
//! ```
//!
//! Untagged `{...}` is a dictionary and `[...]` a list. Statements are
//! separated by newlines or `;`; newlines inside brackets are ignored, so
//! literals may span lines. `.name` is sugar for `["name"]` and `.0` for
//! `[0]`.

use crate::error::{LatticeError, Result};
use crate::expr::{BinaryOp, CompositeLiteral, Expr, Stmt, UnaryOp};
use crate::value::Value;

/// Parse a whole script.
pub fn parse_script(source: &str) -> Result<Vec<Stmt>> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).script()
}

/// Parse a single expression (surrounding blank lines are allowed).
pub fn parse_expr(source: &str) -> Result<Expr> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.skip_separators();
    let expr = parser.expr()?;
    parser.skip_separators();
    if !parser.at(&Tok::Eof) {
        return Err(parser.error("expected end of input"));
    }
    Ok(expr)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    /// Unsigned magnitude; the sign is applied when a leading `-` is folded.
    Int(u64),
    Float(f64),
    Str(String),
    Char(char),
    Ident(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Colon,
    Dot,
    DotDot,
    Amp,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,
    Separator,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
    column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    /// Bracket nesting; newlines only separate statements at depth 0.
    depth: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            depth: 0,
            tokens: Vec::new(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> LatticeError {
        LatticeError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        while let Some(&c) = self.chars.peek() {
            let (line, column) = (self.line, self.column);
            let tok = match c {
                '\n' | ';' => {
                    self.bump();
                    if self.depth > 0 && c == '\n' {
                        continue;
                    }
                    Tok::Separator
                }
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '#' => {
                    while self.chars.peek().is_some_and(|&c| c != '\n') {
                        self.bump();
                    }
                    continue;
                }
                '0'..='9' => self.number(line, column)?,
                '"' => self.string(line, column)?,
                '\'' => self.char_literal(line, column)?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                _ => {
                    self.bump();
                    self.punct(c, line, column)?
                }
            };
            self.tokens.push(Token { tok, line, column });
        }
        self.tokens.push(Token {
            tok: Tok::Eof,
            line: self.line,
            column: self.column,
        });
        Ok(self.tokens)
    }

    fn punct(&mut self, c: char, line: usize, column: usize) -> Result<Tok> {
        let tok = match c {
            '{' | '[' | '(' => {
                self.depth += 1;
                match c {
                    '{' => Tok::LBrace,
                    '[' => Tok::LBracket,
                    _ => Tok::LParen,
                }
            }
            '}' | ']' | ')' => {
                self.depth = self.depth.saturating_sub(1);
                match c {
                    '}' => Tok::RBrace,
                    ']' => Tok::RBracket,
                    _ => Tok::RParen,
                }
            }
            ',' => Tok::Comma,
            ':' => Tok::Colon,
            '.' if self.eat('.') => Tok::DotDot,
            '.' => Tok::Dot,
            '&' if self.eat('&') => Tok::AndAnd,
            '&' => Tok::Amp,
            '|' if self.eat('|') => Tok::OrOr,
            '=' if self.eat('=') => Tok::EqEq,
            '=' => Tok::Assign,
            '!' if self.eat('=') => Tok::NotEq,
            '!' => Tok::Bang,
            '<' if self.eat('=') => Tok::Le,
            '<' => Tok::Lt,
            '>' if self.eat('=') => Tok::Ge,
            '>' => Tok::Gt,
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' => Tok::Star,
            '/' => Tok::Slash,
            '%' => Tok::Percent,
            other => {
                return Err(self.error(line, column, format!("unexpected character '{other}'")))
            }
        };
        Ok(tok)
    }

    fn number(&mut self, line: usize, column: usize) -> Result<Tok> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek().filter(|c| c.is_ascii_digit()) {
            text.push(c);
            self.bump();
        }
        // After `.` the number is a field step: `x.0.1` is two steps, not 0.1.
        let after_dot = matches!(self.tokens.last(), Some(Token { tok: Tok::Dot, .. }));
        if !after_dot && self.chars.peek() == Some(&'.') {
            let mut ahead = self.chars.clone();
            ahead.next();
            if ahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.push('.');
                self.bump();
                while let Some(&c) = self.chars.peek().filter(|c| c.is_ascii_digit()) {
                    text.push(c);
                    self.bump();
                }
                return text
                    .parse()
                    .map(Tok::Float)
                    .map_err(|_| self.error(line, column, format!("invalid float '{text}'")));
            }
        }
        text.parse().map(Tok::Int).map_err(|_| {
            self.error(line, column, format!("integer literal '{text}' out of range"))
        })
    }

    fn escape(&mut self, line: usize, column: usize) -> Result<char> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some(c @ ('\\' | '"' | '\'')) => Ok(c),
            Some(other) => Err(self.error(line, column, format!("unknown escape '\\{other}'"))),
            None => Err(self.error(line, column, "unterminated escape")),
        }
    }

    fn string(&mut self, line: usize, column: usize) -> Result<Tok> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Tok::Str(out)),
                Some('\\') => out.push(self.escape(line, column)?),
                Some(c) => out.push(c),
                None => return Err(self.error(line, column, "unterminated string")),
            }
        }
    }

    fn char_literal(&mut self, line: usize, column: usize) -> Result<Tok> {
        self.bump();
        let c = match self.bump() {
            Some('\\') => self.escape(line, column)?,
            Some('\'') | None => return Err(self.error(line, column, "empty char literal")),
            Some(c) => c,
        };
        if self.bump() != Some('\'') {
            return Err(self.error(line, column, "char literal must hold exactly one character"));
        }
        Ok(Tok::Char(c))
    }

    fn ident(&mut self) -> Tok {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek().filter(|c| c.is_alphanumeric() || **c == '_') {
            name.push(c);
            self.bump();
        }
        Tok::Ident(name)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

const KEYWORDS: &[&str] = &["let", "const", "true", "false", "nil", "and", "or"];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Tok {
        &self.current().tok
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_next(&self) -> &Tok {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + 1).min(last)].tok
    }

    fn at(&self, tok: &Tok) -> bool {
        self.peek() == tok
    }

    fn at_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Tok::Ident(name) if name == word)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.at(tok) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok, what: &str) -> Result<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    /// Apply the sign to a lexed magnitude. `-9223372036854775808` fits.
    fn int_literal(&self, magnitude: u64, negative: bool) -> Result<i64> {
        let value = if negative {
            0i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        };
        value.ok_or_else(|| self.error(&format!("integer literal {magnitude} out of range")))
    }

    fn error(&self, message: &str) -> LatticeError {
        let token = self.current();
        let found = match &token.tok {
            Tok::Eof => "end of input".to_string(),
            Tok::Separator => "end of statement".to_string(),
            other => format!("{other:?}"),
        };
        LatticeError::Parse {
            line: token.line,
            column: token.column,
            message: format!("{message}, found {found}"),
        }
    }

    fn skip_separators(&mut self) {
        while self.eat(&Tok::Separator) {}
    }

    fn script(&mut self) -> Result<Vec<Stmt>> {
        let mut program = Vec::new();
        self.skip_separators();
        while !self.at(&Tok::Eof) {
            program.push(self.statement()?);
            if !self.at(&Tok::Eof) {
                self.expect(&Tok::Separator, "newline or ';' after statement")?;
            }
            self.skip_separators();
        }
        Ok(program)
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.at_keyword("let") || self.at_keyword("const") {
            let constant = self.at_keyword("const");
            self.advance();
            let name = self.binding_name()?;
            self.expect(&Tok::Assign, "'='")?;
            let value = self.expr()?;
            return Ok(Stmt::Let {
                name,
                value,
                constant,
            });
        }
        if self.at_keyword("print") && self.peek_next() != &Tok::LParen {
            self.advance();
            return Ok(Stmt::Print(self.expr()?));
        }

        let expr = self.expr()?;
        if !self.at(&Tok::Assign) {
            return Ok(Stmt::Expr(expr));
        }
        let (name, steps) = match expr {
            Expr::Var(name) => (name, Vec::new()),
            Expr::Index { base, steps } => match *base {
                Expr::Var(name) => (name, steps),
                _ => return Err(self.error("assignment target must start with a variable")),
            },
            _ => return Err(self.error("invalid assignment target")),
        };
        self.advance();
        let value = self.expr()?;
        Ok(Stmt::Assign { name, steps, value })
    }

    fn binding_name(&mut self) -> Result<String> {
        match self.peek().clone() {
            Tok::Ident(name) if !KEYWORDS.contains(&name.as_str()) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected a variable name")),
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr> {
        let mut left = self.and()?;
        while self.eat(&Tok::OrOr) || self.eat_keyword("or") {
            let right = self.and()?;
            left = Expr::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut left = self.equality()?;
        while self.eat(&Tok::AndAnd) || self.eat_keyword("and") {
            let right = self.equality()?;
            left = Expr::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.at_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek() {
                Tok::EqEq => BinaryOp::Eq,
                Tok::NotEq => BinaryOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.comparison()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut left = self.range()?;
        loop {
            let op = match self.peek() {
                Tok::Lt => BinaryOp::Lt,
                Tok::Le => BinaryOp::Le,
                Tok::Gt => BinaryOp::Gt,
                Tok::Ge => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.range()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn range(&mut self) -> Result<Expr> {
        let start = self.additive()?;
        if !self.eat(&Tok::DotDot) {
            return Ok(start);
        }
        let end = self.additive()?;
        Ok(Expr::Range {
            start: Box::new(start),
            end: Box::new(end),
        })
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => BinaryOp::Add,
                Tok::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.term()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Tok::Star => BinaryOp::Mul,
                Tok::Slash => BinaryOp::Div,
                Tok::Percent => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Tok::Minus => UnaryOp::Neg,
            Tok::Bang => UnaryOp::Not,
            _ => return self.postfix(),
        };
        self.advance();
        // `-3` is a literal, not a negation node.
        if op == UnaryOp::Neg {
            if let Tok::Int(n) = *self.peek() {
                let value = self.int_literal(n, true)?;
                self.advance();
                return self.postfix_on(Expr::int(value));
            }
        }
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        self.postfix_on(base)
    }

    fn postfix_on(&mut self, mut expr: Expr) -> Result<Expr> {
        loop {
            if self.eat(&Tok::LBracket) {
                let step = self.expr()?;
                self.expect(&Tok::RBracket, "']'")?;
                expr = Expr::index(expr, [step]);
            } else if self.eat(&Tok::Dot) {
                let step = match self.peek() {
                    Tok::Ident(name) => Expr::string(name.clone()),
                    Tok::Int(n) => Expr::int(self.int_literal(*n, false)?),
                    _ => return Err(self.error("expected a field name or position after '.'")),
                };
                self.advance();
                expr = Expr::index(expr, [step]);
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.peek().clone() {
            Tok::Int(n) => {
                let value = self.int_literal(n, false)?;
                self.advance();
                Ok(Expr::int(value))
            }
            Tok::Float(x) => {
                self.advance();
                Ok(Expr::Literal(Value::Float(x)))
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Expr::string(s))
            }
            Tok::Char(c) => {
                self.advance();
                Ok(Expr::Literal(Value::Char(c)))
            }
            Tok::Ident(name) => {
                self.advance();
                match name.as_str() {
                    "true" => Ok(Expr::Literal(Value::Bool(true))),
                    "false" => Ok(Expr::Literal(Value::Bool(false))),
                    "nil" => Ok(Expr::Literal(Value::Null)),
                    _ if self.at(&Tok::LParen) => {
                        self.advance();
                        let args = self.items(&Tok::RParen, "')'")?;
                        Ok(Expr::Call { name, args })
                    }
                    kw if KEYWORDS.contains(&kw) => {
                        self.pos -= 1;
                        Err(self.error("unexpected keyword"))
                    }
                    _ => Ok(Expr::Var(name)),
                }
            }
            Tok::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(&Tok::RParen, "')'")?;
                Ok(inner)
            }
            Tok::LBracket => {
                self.advance();
                Ok(Expr::Composite(CompositeLiteral::List(
                    self.items(&Tok::RBracket, "']'")?,
                )))
            }
            Tok::LBrace => {
                self.advance();
                Ok(Expr::Composite(CompositeLiteral::Dict(self.pairs()?)))
            }
            Tok::Amp => {
                self.advance();
                self.tagged()
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    /// `&d{...}`, `&l[...]`, `&a(...)` or `&a[...]`, after the `&`.
    fn tagged(&mut self) -> Result<Expr> {
        let Tok::Ident(tag) = self.peek().clone() else {
            return Err(self.error("expected d, l or a after '&'"));
        };
        let close = match (tag.as_str(), self.peek_next()) {
            ("d", Tok::LBrace) => Tok::RBrace,
            ("l", Tok::LBracket) | ("a", Tok::LBracket) => Tok::RBracket,
            ("a", Tok::LParen) => Tok::RParen,
            _ => return Err(self.error(&format!("'&{tag}' is not a composite literal tag"))),
        };
        self.advance();
        self.advance();
        let literal = match (tag.as_str(), &close) {
            ("d", _) => CompositeLiteral::Dict(self.pairs()?),
            ("l", _) => CompositeLiteral::List(self.items(&Tok::RBracket, "']'")?),
            (_, Tok::RParen) => CompositeLiteral::Axis(self.items(&close, "')'")?),
            _ => CompositeLiteral::Axis(self.items(&close, "']'")?),
        };
        Ok(Expr::Composite(literal))
    }

    /// Comma-separated expressions up to `close`; trailing comma allowed.
    fn items(&mut self, close: &Tok, what: &str) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.expr()?);
            if !self.eat(&Tok::Comma) {
                self.expect(close, what)?;
                break;
            }
        }
        Ok(items)
    }

    /// `key: value` pairs up to `}`; trailing comma allowed.
    fn pairs(&mut self) -> Result<Vec<(Expr, Expr)>> {
        let mut pairs = Vec::new();
        while !self.eat(&Tok::RBrace) {
            let key = self.expr()?;
            self.expect(&Tok::Colon, "':' between key and value")?;
            let value = self.expr()?;
            pairs.push((key, value));
            if !self.eat(&Tok::Comma) {
                self.expect(&Tok::RBrace, "'}'")?;
                break;
            }
        }
        Ok(pairs)
    }
}
