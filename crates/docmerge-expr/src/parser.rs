use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::functions::lookup_function;
use crate::value::Value;

type ParseResult<T> = Result<T, SyntaxError>;

/// Longest expression accepted, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 8_192;
/// Deepest nesting of parentheses, prefix operators and calls accepted while parsing.
pub const MAX_NESTING: usize = 64;
/// Deepest tree accepted. Evaluation recurses once per level, so this bounds its stack use.
pub const MAX_TREE_DEPTH: usize = 512;

/// Parsed form of an expression. Trees only; cheap to share behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// A `{{name}}` placeholder.
    ColumnRef(String),
    UnaryOp {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Call to a built-in function. `name` is the canonical (lowercase) registry name.
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Concat => "&",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEquals => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEquals => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::Less
                | BinaryOp::LessEquals
                | BinaryOp::Greater
                | BinaryOp::GreaterEquals
        )
    }
}

impl Expr {
    /// Column names referenced through `{{...}}`, in order of first appearance.
    pub fn column_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_column_refs(&mut out);
        out
    }

    /// Number of levels in the tree; a lone literal has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Literal(_) | Expr::ColumnRef(_) => {}
                Expr::UnaryOp { expr, .. } => pending.push((expr, depth + 1)),
                Expr::BinaryOp { left, right, .. } => {
                    pending.push((left, depth + 1));
                    pending.push((right, depth + 1));
                }
                Expr::Call { args, .. } => pending.extend(args.iter().map(|arg| (arg, depth + 1))),
            }
        }
        deepest
    }

    fn collect_column_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::ColumnRef(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::UnaryOp { expr, .. } => expr.collect_column_refs(out),
            Expr::BinaryOp { left, right, .. } => {
                left.collect_column_refs(out);
                right.collect_column_refs(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_column_refs(out);
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Identifier(String),
    Placeholder(String),
    Number(f64),
    String(String),
    True,
    False,
    Comma,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Ampersand,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    AndAnd,
    OrOr,
    Not,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("identifier `{name}`"),
            Token::Placeholder(name) => format!("placeholder `{{{{{name}}}}}`"),
            Token::Number(n) => format!("number {n}"),
            Token::String(s) => format!("string {s:?}"),
            Token::True => "`true`".to_string(),
            Token::False => "`false`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Plus => "`+`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Star => "`*`".to_string(),
            Token::Slash => "`/`".to_string(),
            Token::Ampersand => "`&`".to_string(),
            Token::Equals => "`==`".to_string(),
            Token::NotEquals => "`!=`".to_string(),
            Token::Less => "`<`".to_string(),
            Token::LessEquals => "`<=`".to_string(),
            Token::Greater => "`>`".to_string(),
            Token::GreaterEquals => "`>=`".to_string(),
            Token::AndAnd => "`&&`".to_string(),
            Token::OrOr => "`||`".to_string(),
            Token::Not => "`!`".to_string(),
            Token::Eof => "end of expression".to_string(),
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: std::str::CharIndices<'a>,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let mut chars = input.char_indices();
        let peeked = chars.next();
        Self {
            input,
            chars,
            peeked,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let current = self.peeked.take().map(|(_, c)| c);
        self.peeked = self.chars.next();
        current
    }

    fn peek(&self) -> Option<char> {
        self.peeked.map(|(_, c)| c)
    }

    /// Byte offset of the next unread character.
    fn offset(&self) -> usize {
        self.peeked.map_or(self.input.len(), |(idx, _)| idx)
    }

    fn consume_while<F>(&mut self, mut predicate: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut buf = String::new();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            buf.push(ch);
            self.bump();
        }
        buf
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Consume `second` if it is next, returning `matched` or `single` accordingly.
    fn one_or_two(&mut self, second: char, matched: Token, single: Token) -> Token {
        self.bump();
        if self.peek() == Some(second) {
            self.bump();
            matched
        } else {
            single
        }
    }

    fn next_token(&mut self) -> ParseResult<(Token, usize)> {
        self.skip_whitespace();
        let start = self.offset();
        let Some(ch) = self.peek() else {
            return Ok((Token::Eof, start));
        };

        let token = match ch {
            '(' => {
                self.bump();
                Token::LParen
            }
            ')' => {
                self.bump();
                Token::RParen
            }
            ',' => {
                self.bump();
                Token::Comma
            }
            '+' => {
                self.bump();
                Token::Plus
            }
            '-' => {
                self.bump();
                Token::Minus
            }
            '*' => {
                self.bump();
                Token::Star
            }
            '/' => {
                self.bump();
                Token::Slash
            }
            // `=` is accepted as a spreadsheet-style spelling of `==`.
            '=' => self.one_or_two('=', Token::Equals, Token::Equals),
            '!' => self.one_or_two('=', Token::NotEquals, Token::Not),
            '>' => self.one_or_two('=', Token::GreaterEquals, Token::Greater),
            '<' => {
                self.bump();
                match self.peek() {
                    Some('=') => {
                        self.bump();
                        Token::LessEquals
                    }
                    Some('>') => {
                        self.bump();
                        Token::NotEquals
                    }
                    _ => Token::Less,
                }
            }
            '&' => self.one_or_two('&', Token::AndAnd, Token::Ampersand),
            '|' => {
                self.bump();
                if self.peek() != Some('|') {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedCharacter,
                        start,
                        "unexpected character '|' (did you mean `||`?)",
                    ));
                }
                self.bump();
                Token::OrOr
            }
            '"' | '\'' => self.lex_string(ch, start)?,
            '{' => self.lex_placeholder(start)?,
            c if c.is_ascii_digit() || c == '.' => self.lex_number(start)?,
            c if is_ident_start(c) => {
                let ident = self.consume_while(is_ident_part);
                keyword(&ident).unwrap_or(Token::Identifier(ident))
            }
            other => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnexpectedCharacter,
                    start,
                    format!("unexpected character {other:?}"),
                ))
            }
        };
        Ok((token, start))
    }

    fn lex_string(&mut self, quote: char, start: usize) -> ParseResult<Token> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnterminatedString,
                        start,
                        "unterminated string literal",
                    ))
                }
                Some(c) if c == quote => break,
                Some('\\') => {
                    let escape_offset = self.offset();
                    match self.bump() {
                        Some('\\') => out.push('\\'),
                        Some('"') => out.push('"'),
                        Some('\'') => out.push('\''),
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some(other) => {
                            return Err(SyntaxError::new(
                                SyntaxErrorKind::InvalidEscape,
                                escape_offset,
                                format!("invalid escape sequence \\{other}"),
                            ))
                        }
                        None => {
                            return Err(SyntaxError::new(
                                SyntaxErrorKind::UnterminatedString,
                                start,
                                "unterminated string literal",
                            ))
                        }
                    }
                }
                Some(c) => out.push(c),
            }
        }
        Ok(Token::String(out))
    }

    fn lex_placeholder(&mut self, start: usize) -> ParseResult<Token> {
        self.bump();
        if self.peek() != Some('{') {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedCharacter,
                start,
                "unexpected character '{' (placeholders are written `{{name}}`)",
            ));
        }
        self.bump();

        let name = self.consume_while(|c| c != '}');
        if self.bump() != Some('}') || self.bump() != Some('}') {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnterminatedPlaceholder,
                start,
                "placeholder is missing its closing `}}`",
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::EmptyPlaceholder,
                start,
                "placeholder `{{}}` has no column name",
            ));
        }
        Ok(Token::Placeholder(name.to_string()))
    }

    fn lex_number(&mut self, start: usize) -> ParseResult<Token> {
        let mut num_str = self.consume_while(|c| c.is_ascii_digit() || c == '.');
        let invalid = |num_str: &str| {
            SyntaxError::new(
                SyntaxErrorKind::InvalidNumber,
                start,
                format!("invalid number {num_str:?}"),
            )
        };

        // Exponent notation like `1e3` / `1E-3`.
        if matches!(self.peek(), Some('e' | 'E')) {
            if let Some(exp) = self.bump() {
                num_str.push(exp);
            }
            if matches!(self.peek(), Some('+' | '-')) {
                if let Some(sign) = self.bump() {
                    num_str.push(sign);
                }
            }
            let exp_digits = self.consume_while(|c| c.is_ascii_digit());
            if exp_digits.is_empty() {
                return Err(invalid(&num_str));
            }
            num_str.push_str(&exp_digits);
        }

        let num: f64 = num_str.parse().map_err(|_| invalid(&num_str))?;
        if !num.is_finite() {
            return Err(invalid(&num_str));
        }
        Ok(Token::Number(num))
    }
}

fn keyword(ident: &str) -> Option<Token> {
    match ident.to_ascii_lowercase().as_str() {
        "true" => Some(Token::True),
        "false" => Some(Token::False),
        "and" => Some(Token::AndAnd),
        "or" => Some(Token::OrOr),
        "not" => Some(Token::Not),
        _ => None,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
    lookahead_offset: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> ParseResult<Self> {
        let mut lexer = Lexer::new(input);
        let (lookahead, lookahead_offset) = lexer.next_token()?;
        Ok(Self {
            lexer,
            lookahead,
            lookahead_offset,
            nesting: 0,
        })
    }

    /// Step into a parenthesis, prefix operator or call opened at `offset`.
    fn enter(&mut self, offset: usize) -> ParseResult<()> {
        if self.nesting >= MAX_NESTING {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep,
                offset,
                format!("expression nests more than {MAX_NESTING} levels deep"),
            ));
        }
        self.nesting += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn bump(&mut self) -> ParseResult<Token> {
        let (next, next_offset) = self.lexer.next_token()?;
        self.lookahead_offset = next_offset;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn unexpected(&self) -> SyntaxError {
        if self.lookahead == Token::Eof {
            SyntaxError::new(
                SyntaxErrorKind::UnexpectedEnd,
                self.lookahead_offset,
                "expression ended unexpectedly",
            )
        } else {
            SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken,
                self.lookahead_offset,
                format!("unexpected {}", self.lookahead.describe()),
            )
        }
    }

    /// Consume the `)` matching the `(` at `open_offset`.
    fn expect_close_paren(&mut self, open_offset: usize) -> ParseResult<()> {
        match self.lookahead {
            Token::RParen => {
                self.bump()?;
                Ok(())
            }
            Token::Eof => Err(SyntaxError::new(
                SyntaxErrorKind::UnmatchedParen,
                open_offset,
                "`(` is never closed",
            )),
            _ => Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken,
                self.lookahead_offset,
                format!("expected `)`, found {}", self.lookahead.describe()),
            )),
        }
    }

    fn parse(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_expr(0)?;
        match self.lookahead {
            Token::Eof if expr.depth() > MAX_TREE_DEPTH => Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep,
                0,
                format!("expression tree is more than {MAX_TREE_DEPTH} levels deep"),
            )),
            Token::Eof => Ok(expr),
            Token::RParen => Err(SyntaxError::new(
                SyntaxErrorKind::UnmatchedParen,
                self.lookahead_offset,
                "`)` has no matching `(`",
            )),
            _ => Err(SyntaxError::new(
                SyntaxErrorKind::TrailingInput,
                self.lookahead_offset,
                format!(
                    "unexpected {} after a complete expression",
                    self.lookahead.describe()
                ),
            )),
        }
    }

    fn parse_expr(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;
        while let Some((op, prec)) = self.infix_binding_power() {
            if prec < min_prec {
                break;
            }
            self.bump()?;
            let right = self.parse_expr(prec + 1)?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        match &self.lookahead {
            Token::Minus => self.parse_unary(UnaryOp::Negate),
            Token::Not => self.parse_unary(UnaryOp::Not),
            Token::Number(n) => {
                let n = *n;
                self.bump()?;
                Ok(Expr::Literal(Value::Number(n)))
            }
            Token::String(s) => {
                let s = s.clone();
                self.bump()?;
                Ok(Expr::Literal(Value::Text(s)))
            }
            Token::True => {
                self.bump()?;
                Ok(Expr::Literal(Value::Boolean(true)))
            }
            Token::False => {
                self.bump()?;
                Ok(Expr::Literal(Value::Boolean(false)))
            }
            Token::Placeholder(name) => {
                let name = name.clone();
                self.bump()?;
                Ok(Expr::ColumnRef(name))
            }
            Token::Identifier(_) => self.parse_call(),
            Token::LParen => {
                let open_offset = self.lookahead_offset;
                self.enter(open_offset)?;
                self.bump()?;
                let inner = self.parse_expr(0)?;
                self.expect_close_paren(open_offset)?;
                self.leave();
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_unary(&mut self, op: UnaryOp) -> ParseResult<Expr> {
        self.enter(self.lookahead_offset)?;
        self.bump()?;
        // Prefix operators bind tighter than every infix operator.
        let expr = self.parse_expr(7)?;
        self.leave();
        Ok(Expr::UnaryOp {
            op,
            expr: Box::new(expr),
        })
    }

    fn parse_call(&mut self) -> ParseResult<Expr> {
        let ident_offset = self.lookahead_offset;
        let ident = match self.bump()? {
            Token::Identifier(ident) => ident,
            other => {
                debug_assert!(false, "parse_call called with lookahead={other:?}");
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnexpectedToken,
                    ident_offset,
                    "expected a function name",
                ));
            }
        };

        if self.lookahead != Token::LParen {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnknownIdentifier,
                ident_offset,
                format!("unknown identifier `{ident}` (column references are written `{{{{{ident}}}}}`)"),
            ));
        }

        let Some(spec) = lookup_function(&ident) else {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnknownFunction,
                ident_offset,
                format!("unknown function `{ident}`"),
            ));
        };

        let open_offset = self.lookahead_offset;
        self.bump()?;
        if self.lookahead == Token::RParen {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MissingArguments,
                ident_offset,
                format!("{}() needs at least one argument", spec.name),
            ));
        }

        self.enter(ident_offset)?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_expr(0)?);
            if self.lookahead == Token::Comma {
                self.bump()?;
                continue;
            }
            break;
        }
        self.expect_close_paren(open_offset)?;
        self.leave();

        Ok(Expr::Call {
            name: spec.name.to_string(),
            args,
        })
    }

    fn infix_binding_power(&self) -> Option<(BinaryOp, u8)> {
        // Higher binds tighter:
        //   * /  >  + - &  >  comparisons  >  &&  >  ||
        match self.lookahead {
            Token::OrOr => Some((BinaryOp::Or, 1)),
            Token::AndAnd => Some((BinaryOp::And, 2)),
            Token::Equals => Some((BinaryOp::Equals, 3)),
            Token::NotEquals => Some((BinaryOp::NotEquals, 3)),
            Token::Less => Some((BinaryOp::Less, 3)),
            Token::LessEquals => Some((BinaryOp::LessEquals, 3)),
            Token::Greater => Some((BinaryOp::Greater, 3)),
            Token::GreaterEquals => Some((BinaryOp::GreaterEquals, 3)),
            Token::Ampersand => Some((BinaryOp::Concat, 4)),
            Token::Plus => Some((BinaryOp::Add, 5)),
            Token::Minus => Some((BinaryOp::Subtract, 5)),
            Token::Star => Some((BinaryOp::Multiply, 6)),
            Token::Slash => Some((BinaryOp::Divide, 6)),
            _ => None,
        }
    }
}

/// Parse an expression string into an [`Expr`].
///
/// Function names are resolved against the built-in registry here, so an unknown function is a
/// [`SyntaxError`] rather than an evaluation failure.
/// Expressions longer than [`MAX_EXPRESSION_LEN`] or nested deeper than [`MAX_NESTING`] /
/// [`MAX_TREE_DEPTH`] are rejected before they can exhaust the stack.
pub fn parse(input: &str) -> Result<Expr, SyntaxError> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(SyntaxError::new(
            SyntaxErrorKind::ExpressionTooLong,
            MAX_EXPRESSION_LEN,
            format!(
                "expression is {} bytes long; the limit is {MAX_EXPRESSION_LEN}",
                input.len()
            ),
        ));
    }
    Parser::new(input)?.parse()
}

/// Every `{{name}}` placeholder in `text`, in order of appearance (duplicates included).
///
/// This is a plain text scan: it does not require `text` to be a valid expression, so it also
/// works on template bodies and file-name patterns.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        let inner = &after_open[..close];
        if inner.contains('}') {
            // `{{a}b}}` is not a placeholder; resume just past the opening braces.
            rest = after_open;
            continue;
        }
        let name = inner.trim();
        if !name.is_empty() {
            out.push(name.to_string());
        }
        rest = &after_open[close + 2..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Expr {
        Expr::Literal(Value::Number(n))
    }

    fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse("1+2*3").unwrap(),
            bin(BinaryOp::Add, num(1.0), bin(BinaryOp::Multiply, num(2.0), num(3.0)))
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(
            parse("8-4-2").unwrap(),
            bin(BinaryOp::Subtract, bin(BinaryOp::Subtract, num(8.0), num(4.0)), num(2.0))
        );
    }

    #[test]
    fn unary_minus_binds_tightest() {
        assert_eq!(
            parse("-2*3").unwrap(),
            bin(
                BinaryOp::Multiply,
                Expr::UnaryOp {
                    op: UnaryOp::Negate,
                    expr: Box::new(num(2.0)),
                },
                num(3.0)
            )
        );
    }

    #[test]
    fn placeholder_names_are_trimmed() {
        assert_eq!(
            parse("{{ 客户 名称 }}").unwrap(),
            Expr::ColumnRef("客户 名称".to_string())
        );
    }

    #[test]
    fn keyword_spellings_match_symbolic_operators() {
        assert_eq!(parse("true and not false").unwrap(), parse("true && !false").unwrap());
        assert_eq!(parse("1 = 1 or 1 <> 2").unwrap(), parse("1 == 1 || 1 != 2").unwrap());
    }

    #[test]
    fn function_names_are_canonicalized() {
        let Expr::Call { name, args } = parse("CONCAT('a', \"b\")").unwrap() else {
            panic!("expected a call");
        };
        assert_eq!(name, "concat");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            parse(r#""say \"hi\"\n""#).unwrap(),
            Expr::Literal(Value::from("say \"hi\"\n"))
        );
        let err = parse(r#""\q""#).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidEscape);
    }

    #[test]
    fn error_offsets_point_at_the_problem() {
        let err = parse("1 + foo(2)").unwrap_err();
        assert_eq!((err.kind, err.offset), (SyntaxErrorKind::UnknownFunction, 4));

        let err = parse("(1 + 2").unwrap_err();
        assert_eq!((err.kind, err.offset), (SyntaxErrorKind::UnmatchedParen, 0));

        let err = parse("1 + 2)").unwrap_err();
        assert_eq!((err.kind, err.offset), (SyntaxErrorKind::UnmatchedParen, 5));

        let err = parse("1 2").unwrap_err();
        assert_eq!((err.kind, err.offset), (SyntaxErrorKind::TrailingInput, 2));
    }

    #[test]
    fn column_refs_are_deduplicated_in_order() {
        let expr = parse("{{b}} + {{a}} * {{b}}").unwrap();
        assert_eq!(expr.column_refs(), vec!["b", "a"]);
    }

    #[test]
    fn extracts_placeholders_from_free_text() {
        assert_eq!(
            extract_placeholders("Dear {{name}}, you owe {{ amount }}. {{}} {{a}b}} {{x"),
            vec!["name".to_string(), "amount".to_string()]
        );
    }
}
