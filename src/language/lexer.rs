use crate::language::{
    span::Span,
    token::{Token, TokenKind},
};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit0, digit1},
    combinator::{opt, recognize, rest},
    sequence::{pair, tuple},
};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Error)]
#[error("Unrecognized character {character:?} found in source")]
pub struct LexError {
    pub character: char,
    pub span: Span,
}

/// Converts source text into tokens, ending with an `Eof` sentinel.
///
/// Compound assignments (`x *= 2`, `x += 1`) and increments (`x++`, `x--`)
/// never reach the parser as such: they are rewritten into plain
/// assignments (`x = x * 2`, `x = x + 1`) while lexing. A prefix `-` that
/// is not part of a literal becomes `0 -`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<LexError>> {
    let result = Lexer::new(source).run();
    match &result {
        Ok(tokens) => debug!(tokens = tokens.len(), "lexed source"),
        Err(errors) => debug!(errors = errors.len(), "lexing failed"),
    }
    result
}

/// Returns the trailing run of `tokens` that forms an assignment target.
///
/// The grammar is `Identifier ( "." Identifier | "[" (Number | Identifier) "]" )*`,
/// matched right to left. Returns `None` when the tokens do not end in
/// such a path.
pub fn assignable_path(tokens: &[Token]) -> Option<&[Token]> {
    let mut cursor = tokens.len();
    loop {
        let last = tokens.get(cursor.checked_sub(1)?)?;
        match last.kind {
            TokenKind::CloseBracket => {
                let index = tokens.get(cursor.checked_sub(2)?)?;
                let open = tokens.get(cursor.checked_sub(3)?)?;
                let valid_index = matches!(index.kind, TokenKind::Number | TokenKind::Identifier);
                if !valid_index || open.kind != TokenKind::OpenBracket {
                    return None;
                }
                cursor -= 3;
            }
            TokenKind::Identifier => {
                if cursor >= 2 && tokens[cursor - 2].kind == TokenKind::Dot {
                    cursor -= 2;
                } else {
                    return Some(&tokens[cursor - 1..]);
                }
            }
            _ => return None,
        }
    }
}

fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit0))))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(char::is_alphabetic)(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(tag("//"), take_while(|ch| ch != '\n'))),
        recognize(tuple((tag("/*"), take_until("*/"), tag("*/")))),
        recognize(pair(tag("/*"), rest)),
    ))(input)
}

struct Lexer<'a> {
    src: &'a str,
    offset: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, Vec<LexError>> {
        while let Some(ch) = self.current() {
            match ch {
                ' ' | '\n' | '\t' | '\r' => {
                    self.bump();
                }
                '/' if matches!(self.peek(), Some('/') | Some('*')) => self.skip_comment(),
                ch if ch.is_ascii_digit() => self.lex_number(),
                '-' if self.peek().is_some_and(|next| next.is_ascii_digit())
                    && !self.follows_operand() =>
                {
                    self.lex_number()
                }
                '"' | '\'' => self.lex_string(ch),
                ch if ch.is_alphabetic() => self.lex_word(),
                '+' | '-' | '*' | '/' => self.lex_arithmetic(ch),
                '%' => self.single(TokenKind::BinaryOperator),
                _ => self.lex_symbol(),
            }
        }
        let end = self.offset;
        self.push(Token::new("EndOfFile", TokenKind::Eof, Span::new(end, end)));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.offset += ch.len_utf8();
        Some(ch)
    }

    fn advance_to(&mut self, remaining: &str) {
        self.offset = self.src.len() - remaining.len();
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn follows_operand(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|token| token.kind.ends_operand())
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.offset;
        if let Some(ch) = self.bump() {
            self.push(Token::new(ch.to_string(), kind, Span::new(start, self.offset)));
        }
    }

    fn pair_or_single(&mut self, second: char, paired: TokenKind, single: TokenKind) {
        let start = self.offset;
        let Some(first) = self.bump() else {
            return;
        };
        if self.current() == Some(second) {
            self.bump();
            let text = format!("{first}{second}");
            self.push(Token::new(text, paired, Span::new(start, self.offset)));
        } else {
            self.push(Token::new(first.to_string(), single, Span::new(start, self.offset)));
        }
    }

    fn skip_comment(&mut self) {
        match comment(self.rest()) {
            Ok((remaining, _)) => self.advance_to(remaining),
            Err(_) => {
                self.bump();
            }
        }
    }

    fn lex_number(&mut self) {
        let start = self.offset;
        if self.current() == Some('-') {
            self.bump();
        }
        match number_literal(self.rest()) {
            Ok((remaining, _)) => self.advance_to(remaining),
            Err(_) => {
                self.bump();
            }
        }
        let text = &self.src[start..self.offset];
        self.push(Token::new(text, TokenKind::Number, Span::new(start, self.offset)));
    }

    fn lex_word(&mut self) {
        let start = self.offset;
        let Ok((remaining, text)) = word(self.rest()) else {
            self.bump();
            return;
        };
        self.advance_to(remaining);
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.push(Token::new(text, kind, Span::new(start, self.offset)));
    }

    fn lex_string(&mut self, quote: char) {
        let start = self.offset;
        self.bump();
        let raw_start = self.offset;
        let mut raw_end = None;
        let mut value = String::new();

        while let Some(ch) = self.bump() {
            match ch {
                ch if ch == quote => {
                    raw_end = Some(self.offset - ch.len_utf8());
                    break;
                }
                '\\' => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(escaped) if escaped == quote || escaped == '\\' => value.push(escaped),
                    Some(escaped) => {
                        value.push('\\');
                        value.push(escaped);
                    }
                    None => break,
                },
                ch => value.push(ch),
            }
        }

        let raw = &self.src[raw_start..raw_end.unwrap_or(self.offset)];
        let token = Token::new(value, TokenKind::String, Span::new(start, self.offset)).with_raw(raw);
        self.push(token);
    }

    fn lex_arithmetic(&mut self, op: char) {
        let start = self.offset;
        let next = self.peek();

        if op == '-' && next == Some('>') {
            self.bump();
            self.bump();
            self.push(Token::new("->", TokenKind::Arrow, Span::new(start, self.offset)));
            return;
        }

        let doubled = matches!(op, '+' | '-') && next == Some(op);
        if doubled || next == Some('=') {
            if let Some(path) = assignable_path(&self.tokens).map(<[Token]>::to_vec) {
                self.bump();
                self.bump();
                let span = Span::new(start, self.offset);
                self.emit_compound(path, op, span);
                if doubled {
                    self.push(Token::new("1", TokenKind::Number, span));
                }
                return;
            }
        }

        if op == '-' && !doubled && !self.follows_operand() {
            self.bump();
            let span = Span::new(start, self.offset);
            trace!(offset = start, "rewriting prefix minus as subtraction from zero");
            self.push(Token::new("0", TokenKind::Number, span));
            self.push(Token::new("-", TokenKind::BinaryOperator, span));
            return;
        }

        self.single(TokenKind::BinaryOperator);
    }

    fn emit_compound(&mut self, path: Vec<Token>, op: char, span: Span) {
        trace!(
            target_len = path.len(),
            operator = %op,
            offset = span.start,
            "desugaring compound assignment"
        );
        self.push(Token::new("=", TokenKind::Equals, span));
        self.tokens.extend(path);
        self.push(Token::new(op.to_string(), TokenKind::BinaryOperator, span));
    }

    fn lex_symbol(&mut self) {
        let start = self.offset;
        match self.current() {
            Some('(') => self.single(TokenKind::OpenParen),
            Some(')') => self.single(TokenKind::CloseParen),
            Some('{') => self.single(TokenKind::OpenBrace),
            Some('}') => self.single(TokenKind::CloseBrace),
            Some('[') => self.single(TokenKind::OpenBracket),
            Some(']') => self.single(TokenKind::CloseBracket),
            Some(',') => self.single(TokenKind::Comma),
            Some('.') => self.single(TokenKind::Dot),
            Some(':') => self.single(TokenKind::Colon),
            Some(';') => self.single(TokenKind::Semicolon),
            Some('|') => self.single(TokenKind::Bar),
            Some('=') => self.pair_or_single('=', TokenKind::EqualsCompare, TokenKind::Equals),
            Some('!') => {
                self.pair_or_single('=', TokenKind::NotEqualsCompare, TokenKind::Exclamation)
            }
            Some('&') => self.pair_or_single('&', TokenKind::And, TokenKind::Ampersand),
            Some('<') => self.pair_or_single('=', TokenKind::LesserEquals, TokenKind::Lesser),
            Some('>') => self.pair_or_single('=', TokenKind::GreaterEquals, TokenKind::Greater),
            Some(ch) => {
                self.bump();
                self.errors.push(LexError {
                    character: ch,
                    span: Span::new(start, self.offset),
                });
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests;
