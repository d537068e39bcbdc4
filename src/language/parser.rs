use crate::language::{
    ast::*,
    errors::{SyntaxError, SyntaxErrors},
    lexer::tokenize,
    span::Span,
    token::{Token, TokenKind},
};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;
use tracing::debug;

pub fn parse_program(source: &str) -> Result<Program, SyntaxErrors> {
    let tokens = tokenize(source).map_err(SyntaxErrors::from)?;
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |token| token.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |token| token.span.end);
            tokens.push(Token::new("EndOfFile", TokenKind::Eof, Span::new(end, end)));
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Program, SyntaxErrors> {
        let mut body = Vec::new();

        while !self.is_eof() {
            if self.matches(TokenKind::Semicolon) {
                continue;
            }
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            debug!(statements = body.len(), "parsed program");
            Ok(Program { body })
        } else {
            debug!(errors = self.errors.len(), "parsing failed");
            Err(SyntaxErrors::new(self.errors))
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let stmt = match self.current().kind {
            TokenKind::Let | TokenKind::Const => self.parse_var_declaration()?,
            TokenKind::Func => self.parse_func_declaration()?,
            kind @ (TokenKind::If | TokenKind::Else | TokenKind::For) => {
                return Err(self
                    .error_here(format!("{kind} is reserved but not supported"))
                    .with_label("reserved keyword")
                    .with_help("the language has no conditionals or loops yet"));
            }
            _ => Stmt::Expr(self.parse_expression()?),
        };
        self.consume_optional(TokenKind::Semicolon);
        Ok(stmt)
    }

    fn parse_var_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();
        let constant = keyword.kind == TokenKind::Const;
        let identifier = self.expect_identifier("Expected variable name")?;

        let value = if self.matches(TokenKind::Equals) {
            Some(self.parse_expression()?)
        } else if constant {
            return Err(SyntaxError::new(
                format!("Constant `{identifier}` must be initialized"),
                keyword.span.to(self.previous_span()),
            )
            .with_label("missing value")
            .with_help(format!("write `const {identifier} = <value>`")));
        } else {
            None
        };

        Ok(Stmt::VarDeclaration(VarDeclaration {
            constant,
            identifier,
            value,
        }))
    }

    fn parse_func_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(TokenKind::Func)?;
        let name = self.expect_identifier("Expected function name")?;
        self.expect(TokenKind::OpenParen)?;

        let mut parameters = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                parameters.push(self.expect_identifier("Expected parameter name")?);
                if self.matches(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::CloseParen)?;
        self.expect(TokenKind::OpenBrace)?;

        let mut body = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.is_eof() {
            if self.matches(TokenKind::Semicolon) {
                continue;
            }
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(Stmt::FuncDeclaration(Rc::new(FuncDeclaration {
            name,
            parameters,
            body,
        })))
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_object()?;
        if self.matches(TokenKind::Equals) {
            let value = self.parse_assignment()?;
            return Ok(Expr::Assignment(AssignmentExpr {
                assignee: Box::new(left),
                value: Box::new(value),
            }));
        }
        Ok(left)
    }

    fn parse_object(&mut self) -> Result<Expr, SyntaxError> {
        if !self.matches(TokenKind::OpenBrace) {
            return self.parse_comparison();
        }

        let mut properties = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.is_eof() {
            let key = self.expect_identifier("Expected property name in object literal")?;

            if self.matches(TokenKind::Comma) || self.check(TokenKind::CloseBrace) {
                properties.push(Property { key, value: None });
                continue;
            }

            if !self.matches(TokenKind::Colon) {
                return Err(self
                    .error_here(format!("Expected `:` after property `{key}`"))
                    .with_help("write `key: value`, or `key` alone to copy a variable"));
            }
            let value = self.parse_expression()?;
            properties.push(Property {
                key,
                value: Some(value),
            });

            if !self.check(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma)?;
            }
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(Expr::Object(ObjectLiteral { properties }))
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.comparison_operator() {
            self.advance();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.arithmetic_operator(&["+", "-"]) {
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_postfix()?;
        while let Some(op) = self.arithmetic_operator(&["*", "/", "%"]) {
            self.advance();
            let right = self.parse_postfix()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(TokenKind::Dot) {
                let property = self.expect_identifier("Expected property name after `.`")?;
                expr = Expr::Member(MemberExpr {
                    object: Box::new(expr),
                    property: Box::new(Expr::identifier(property)),
                    computed: false,
                });
            } else if self.matches(TokenKind::OpenBracket) {
                let property = self.parse_expression()?;
                self.expect(TokenKind::CloseBracket)?;
                expr = Expr::Member(MemberExpr {
                    object: Box::new(expr),
                    property: Box::new(property),
                    computed: true,
                });
            } else if self.matches(TokenKind::OpenParen) {
                let arguments = self.parse_arguments()?;
                expr = Expr::Call(CallExpr {
                    callee: Box::new(expr),
                    arguments,
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut arguments = Vec::new();
        while !self.check(TokenKind::CloseParen) && !self.is_eof() {
            arguments.push(self.parse_expression()?);
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Identifier => Ok(Expr::identifier(token.value)),
            TokenKind::Number => token.value.parse::<f64>().map(Expr::NumericLiteral).map_err(|_| {
                SyntaxError::new(format!("Invalid number literal `{}`", token.value), token.span)
            }),
            TokenKind::String => Ok(Expr::StringLiteral(token.value)),
            TokenKind::OpenParen => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(expr)
            }
            TokenKind::OpenBracket => {
                let mut elements = Vec::new();
                while !self.check(TokenKind::CloseBracket) && !self.is_eof() {
                    elements.push(self.parse_expression()?);
                    if !self.matches(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::CloseBracket)?;
                Ok(Expr::Array(ArrayLiteral { elements }))
            }
            TokenKind::Eof => Err(SyntaxError::new("Unexpected end of file", token.span)
                .with_label("expression expected here")),
            kind => Err(SyntaxError::new(format!("Unexpected {kind}"), token.span)
                .with_label("expression expected here")),
        }
    }

    fn comparison_operator(&self) -> Option<BinaryOp> {
        let token = self.current();
        match token.kind {
            TokenKind::EqualsCompare
            | TokenKind::NotEqualsCompare
            | TokenKind::Greater
            | TokenKind::GreaterEquals
            | TokenKind::Lesser
            | TokenKind::LesserEquals => BinaryOp::from_symbol(&token.value),
            _ => None,
        }
    }

    fn arithmetic_operator(&self, symbols: &[&str]) -> Option<BinaryOp> {
        let token = self.current();
        if token.kind == TokenKind::BinaryOperator && symbols.contains(&token.value.as_str()) {
            BinaryOp::from_symbol(&token.value)
        } else {
            None
        }
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map_or_else(|| self.current().span, |token| token.span)
    }

    fn is_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_optional(&mut self, kind: TokenKind) {
        self.matches(kind);
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.current().kind;
            Err(self
                .error_here(format!("Expected {kind}, found {found}"))
                .with_label(format!("expected {kind}")))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<String, SyntaxError> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().value)
        } else {
            let found = self.current().kind;
            Err(self
                .error_here(message)
                .with_label(format!("found {found}")))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.current().span)
    }

    fn report(&mut self, err: SyntaxError) {
        self.errors.push(err);
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_eof() {
            if self.matches(TokenKind::Semicolon) {
                return;
            }
            if matches!(
                self.current().kind,
                TokenKind::Let | TokenKind::Const | TokenKind::Func
            ) {
                return;
            }
            self.advance();
        }
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}
