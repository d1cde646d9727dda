use crate::ast::{
    BinaryOp, Block, ElseBranch, Expr, ExprKind, ForInit, IfStmt, LetStmt, Program, Stmt, UnaryOp,
};
use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::{SpannedToken, Token};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub expected: Vec<String>,
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: Vec::new(),
            found: None,
        }
    }

    pub fn with_expected(mut self, expected: Vec<String>) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string())
            .with_code("E0101")
            .with_label(Label::primary(self.span, ""));

        if self.expected.len() == 1 {
            diag = diag.with_help(format!("expected {} here", self.expected[0]));
        }

        diag
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected.is_empty() {
            return f.write_str(&self.message);
        }
        write!(f, "expected {}", self.expected.join(" or "))?;
        if let Some(found) = &self.found {
            write!(f, ", found {}", found)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Deepest nesting of statements or expressions the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Recursive-descent parser over a token sequence ending in `Token::Eof`.
/// Stops at the first error.
pub struct TokenParser {
    tokens: Vec<SpannedToken>,
    current: usize,
    depth: usize,
}

impl TokenParser {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if !matches!(tokens.last(), Some(SpannedToken { token: Token::Eof, .. })) {
            let end = tokens.last().map(|st| st.span.end).unwrap_or(0);
            tokens.push(SpannedToken {
                token: Token::Eof,
                span: Span::new(end, end),
            });
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.current].token
    }

    fn current_span(&self) -> Span {
        self.tokens[self.current].span
    }

    fn previous_span(&self) -> Span {
        if self.current > 0 {
            self.tokens[self.current - 1].span
        } else {
            Span::new(0, 0)
        }
    }

    fn check(&self, expected: &Token) -> bool {
        self.current_token().is_same_kind(expected)
    }

    fn advance(&mut self) -> SpannedToken {
        let st = self.tokens[self.current].clone();
        if st.token != Token::Eof {
            self.current += 1;
        }
        st
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        if self.check(&expected) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(expected.to_string()))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::new("unexpected token", self.current_span())
            .with_expected(vec![expected.into()])
            .with_found(self.current_token().to_string())
    }

    /// Goes one level deeper, failing once the tree would exceed
    /// [`MAX_NESTING_DEPTH`]. Callers restore `depth` when they return.
    fn descend(&mut self, what: &str) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                format!("{} nested too deeply", what),
                self.current_span(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn nested<T>(
        &mut self,
        what: &str,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let outer_depth = self.depth;
        self.descend(what)?;
        let result = production(self);
        self.depth = outer_depth;
        result
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.check(&Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        tracing::debug!(count = statements.len(), "parsed program");
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        self.nested("statement", Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> Result<Stmt, ParseError> {
        match self.current_token() {
            Token::Let => {
                let stmt = self.parse_let()?;
                self.eat(&Token::Semicolon);
                Ok(Stmt::Let(stmt))
            }
            Token::Print => self.parse_print_statement(),
            Token::If => Ok(Stmt::If(self.parse_if_statement()?)),
            Token::While => self.parse_while_statement(),
            Token::For => self.parse_for_statement(),
            Token::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => {
                let expr = self.parse_expression()?;
                // The separator may only be left out where nothing can follow.
                if !self.eat(&Token::Semicolon)
                    && !self.check(&Token::RBrace)
                    && !self.check(&Token::Eof)
                {
                    return Err(self.unexpected(Token::Semicolon.to_string()));
                }
                Ok(Stmt::Expr(expr))
            }
        }
    }

    /// `let name = expr`, without the trailing separator.
    fn parse_let(&mut self) -> Result<LetStmt, ParseError> {
        let start = self.advance().span;
        let name: Rc<str> = match self.current_token() {
            Token::Ident(name) => Rc::from(name.as_str()),
            other => {
                return Err(ParseError::new(
                    format!("expected identifier after {}, found {}", Token::Let, other),
                    self.current_span(),
                ))
            }
        };
        self.advance();
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(LetStmt { name, value, span })
    }

    fn parse_print_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(Token::LParen)?;
        let expr = self.parse_expression()?;
        self.expect(Token::RParen)?;
        self.eat(&Token::Semicolon);
        Ok(Stmt::Print(expr))
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && !self.check(&Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        let end = self.expect(Token::RBrace)?;
        Ok(Block {
            statements,
            span: start.merge(end),
        })
    }

    /// Loop bodies may be a single statement; it still gets its own scope.
    fn parse_body(&mut self) -> Result<Block, ParseError> {
        if self.check(&Token::LBrace) {
            return self.parse_block();
        }
        let start = self.current_span();
        let stmt = self.parse_statement()?;
        Ok(Block {
            statements: vec![stmt],
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_if_statement(&mut self) -> Result<IfStmt, ParseError> {
        self.advance();
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let consequence = self.parse_block()?;

        let alternative = if self.eat(&Token::Else) {
            let branch = if self.check(&Token::If) {
                ElseBranch::If(self.nested("statement", Self::parse_if_statement)?)
            } else {
                ElseBranch::Block(self.parse_block()?)
            };
            Some(Box::new(branch))
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            consequence,
            alternative,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let body = self.parse_body()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(Token::LParen)?;

        let initializer = match self.current_token() {
            Token::Semicolon => None,
            Token::Let => Some(ForInit::Let(self.parse_let()?)),
            _ => Some(ForInit::Expr(self.parse_expression()?)),
        };
        self.expect(Token::Semicolon)?;

        let condition = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::Semicolon)?;

        let increment = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::RParen)?;

        let body = self.parse_body()?;
        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested("expression", Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_logical_or()?;

        if !self.check(&Token::Assign) {
            return Ok(target);
        }
        let assign_span = self.advance().span;
        let value = self.parse_expression()?;

        match target.kind {
            ExprKind::Identifier(name) => {
                let span = target.span.merge(value.span);
                Ok(Expr::new(
                    ExprKind::Assignment {
                        name,
                        value: Box::new(value),
                    },
                    span,
                ))
            }
            _ => Err(ParseError::new(
                "invalid assignment target",
                target.span.merge(assign_span),
            )),
        }
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_logical_and, |token| match token {
            Token::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_comparison, |token| match token {
            Token::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_term, |token| match token {
            Token::Eq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::NotEq),
            Token::Less => Some(BinaryOp::Less),
            Token::Greater => Some(BinaryOp::Greater),
            _ => None,
        })
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_factor, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_primary, |token| match token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        })
    }

    /// One left-associative precedence level: `operand (op operand)*`.
    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;
        // each operator deepens the left-leaning tree by one
        let outer_depth = self.depth;
        while let Some(op) = operator(self.current_token()) {
            self.descend("expression")?;
            self.advance();
            let right = operand(self)?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        self.depth = outer_depth;
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let SpannedToken { token, span } = self.tokens[self.current].clone();

        let kind = match token {
            Token::Number(n) => ExprKind::Number(n),
            Token::String(s) => ExprKind::String(Rc::from(s.as_str())),
            Token::True => ExprKind::Bool(true),
            Token::False => ExprKind::Bool(false),
            Token::Ident(name) => ExprKind::Identifier(Rc::from(name.as_str())),
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let end = self.expect(Token::RParen)?;
                return Ok(Expr::new(inner.kind, span.merge(end)));
            }
            Token::Plus => return self.parse_unary(UnaryOp::Plus, span),
            Token::Minus => return self.parse_unary(UnaryOp::Neg, span),
            Token::Bang => return self.parse_unary(UnaryOp::Not, span),
            _ => return Err(self.unexpected("expression")),
        };

        self.advance();
        Ok(Expr::new(kind, span))
    }

    fn parse_unary(&mut self, op: UnaryOp, start: Span) -> Result<Expr, ParseError> {
        self.advance();
        let operand = self.nested("expression", Self::parse_primary)?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }
}
