//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct: the token cursor, the
//! speculative-parse protocol, the syntax error type and the top-level
//! [`Parser::parse_comp_unit`] entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with one method per grammar
//! nonterminal, organised as:
//! - This module: cursor helpers, backtracking, `CompUnit`
//! - `declarations`: constant/variable declarations and function definitions
//! - `statements`: blocks and statements
//! - `expressions`: the precedence levels from `LOrExp` down to `PrimaryExp`
//!
//! # Backtracking
//!
//! A routine either returns a node, reports [`SyntaxError`] once it has
//! committed to its production, or (for the few routines that may be absent)
//! returns `Ok(None)` without consuming anything. Call sites that want to
//! *try* a production go through [`Parser::speculate`], which snapshots the
//! cursor and restores it unless the attempt matched. Everything else lets
//! the error propagate.
//!
//! # Nesting
//!
//! Statements, blocks, expressions and initializers recurse into themselves.
//! Each of those routines runs through [`Parser::nested`], and input nested
//! more than [`MAX_NESTING`] levels deep is a syntax error.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use thiserror::Error;
use tracing::{debug, trace};

/// Result alias for committed grammar routines
pub type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest allowed nesting of statements, blocks, expressions and
/// initializers, counted together
pub const MAX_NESTING: usize = 64;

/// Parser error type
///
/// `position` is the index of the offending token in the input sequence (the
/// sequence length when input ran out).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Syntax error at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        position: usize,
    },

    #[error("Syntax error: unexpected end of input, expected {expected}")]
    UnexpectedEof {
        expected: String,
        line: usize,
        position: usize,
    },
}

impl SyntaxError {
    pub fn position(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::UnexpectedEof { position, .. } => *position,
        }
    }

    /// Line of the offending token, or of the last token at end of input
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { line, .. }
            | SyntaxError::UnexpectedEof { line, .. } => *line,
        }
    }

    pub fn expected(&self) -> &str {
        match self {
            SyntaxError::UnexpectedToken { expected, .. }
            | SyntaxError::UnexpectedEof { expected, .. } => expected,
        }
    }
}

/// Outcome of a speculative parse
#[derive(Debug)]
pub enum Attempt<T> {
    Matched(T),
    /// The production does not start here; nothing was consumed
    Absent,
    /// The production started but was malformed; the cursor was restored
    Rejected(SyntaxError),
}

impl<T> Attempt<T> {
    pub fn matched(self) -> Option<T> {
        match self {
            Attempt::Matched(value) => Some(value),
            Attempt::Absent | Attempt::Rejected(_) => None,
        }
    }
}

/// Recursive descent parser over a fully materialized token sequence
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    depth: usize,
    deepest_rejection: Option<SyntaxError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            deepest_rejection: None,
        }
    }

    /// Tokenize `source` and build a parser over the result
    pub fn from_source(source: &str) -> Result<Self, LexError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::new(tokens))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The swallowed failure that got furthest into the input.
    ///
    /// Speculative call sites discard their errors, so the fatal error that
    /// finally surfaces can sit well before the real mistake. This keeps the
    /// furthest discarded one around for diagnostics.
    pub fn deepest_rejection(&self) -> Option<&SyntaxError> {
        self.deepest_rejection.as_ref()
    }

    /// CompUnit: `{Decl} {FuncDef} MainFuncDef`, consuming all input
    pub fn parse_comp_unit(&mut self) -> ParseResult<CompUnit> {
        let line = self.current_line();

        let mut decls = Vec::new();
        while let Attempt::Matched(decl) =
            self.speculate("Decl", Self::parse_decl)
        {
            decls.push(decl);
        }
        debug!(
            count = decls.len(),
            position = self.position,
            "global declarations parsed"
        );

        let mut func_defs = Vec::new();
        while let Attempt::Matched(func_def) =
            self.speculate("FuncDef", Self::parse_func_def)
        {
            func_defs.push(func_def);
        }
        debug!(
            count = func_defs.len(),
            position = self.position,
            "function definitions parsed"
        );

        let main_func_def = self.parse_main_func_def()?;

        if let Some(token) = self.tokens.get(self.position) {
            return Err(SyntaxError::UnexpectedToken {
                expected: "end of input".to_string(),
                found: token.to_string(),
                line: token.line(),
                position: self.position,
            });
        }

        debug!(tokens = self.tokens.len(), "compilation unit parsed");
        Ok(CompUnit {
            decls,
            func_defs,
            main_func_def,
            line,
        })
    }

    // ===== Backtracking =====

    /// Run `routine` as a trial. On anything but a match the cursor is put
    /// back exactly where it was.
    pub(crate) fn speculate<T>(
        &mut self,
        what: &'static str,
        routine: impl FnOnce(&mut Self) -> ParseResult<Option<T>>,
    ) -> Attempt<T> {
        let snapshot = self.position;
        match routine(self) {
            Ok(Some(node)) => Attempt::Matched(node),
            Ok(None) => {
                self.position = snapshot;
                trace!(what, at = snapshot, "alternative absent");
                Attempt::Absent
            }
            Err(err) => {
                trace!(
                    what,
                    from = self.position,
                    to = snapshot,
                    error = %err,
                    "alternative rejected, rewinding"
                );
                self.position = snapshot;
                self.record_rejection(&err);
                Attempt::Rejected(err)
            }
        }
    }

    /// Run a self-recursive routine one nesting level deeper
    pub(crate) fn nested<T>(
        &mut self,
        routine: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.unexpected("shallower nesting"));
        }
        self.depth += 1;
        let result = routine(self);
        self.depth -= 1;
        result
    }

    fn record_rejection(&mut self, err: &SyntaxError) {
        let deeper = self
            .deepest_rejection
            .as_ref()
            .map_or(true, |seen| err.position() > seen.position());
        if deeper {
            self.deepest_rejection = Some(err.clone());
        }
    }

    // ===== Helper methods =====

    /// Token at the cursor; running past the end is its own error
    pub(crate) fn peek(&self, expected: &str) -> ParseResult<&Token> {
        self.tokens
            .get(self.position)
            .ok_or_else(|| self.eof_error(expected))
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_kind_ahead(0)
    }

    pub(crate) fn peek_kind_ahead(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.position + n).map(|t| t.kind)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Consume the current token if it has `kind`
    pub(crate) fn match_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume the current token if it is one of `kinds`
    pub(crate) fn match_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        match self.peek_kind() {
            Some(kind) if kinds.contains(&kind) => Some(self.advance()),
            _ => None,
        }
    }

    /// Caller guarantees the cursor is on a token
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        self.position += 1;
        token
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: TokenKind,
        ctx: &str,
    ) -> ParseResult<Token> {
        let expected = format!("{} {}", kind, ctx);
        let token = self.peek(&expected)?;
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> ParseResult<Token> {
        self.expect_token(TokenKind::Semicolon, ctx)
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> ParseResult<Token> {
        self.expect_token(TokenKind::Ident, ctx)
    }

    /// Line of the token under the cursor, falling back to the last line
    pub(crate) fn current_line(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or(1, Token::line)
    }

    /// Error for the token under the cursor
    pub(crate) fn unexpected(&self, expected: impl Into<String>) -> SyntaxError {
        let expected = expected.into();
        match self.tokens.get(self.position) {
            Some(token) => SyntaxError::UnexpectedToken {
                expected,
                found: token.to_string(),
                line: token.line(),
                position: self.position,
            },
            None => self.eof_error(&expected),
        }
    }

    fn eof_error(&self, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedEof {
            expected: expected.to_string(),
            line: self.current_line(),
            position: self.tokens.len(),
        }
    }
}
