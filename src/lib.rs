//! # Introduction
//!
//! minic is the syntax analysis front end for a small C-like teaching
//! language. It tokenizes a source file and builds a concrete parse tree with
//! one node per grammar nonterminal, so later passes (and the listings in
//! [`emit`]) can see exactly which production matched where.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → CompUnit → Listings
//! ```
//!
//! 1. [`parser::lexer`] turns text into a flat token vector.
//! 2. [`parser::parse`] runs a backtracking recursive descent parser over the
//!    tokens and returns a [`CompUnit`].
//! 3. [`emit`] renders tokens or trees as text or JSON.
//!
//! ## Example
//!
//! ```
//! let unit = minic::parse_source("int main() { return 0; }").unwrap();
//! assert!(unit.func_defs.is_empty());
//! ```

pub mod emit;
pub mod parser;

use thiserror::Error;
use tracing::debug;

pub use parser::ast::{CompUnit, NodeKind, SyntaxNode};
pub use parser::lexer::{LexError, Lexer, Token, TokenKind};
pub use parser::parse::{Parser, SyntaxError};

/// Any failure turning source text into a tree
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Tokenize and parse a complete compilation unit
pub fn parse_source(source: &str) -> Result<CompUnit, Error> {
    let mut parser = Parser::from_source(source)?;
    let unit = parser.parse_comp_unit()?;
    debug!(
        decls = unit.decls.len(),
        func_defs = unit.func_defs.len(),
        "parsed compilation unit"
    );
    Ok(unit)
}
