//! Syntax analysis for the minic language
//!
//! This module turns source text into a concrete parse tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Recursive descent with backtracking (tokens → tree)
//! - [`ast`]: Parse tree node definitions
//!
//! # Language
//!
//! A small C-like teaching language:
//! - Types: `int` scalars and arrays, `void` and `int` functions
//! - Declarations: `const` and variable definitions with brace initializers
//! - Statements: assignment, `getint()` input, `if`/`else`, `while`,
//!   `break`, `continue`, `return`, `printf`
//! - Expressions: arithmetic, relational, equality and logical operators
//!   (logical ones only inside conditions), calls and array indexing
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent, one routine per nonterminal. Productions
//! that cannot be told apart by one token of lookahead are tried
//! speculatively and the cursor is rewound when they do not pan out.

pub mod ast;
pub mod lexer;
pub mod parse;

mod declarations;
mod expressions;
mod statements;
