//! Text and JSON renderings of tokens and parse trees
//!
//! All tree listings walk the tree through [`SyntaxNode`], so they need no
//! knowledge of individual node types.

use crate::parser::ast::{Element, SyntaxNode};
use crate::parser::lexer::Token;
use serde::Serialize;
use std::fmt::Write;

/// One `CODE lexeme` line per token
pub fn token_listing(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        push_token(&mut out, token);
    }
    out
}

/// Post-order derivation listing.
///
/// Terminals print as `CODE lexeme` in source order; each nonterminal prints
/// `<Kind>` after its last child, so a node's line marks where it was reduced.
pub fn derivation_listing(root: &dyn SyntaxNode) -> String {
    let mut out = String::new();
    write_derivation(root, &mut out);
    out
}

fn write_derivation(node: &dyn SyntaxNode, out: &mut String) {
    for child in node.children() {
        match child {
            Element::Token(token) => push_token(out, token),
            Element::Node(inner) => write_derivation(inner, out),
        }
    }
    let _ = writeln!(out, "<{}>", node.kind());
}

/// Indented outline: `Kind @line` for nodes, `CODE lexeme @line` for leaves
pub fn tree_listing(root: &dyn SyntaxNode) -> String {
    let mut out = String::new();
    write_tree(root, 0, &mut out);
    out
}

fn write_tree(node: &dyn SyntaxNode, depth: usize, out: &mut String) {
    let _ = writeln!(
        out,
        "{:indent$}{} @{}",
        "",
        node.kind(),
        node.line(),
        indent = depth * 2
    );
    for child in node.children() {
        match child {
            Element::Token(token) => {
                let _ = writeln!(
                    out,
                    "{:indent$}{} {} @{}",
                    "",
                    token.kind.code(),
                    token.lexeme,
                    token.line(),
                    indent = (depth + 1) * 2
                );
            }
            Element::Node(inner) => write_tree(inner, depth + 1, out),
        }
    }
}

/// Pretty JSON of any serializable tree or token list
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn push_token(out: &mut String, token: &Token) {
    let _ = writeln!(out, "{} {}", token.kind.code(), token.lexeme);
}
