//! Statement parsing implementation
//!
//! This module handles blocks and every statement form:
//!
//! - Control flow: `if`/`else`, `while`
//! - Jump statements: `return`, `break`, `continue`
//! - Output: `printf(format, args...)`
//! - Nested blocks
//! - Assignments, `getint()` input assignments, expression and empty statements
//!
//! # Grammar
//!
//! ```text
//! Block     ::= "{" { BlockItem } "}"
//! BlockItem ::= Decl | Stmt
//! Stmt      ::= LVal "=" Exp ";"
//!             | LVal "=" "getint" "(" ")" ";"
//!             | [Exp] ";"
//!             | Block
//!             | "if" "(" Cond ")" Stmt [ "else" Stmt ]
//!             | "while" "(" Cond ")" Stmt
//!             | "break" ";" | "continue" ";"
//!             | "return" [Exp] ";"
//!             | "printf" "(" FormatString { "," Exp } ")" ";"
//! ```
//!
//! An `else` always binds to the nearest `if`: the inner `if` consumes it
//! before control returns to any enclosing one.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{Attempt, ParseResult, Parser};
use tracing::trace;

impl Parser {
    /// Parse `{ BlockItem* }`.
    ///
    /// Each item is attempted speculatively. A malformed item ends the item
    /// loop with the cursor back at the item's first token, and the block then
    /// fails on the missing `}` at that position.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Block> {
        self.nested(Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> ParseResult<Block> {
        let line = self.current_line();
        let lbrace = self.expect_token(TokenKind::LBrace, "to open block")?;

        let mut items = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.unexpected("'}' to close block"));
            }
            let item =
                self.speculate("BlockItem", |p| p.parse_block_item().map(Some));
            match item {
                Attempt::Matched(item) => items.push(item),
                Attempt::Absent | Attempt::Rejected(_) => break,
            }
        }

        let rbrace = self.expect_token(TokenKind::RBrace, "to close block")?;

        Ok(Block {
            lbrace,
            items,
            rbrace,
            line,
        })
    }

    fn parse_block_item(&mut self) -> ParseResult<BlockItem> {
        let line = self.current_line();
        let kind = match self.parse_decl()? {
            Some(decl) => BlockItemKind::Decl(decl),
            None => BlockItemKind::Stmt(self.parse_stmt()?),
        };
        Ok(BlockItem { line, kind })
    }

    /// Parse a statement
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::parse_stmt_body)
    }

    fn parse_stmt_body(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();

        let kind = match self.peek_kind() {
            Some(TokenKind::If) => self.parse_if_stmt()?,
            Some(TokenKind::While) => self.parse_while_stmt()?,
            Some(TokenKind::Break) => {
                let keyword = self.advance();
                let semicolon = self.expect_semicolon("after 'break'")?;
                StmtKind::Break { keyword, semicolon }
            }
            Some(TokenKind::Continue) => {
                let keyword = self.advance();
                let semicolon = self.expect_semicolon("after 'continue'")?;
                StmtKind::Continue { keyword, semicolon }
            }
            Some(TokenKind::Return) => self.parse_return_stmt()?,
            Some(TokenKind::Printf) => self.parse_printf_stmt()?,
            Some(TokenKind::LBrace) => StmtKind::Block(self.parse_block()?),
            Some(TokenKind::Semicolon) => StmtKind::Expr {
                exp: None,
                semicolon: self.advance(),
            },
            _ => self.parse_simple_stmt()?,
        };

        Ok(Stmt { line, kind })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<StmtKind> {
        let if_kw = self.advance();
        let lparen = self.expect_token(TokenKind::LParen, "after 'if'")?;
        let cond = self.parse_cond()?;
        let rparen = self.expect_token(TokenKind::RParen, "after if condition")?;
        let then_branch = Box::new(self.parse_stmt()?);

        let else_branch = match self.match_token(TokenKind::Else) {
            Some(else_kw) => Some((else_kw, Box::new(self.parse_stmt()?))),
            None => None,
        };

        Ok(StmtKind::If {
            if_kw,
            lparen,
            cond,
            rparen,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<StmtKind> {
        let while_kw = self.advance();
        let lparen = self.expect_token(TokenKind::LParen, "after 'while'")?;
        let cond = self.parse_cond()?;
        let rparen = self.expect_token(TokenKind::RParen, "after while condition")?;
        let body = Box::new(self.parse_stmt()?);

        Ok(StmtKind::While {
            while_kw,
            lparen,
            cond,
            rparen,
            body,
        })
    }

    fn parse_return_stmt(&mut self) -> ParseResult<StmtKind> {
        let keyword = self.advance();

        let exp = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_exp()?)
        };

        let semicolon = self.expect_semicolon("after return")?;

        Ok(StmtKind::Return {
            keyword,
            exp,
            semicolon,
        })
    }

    fn parse_printf_stmt(&mut self) -> ParseResult<StmtKind> {
        let printf_kw = self.advance();
        let lparen = self.expect_token(TokenKind::LParen, "after 'printf'")?;
        let format = self.expect_token(TokenKind::StrConst, "as printf format")?;

        let mut args = Vec::new();
        while let Some(comma) = self.match_token(TokenKind::Comma) {
            args.push((comma, self.parse_exp()?));
        }

        let rparen =
            self.expect_token(TokenKind::RParen, "after printf arguments")?;
        let semicolon = self.expect_semicolon("after printf")?;

        Ok(StmtKind::Printf {
            printf_kw,
            lparen,
            format,
            args,
            rparen,
            semicolon,
        })
    }

    /// Assignment, input assignment or expression statement.
    ///
    /// An `LVal` is tried first. Only an `LVal` directly followed by `=`
    /// commits to assignment; otherwise the partial `LVal` is dropped and the
    /// whole span is parsed again from the statement start as an `Exp`, since
    /// an `LVal` is also a prefix of a longer expression.
    fn parse_simple_stmt(&mut self) -> ParseResult<StmtKind> {
        let start = self.position;

        let attempt = self.speculate("LVal", |p| {
            if p.check(TokenKind::Ident) {
                p.parse_lval().map(Some)
            } else {
                Ok(None)
            }
        });

        if let Attempt::Matched(lval) = attempt {
            if let Some(assign) = self.match_token(TokenKind::Assign) {
                return self.finish_assignment(lval, assign);
            }
            trace!(at = start, "lvalue without '=', reparsing as expression");
            self.position = start;
        }

        let exp = self.parse_exp()?;
        let semicolon = self.expect_semicolon("after expression")?;

        Ok(StmtKind::Expr {
            exp: Some(exp),
            semicolon,
        })
    }

    fn finish_assignment(
        &mut self,
        lval: LVal,
        assign: Token,
    ) -> ParseResult<StmtKind> {
        if let Some(getint_kw) = self.match_token(TokenKind::Getint) {
            let lparen = self.expect_token(TokenKind::LParen, "after 'getint'")?;
            let rparen = self.expect_token(TokenKind::RParen, "after 'getint ('")?;
            let semicolon = self.expect_semicolon("after getint()")?;
            return Ok(StmtKind::GetInt {
                lval,
                assign,
                getint_kw,
                lparen,
                rparen,
                semicolon,
            });
        }

        let exp = self.parse_exp()?;
        let semicolon = self.expect_semicolon("after assignment")?;

        Ok(StmtKind::Assign {
            lval,
            assign,
            exp,
            semicolon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::SyntaxError;

    fn stmt(source: &str) -> Stmt {
        Parser::from_source(source).unwrap().parse_stmt().unwrap()
    }

    #[test]
    fn test_dangling_else_binds_inner_if() {
        let outer = stmt("if (a) if (b) x = 1; else x = 2;");
        let StmtKind::If {
            then_branch,
            else_branch,
            ..
        } = outer.kind
        else {
            panic!("Expected if statement");
        };

        assert!(else_branch.is_none());
        assert!(matches!(
            then_branch.kind,
            StmtKind::If {
                else_branch: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_return_forms() {
        assert!(matches!(
            stmt("return;").kind,
            StmtKind::Return { exp: None, .. }
        ));
        assert!(matches!(
            stmt("return a + 1;").kind,
            StmtKind::Return { exp: Some(_), .. }
        ));
    }

    #[test]
    fn test_printf_arguments() {
        let printf = stmt(r#"printf("%d %d\n", a, b[1]);"#);
        let StmtKind::Printf { format, args, .. } = printf.kind else {
            panic!("Expected printf statement");
        };

        assert_eq!(format.lexeme, r#""%d %d\n""#);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_empty_statement() {
        assert!(matches!(stmt(";").kind, StmtKind::Expr { exp: None, .. }));
    }

    #[test]
    fn test_call_statement_reparses_as_expression() {
        let mut p = Parser::from_source("f(x);").unwrap();
        let parsed = p.parse_stmt().unwrap();

        assert!(matches!(parsed.kind, StmtKind::Expr { exp: Some(_), .. }));
        assert_eq!(p.position(), 5);
    }

    #[test]
    fn test_getint_needs_parentheses() {
        assert!(Parser::from_source("a = getint;").unwrap().parse_stmt().is_err());
    }

    #[test]
    fn test_block_mixes_decls_and_stmts() {
        let source = "{ int a = 1; const int b = 2; a = a + b; { } }";
        let block = Parser::from_source(source).unwrap().parse_block().unwrap();

        assert_eq!(block.items.len(), 4);
        assert!(matches!(block.items[0].kind, BlockItemKind::Decl(_)));
        assert!(matches!(block.items[1].kind, BlockItemKind::Decl(_)));
        assert!(matches!(block.items[2].kind, BlockItemKind::Stmt(_)));
    }

    #[test]
    fn test_deep_if_chain_hits_nesting_limit() {
        let source = format!("{}x = 1;", "if (1) ".repeat(300));
        let err = Parser::from_source(&source).unwrap().parse_stmt().unwrap_err();

        assert_eq!(err.expected(), "shallower nesting");
    }

    #[test]
    fn test_deep_blocks_truncate_at_nesting_limit() {
        let source = format!("{}{}", "{".repeat(300), "}".repeat(300));
        let mut p = Parser::from_source(&source).unwrap();

        assert!(p.parse_block().is_err());
        let deepest = p.deepest_rejection().unwrap();
        assert_eq!(deepest.expected(), "shallower nesting");
    }

    #[test]
    fn test_unclosed_block_hits_end_of_input() {
        let err = Parser::from_source("{ a = 1;")
            .unwrap()
            .parse_block()
            .unwrap_err();

        assert!(matches!(err, SyntaxError::UnexpectedEof { .. }));
    }
}
