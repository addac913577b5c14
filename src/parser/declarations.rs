//! Declaration parsing implementation
//!
//! This module handles the declaration and function grammar:
//!
//! - Constant and variable declarations, including array dimensions and
//!   brace initializers
//! - Function definitions with optional formal parameters
//! - The fixed `int main ( )` definition
//!
//! # Grammar
//!
//! ```text
//! Decl         ::= ConstDecl | VarDecl
//! ConstDecl    ::= "const" BType ConstDef { "," ConstDef } ";"
//! ConstDef     ::= Ident { "[" ConstExp "]" } "=" ConstInitVal
//! ConstInitVal ::= ConstExp | "{" [ ConstInitVal { "," ConstInitVal } ] "}"
//! VarDecl      ::= BType VarDef { "," VarDef } ";"
//! VarDef       ::= Ident { "[" ConstExp "]" } [ "=" InitVal ]
//! InitVal      ::= Exp | "{" [ InitVal { "," InitVal } ] "}"
//! FuncDef      ::= FuncType Ident "(" [FuncFParams] ")" Block
//! MainFuncDef  ::= "int" "main" "(" ")" Block
//! FuncFParam   ::= BType Ident [ "[" "]" { "[" ConstExp "]" } ]
//! ```
//!
//! `Decl` is LL(1) on `const`; the declaration/function boundary at the top
//! level is settled by backtracking in [`Parser::parse_comp_unit`]. Each
//! brace level of an initializer counts one nesting level.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseResult, Parser};

impl Parser {
    /// Parse a declaration, or `None` when the lookahead cannot start one
    pub(crate) fn parse_decl(&mut self) -> ParseResult<Option<Decl>> {
        let line = self.current_line();
        let kind = match self.peek_kind() {
            Some(TokenKind::Const) => DeclKind::Const(self.parse_const_decl()?),
            Some(TokenKind::Int) => DeclKind::Var(self.parse_var_decl()?),
            _ => return Ok(None),
        };
        Ok(Some(Decl { line, kind }))
    }

    fn parse_const_decl(&mut self) -> ParseResult<ConstDecl> {
        let line = self.current_line();
        let const_kw =
            self.expect_token(TokenKind::Const, "to start constant declaration")?;
        let btype = self.parse_btype()?;

        let mut defs = Separated::new(self.parse_const_def()?);
        while let Some(comma) = self.match_token(TokenKind::Comma) {
            defs.push(comma, self.parse_const_def()?);
        }

        let semicolon = self.expect_semicolon("after constant declaration")?;

        Ok(ConstDecl {
            const_kw,
            btype,
            defs,
            semicolon,
            line,
        })
    }

    pub(crate) fn parse_btype(&mut self) -> ParseResult<BType> {
        let line = self.current_line();
        let int_kw = self.expect_token(TokenKind::Int, "as base type")?;
        Ok(BType { int_kw, line })
    }

    fn parse_const_def(&mut self) -> ParseResult<ConstDef> {
        let line = self.current_line();
        let ident = self.expect_identifier("in constant definition")?;
        let dims = self.parse_array_dims()?;
        let assign =
            self.expect_token(TokenKind::Assign, "in constant definition")?;
        let init = self.parse_const_init_val()?;

        Ok(ConstDef {
            ident,
            dims,
            assign,
            init,
            line,
        })
    }

    /// Zero or more `[ ConstExp ]`
    fn parse_array_dims(&mut self) -> ParseResult<Vec<Bracketed<ConstExp>>> {
        let mut dims = Vec::new();
        while let Some(open) = self.match_token(TokenKind::LBracket) {
            let inner = self.parse_const_exp()?;
            let close =
                self.expect_token(TokenKind::RBracket, "after array dimension")?;
            dims.push(Bracketed { open, inner, close });
        }
        Ok(dims)
    }

    fn parse_const_init_val(&mut self) -> ParseResult<ConstInitVal> {
        let line = self.current_line();
        let kind = self.parse_initializer(
            Self::parse_const_init_val,
            Self::parse_const_exp,
        )?;
        Ok(ConstInitVal { line, kind })
    }

    /// Shared body of `ConstInitVal` and `InitVal`.
    ///
    /// An immediate `}` after `{` is the zero-filled aggregate and is checked
    /// before any sub-initializer is attempted.
    fn parse_initializer<I, E>(
        &mut self,
        item: fn(&mut Self) -> ParseResult<I>,
        single: fn(&mut Self) -> ParseResult<E>,
    ) -> ParseResult<Initializer<I, E>> {
        let Some(lbrace) = self.match_token(TokenKind::LBrace) else {
            return Ok(Initializer::Single(single(self)?));
        };

        self.nested(|p| {
            let items = if p.check(TokenKind::RBrace) {
                None
            } else {
                let mut items = Separated::new(item(p)?);
                while let Some(comma) = p.match_token(TokenKind::Comma) {
                    items.push(comma, item(p)?);
                }
                Some(Box::new(items))
            };

            let rbrace =
                p.expect_token(TokenKind::RBrace, "to close initializer list")?;

            Ok(Initializer::Aggregate {
                lbrace,
                items,
                rbrace,
            })
        })
    }

    fn parse_var_decl(&mut self) -> ParseResult<VarDecl> {
        let line = self.current_line();
        let btype = self.parse_btype()?;

        let mut defs = Separated::new(self.parse_var_def()?);
        while let Some(comma) = self.match_token(TokenKind::Comma) {
            defs.push(comma, self.parse_var_def()?);
        }

        let semicolon = self.expect_semicolon("after variable declaration")?;

        Ok(VarDecl {
            btype,
            defs,
            semicolon,
            line,
        })
    }

    fn parse_var_def(&mut self) -> ParseResult<VarDef> {
        let line = self.current_line();
        let ident = self.expect_identifier("in variable definition")?;
        let dims = self.parse_array_dims()?;

        let init = match self.match_token(TokenKind::Assign) {
            Some(assign) => Some((assign, self.parse_init_val()?)),
            None => None,
        };

        Ok(VarDef {
            ident,
            dims,
            init,
            line,
        })
    }

    fn parse_init_val(&mut self) -> ParseResult<InitVal> {
        let line = self.current_line();
        let kind = self.parse_initializer(Self::parse_init_val, Self::parse_exp)?;
        Ok(InitVal { line, kind })
    }

    /// Parse a function definition, or `None` when the lookahead is not a
    /// function type keyword
    pub(crate) fn parse_func_def(&mut self) -> ParseResult<Option<FuncDef>> {
        if !matches!(self.peek_kind(), Some(TokenKind::Void | TokenKind::Int)) {
            return Ok(None);
        }

        let line = self.current_line();
        let func_type = self.parse_func_type()?;
        let ident = self.expect_identifier("as function name")?;
        let lparen = self.expect_token(TokenKind::LParen, "after function name")?;

        let params = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_func_f_params()?)
        };

        let rparen = self.expect_token(TokenKind::RParen, "after parameters")?;
        let body = self.parse_block()?;

        Ok(Some(FuncDef {
            func_type,
            ident,
            lparen,
            params,
            rparen,
            body,
            line,
        }))
    }

    /// `int main ( ) Block`; the mandatory end of every compilation unit
    pub(crate) fn parse_main_func_def(&mut self) -> ParseResult<MainFuncDef> {
        let line = self.current_line();
        let int_kw = self.expect_token(TokenKind::Int, "to start main function")?;
        let main_kw = self.expect_token(TokenKind::Main, "in main function")?;
        let lparen = self.expect_token(TokenKind::LParen, "after 'main'")?;
        let rparen = self.expect_token(TokenKind::RParen, "after 'main ('")?;
        let body = self.parse_block()?;

        Ok(MainFuncDef {
            int_kw,
            main_kw,
            lparen,
            rparen,
            body,
            line,
        })
    }

    fn parse_func_type(&mut self) -> ParseResult<FuncType> {
        let line = self.current_line();
        match self.match_any(&[TokenKind::Void, TokenKind::Int]) {
            Some(keyword) => Ok(FuncType { keyword, line }),
            None => Err(self.unexpected("function return type")),
        }
    }

    fn parse_func_f_params(&mut self) -> ParseResult<FuncFParams> {
        let line = self.current_line();

        let mut params = Separated::new(self.parse_func_f_param()?);
        while let Some(comma) = self.match_token(TokenKind::Comma) {
            params.push(comma, self.parse_func_f_param()?);
        }

        Ok(FuncFParams { params, line })
    }

    fn parse_func_f_param(&mut self) -> ParseResult<FuncFParam> {
        let line = self.current_line();
        let btype = self.parse_btype()?;
        let ident = self.expect_identifier("as parameter name")?;

        let array = match self.match_token(TokenKind::LBracket) {
            Some(lbracket) => {
                let rbracket = self.expect_token(
                    TokenKind::RBracket,
                    "after array parameter '['",
                )?;
                let dims = self.parse_array_dims()?;
                Some(ArrayParam {
                    lbracket,
                    rbracket,
                    dims,
                })
            }
            None => None,
        };

        Ok(FuncFParam {
            btype,
            ident,
            array,
            line,
        })
    }
}
