//! Expression parsing implementation
//!
//! Each binary precedence level parses one operand of the next-tighter level
//! and then loops while its own operator is next, appending operator and
//! operand as siblings. A level node is therefore a flat, odd-length chain
//! (`a + b - c` is one `AddExp` with five children), which keeps left-to-right
//! evaluation order without a right-skewed tree.
//!
//! # Precedence (loosest to tightest)
//!
//! ```text
//! LOrExp   ::= LAndExp { "||" LAndExp }
//! LAndExp  ::= EqExp { "&&" EqExp }
//! EqExp    ::= RelExp { ("==" | "!=") RelExp }
//! RelExp   ::= AddExp { ("<" | ">" | "<=" | ">=") AddExp }
//! AddExp   ::= MulExp { ("+" | "-") MulExp }
//! MulExp   ::= UnaryExp { ("*" | "/" | "%") UnaryExp }
//! UnaryExp ::= UnaryOp UnaryExp | Ident "(" [FuncRParams] ")" | PrimaryExp
//! PrimaryExp ::= "(" Exp ")" | Number | LVal
//! ```
//!
//! `Exp` and `ConstExp` wrap an `AddExp`; `Cond` wraps an `LOrExp`. Those
//! three and each prefix operator count one nesting level.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseResult, Parser};

impl Parser {
    pub(crate) fn parse_exp(&mut self) -> ParseResult<Exp> {
        self.nested(|p| {
            let line = p.current_line();
            let add = p.parse_add_exp()?;
            Ok(Exp { add, line })
        })
    }

    pub(crate) fn parse_cond(&mut self) -> ParseResult<Cond> {
        self.nested(|p| {
            let line = p.current_line();
            let lor = p.parse_lor_exp()?;
            Ok(Cond { lor, line })
        })
    }

    pub(crate) fn parse_const_exp(&mut self) -> ParseResult<ConstExp> {
        self.nested(|p| {
            let line = p.current_line();
            let add = p.parse_add_exp()?;
            Ok(ConstExp { add, line })
        })
    }

    /// One operand, then `(operator operand)*` for any of `operators`
    fn parse_chain<T>(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Separated<T>> {
        let mut operands = Separated::new(operand(self)?);
        while let Some(op) = self.match_any(operators) {
            operands.push(op, operand(self)?);
        }
        Ok(operands)
    }

    fn parse_lor_exp(&mut self) -> ParseResult<LOrExp> {
        let line = self.current_line();
        let operands = self.parse_chain(&[TokenKind::OrOr], Self::parse_land_exp)?;
        Ok(LOrExp { operands, line })
    }

    fn parse_land_exp(&mut self) -> ParseResult<LAndExp> {
        let line = self.current_line();
        let operands = self.parse_chain(&[TokenKind::AndAnd], Self::parse_eq_exp)?;
        Ok(LAndExp { operands, line })
    }

    fn parse_eq_exp(&mut self) -> ParseResult<EqExp> {
        let line = self.current_line();
        let operands = self.parse_chain(
            &[TokenKind::EqEq, TokenKind::NotEq],
            Self::parse_rel_exp,
        )?;
        Ok(EqExp { operands, line })
    }

    fn parse_rel_exp(&mut self) -> ParseResult<RelExp> {
        let line = self.current_line();
        let operands = self.parse_chain(
            &[TokenKind::Lt, TokenKind::Gt, TokenKind::Le, TokenKind::Ge],
            Self::parse_add_exp,
        )?;
        Ok(RelExp { operands, line })
    }

    fn parse_add_exp(&mut self) -> ParseResult<AddExp> {
        let line = self.current_line();
        let operands = self.parse_chain(
            &[TokenKind::Plus, TokenKind::Minus],
            Self::parse_mul_exp,
        )?;
        Ok(AddExp { operands, line })
    }

    fn parse_mul_exp(&mut self) -> ParseResult<MulExp> {
        let line = self.current_line();
        let operands = self.parse_chain(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_unary_exp,
        )?;
        Ok(MulExp { operands, line })
    }

    fn parse_unary_exp(&mut self) -> ParseResult<UnaryExp> {
        let line = self.current_line();

        // Identifier directly followed by `(` is a call
        let call = self.check(TokenKind::Ident)
            && self.peek_kind_ahead(1) == Some(TokenKind::LParen);

        let kind = match self.peek_kind() {
            Some(TokenKind::Ident) if call => self.parse_call()?,
            Some(TokenKind::Plus | TokenKind::Minus | TokenKind::Bang) => {
                let op = self.parse_unary_op()?;
                let operand = Box::new(self.nested(Self::parse_unary_exp)?);
                UnaryKind::Unary { op, operand }
            }
            _ => UnaryKind::Primary(self.parse_primary_exp()?),
        };

        Ok(UnaryExp { line, kind })
    }

    fn parse_call(&mut self) -> ParseResult<UnaryKind> {
        let ident = self.expect_identifier("as function name")?;
        let lparen = self.expect_token(TokenKind::LParen, "after function name")?;

        // A failed argument list means "no arguments"; `)` decides the rest
        let args = self
            .speculate("FuncRParams", Self::parse_func_r_params)
            .matched()
            .map(Box::new);

        let rparen =
            self.expect_token(TokenKind::RParen, "to close argument list")?;

        Ok(UnaryKind::Call {
            ident,
            lparen,
            args,
            rparen,
        })
    }

    fn parse_unary_op(&mut self) -> ParseResult<UnaryOp> {
        let line = self.current_line();
        let ops = [TokenKind::Plus, TokenKind::Minus, TokenKind::Bang];
        match self.match_any(&ops) {
            Some(token) => Ok(UnaryOp { token, line }),
            None => Err(self.unexpected("unary operator")),
        }
    }

    /// Call arguments, or `None` when the lookahead cannot start an expression
    fn parse_func_r_params(&mut self) -> ParseResult<Option<FuncRParams>> {
        if !self.peek_kind().is_some_and(TokenKind::starts_expression) {
            return Ok(None);
        }

        let line = self.current_line();
        let mut args = Separated::new(self.parse_exp()?);
        while let Some(comma) = self.match_token(TokenKind::Comma) {
            args.push(comma, self.parse_exp()?);
        }

        Ok(Some(FuncRParams { args, line }))
    }

    fn parse_primary_exp(&mut self) -> ParseResult<PrimaryExp> {
        let line = self.current_line();

        let kind = match self.peek_kind() {
            Some(TokenKind::LParen) => {
                let lparen = self.advance();
                let exp = Box::new(self.parse_exp()?);
                let rparen = self.expect_token(
                    TokenKind::RParen,
                    "after parenthesized expression",
                )?;
                PrimaryKind::Paren {
                    lparen,
                    exp,
                    rparen,
                }
            }
            Some(TokenKind::IntConst) => PrimaryKind::Number(self.parse_number()?),
            Some(TokenKind::Ident) => PrimaryKind::LVal(self.parse_lval()?),
            _ => return Err(self.unexpected("expression")),
        };

        Ok(PrimaryExp { line, kind })
    }

    fn parse_number(&mut self) -> ParseResult<Number> {
        let line = self.current_line();
        let int_const = self.expect_token(TokenKind::IntConst, "as number")?;
        Ok(Number { int_const, line })
    }

    /// Identifier followed by zero or more `[ Exp ]` indices
    pub(crate) fn parse_lval(&mut self) -> ParseResult<LVal> {
        let line = self.current_line();
        let ident = self.expect_identifier("as variable name")?;

        let mut indices = Vec::new();
        while let Some(open) = self.match_token(TokenKind::LBracket) {
            let inner = self.parse_exp()?;
            let close =
                self.expect_token(TokenKind::RBracket, "after array index")?;
            indices.push(Bracketed { open, inner, close });
        }

        Ok(LVal {
            ident,
            indices,
            line,
        })
    }
}
