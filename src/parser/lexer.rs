//! Lexer (tokenizer) for minic source code
//!
//! Converts raw source text into a flat [`Token`] sequence consumed by the
//! parser. The sequence carries no end-of-input marker; the parser treats
//! "past the end" as its own condition.
//!
//! Literal lexemes are kept opaque: integer literals are not range-checked and
//! string literals keep their surrounding quotes and escape sequences, since
//! only later stages interpret them.

use super::ast::SourceLocation;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Classification of a terminal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Literals and names
    Ident,
    IntConst,
    StrConst,

    // Keywords
    Const,
    Int,
    Void,
    Main,
    If,
    Else,
    While,
    Break,
    Continue,
    Return,
    Printf,
    Getint,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    Assign,

    // Punctuation
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

impl TokenKind {
    /// Category code used by the token and derivation listings.
    pub fn code(self) -> &'static str {
        match self {
            TokenKind::Ident => "IDENFR",
            TokenKind::IntConst => "INTCON",
            TokenKind::StrConst => "STRCON",
            TokenKind::Const => "CONSTTK",
            TokenKind::Int => "INTTK",
            TokenKind::Void => "VOIDTK",
            TokenKind::Main => "MAINTK",
            TokenKind::If => "IFTK",
            TokenKind::Else => "ELSETK",
            TokenKind::While => "WHILETK",
            TokenKind::Break => "BREAKTK",
            TokenKind::Continue => "CONTINUETK",
            TokenKind::Return => "RETURNTK",
            TokenKind::Printf => "PRINTFTK",
            TokenKind::Getint => "GETINTTK",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINU",
            TokenKind::Star => "MULT",
            TokenKind::Slash => "DIV",
            TokenKind::Percent => "MOD",
            TokenKind::Lt => "LSS",
            TokenKind::Gt => "GRE",
            TokenKind::Le => "LEQ",
            TokenKind::Ge => "GEQ",
            TokenKind::EqEq => "EQL",
            TokenKind::NotEq => "NEQ",
            TokenKind::AndAnd => "AND",
            TokenKind::OrOr => "OR",
            TokenKind::Bang => "NOT",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICN",
            TokenKind::LParen => "LPARENT",
            TokenKind::RParen => "RPARENT",
            TokenKind::LBracket => "LBRACK",
            TokenKind::RBracket => "RBRACK",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
        }
    }

    /// Whether a token of this kind can begin an expression.
    pub fn starts_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::IntConst
                | TokenKind::LParen
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Bang
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::IntConst => write!(f, "integer literal"),
            TokenKind::StrConst => write!(f, "format string"),
            TokenKind::Const => write!(f, "'const'"),
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::Main => write!(f, "'main'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Break => write!(f, "'break'"),
            TokenKind::Continue => write!(f, "'continue'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Printf => write!(f, "'printf'"),
            TokenKind::Getint => write!(f, "'getint'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
        }
    }
}

/// An immutable terminal symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::IntConst => write!(f, "integer literal {}", self.lexeme),
            TokenKind::StrConst => write!(f, "format string {}", self.lexeme),
            kind => write!(f, "{}", kind),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Lexer error at line {}, column {}: {message}",
    .location.line,
    .location.column
)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

fn keywords() -> &'static FxHashMap<&'static str, TokenKind> {
    static KEYWORDS: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        [
            ("const", TokenKind::Const),
            ("int", TokenKind::Int),
            ("void", TokenKind::Void),
            ("main", TokenKind::Main),
            ("if", TokenKind::If),
            ("else", TokenKind::Else),
            ("while", TokenKind::While),
            ("break", TokenKind::Break),
            ("continue", TokenKind::Continue),
            ("return", TokenKind::Return),
            ("printf", TokenKind::Printf),
            ("getint", TokenKind::Getint),
        ]
        .into_iter()
        .collect()
    })
}

/// Lexer for minic source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                break;
            }

            tokens.push(self.next_token()?);
        }

        tracing::debug!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        let single = |kind: TokenKind| Ok(Token::new(kind, ch.to_string(), loc));

        match ch {
            '"' => self.string_literal(loc),
            '0'..='9' => Ok(self.number_literal(ch, loc)),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => single(TokenKind::Plus),
            '-' => single(TokenKind::Minus),
            '*' => single(TokenKind::Star),
            '/' => single(TokenKind::Slash),
            '%' => single(TokenKind::Percent),
            ',' => single(TokenKind::Comma),
            ';' => single(TokenKind::Semicolon),
            '(' => single(TokenKind::LParen),
            ')' => single(TokenKind::RParen),
            '[' => single(TokenKind::LBracket),
            ']' => single(TokenKind::RBracket),
            '{' => single(TokenKind::LBrace),
            '}' => single(TokenKind::RBrace),

            '<' => Ok(self.one_or_two(loc, '<', TokenKind::Lt, TokenKind::Le)),
            '>' => Ok(self.one_or_two(loc, '>', TokenKind::Gt, TokenKind::Ge)),
            '=' => {
                Ok(self.one_or_two(loc, '=', TokenKind::Assign, TokenKind::EqEq))
            }
            '!' => Ok(self.one_or_two(loc, '!', TokenKind::Bang, TokenKind::NotEq)),

            '&' => self.doubled(loc, '&', TokenKind::AndAnd),
            '|' => self.doubled(loc, '|', TokenKind::OrOr),

            _ => Err(LexError {
                message: format!("Unexpected character '{}'", ch),
                location: loc,
            }),
        }
    }

    /// `first` alone, or `first=` when followed by `=`
    fn one_or_two(
        &mut self,
        loc: SourceLocation,
        first: char,
        alone: TokenKind,
        with_eq: TokenKind,
    ) -> Token {
        if self.peek() == Some('=') {
            self.advance();
            Token::new(with_eq, format!("{}=", first), loc)
        } else {
            Token::new(alone, first.to_string(), loc)
        }
    }

    /// `&&` and `||`; the single-character forms are not part of the language
    fn doubled(
        &mut self,
        loc: SourceLocation,
        ch: char,
        kind: TokenKind,
    ) -> Result<Token, LexError> {
        if self.peek() == Some(ch) {
            self.advance();
            Ok(Token::new(kind, format!("{}{}", ch, ch), loc))
        } else {
            Err(LexError {
                message: format!("Expected '{}{}', found lone '{}'", ch, ch, ch),
                location: loc,
            })
        }
    }

    /// Parse a format string, keeping the quotes in the lexeme
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut lexeme = String::from('"');

        loop {
            match self.advance() {
                Some('"') => {
                    lexeme.push('"');
                    return Ok(Token::new(TokenKind::StrConst, lexeme, loc));
                }
                Some('\n') | None => {
                    return Err(LexError {
                        message: "Unterminated string literal".to_string(),
                        location: loc,
                    });
                }
                Some('\\') => {
                    lexeme.push('\\');
                    if let Some(escaped) = self.peek() {
                        if escaped != '\n' {
                            lexeme.push(escaped);
                            self.advance();
                        }
                    }
                }
                Some(ch) => lexeme.push(ch),
            }
        }
    }

    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Token {
        let mut digits = String::new();
        digits.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::IntConst, digits, loc)
    }

    fn identifier_or_keyword(
        &mut self,
        first_char: char,
        loc: SourceLocation,
    ) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keywords()
            .get(ident.as_str())
            .copied()
            .unwrap_or(TokenKind::Ident);
        Token::new(kind, ident, loc)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new("int main() { return 0; }").tokenize().unwrap();

        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Main);
        assert_eq!(tokens[1].lexeme, "main");
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[5].kind, TokenKind::Return);
        assert_eq!(tokens[6].kind, TokenKind::IntConst);
        assert_eq!(tokens[6].lexeme, "0");
        assert_eq!(tokens[8].kind, TokenKind::RBrace);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("< <= > >= == != = && || ! + - * / %"),
            vec![
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Assign,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let source = "int x; // comment\nint y; /* block\ncomment */ int z;";
        let tokens = Lexer::new(source).tokenize().unwrap();

        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line(), 1);
        assert_eq!(tokens[4].lexeme, "y");
        assert_eq!(tokens[4].line(), 2);
        assert_eq!(tokens[7].lexeme, "z");
        assert_eq!(tokens[7].line(), 3);
    }

    #[test]
    fn test_format_string_is_opaque() {
        let tokens = Lexer::new(r#"printf("a=%d\n", a);"#).tokenize().unwrap();

        assert_eq!(tokens[2].kind, TokenKind::StrConst);
        assert_eq!(tokens[2].lexeme, r#""a=%d\n""#);
    }

    #[test]
    fn test_keywords_are_whole_words() {
        assert_eq!(
            kinds("getint getint_ mainly main"),
            vec![
                TokenKind::Getint,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Main
            ]
        );
    }

    #[test]
    fn test_lex_errors() {
        assert!(Lexer::new("a & b").tokenize().is_err());
        assert!(Lexer::new("a | b").tokenize().is_err());
        assert!(Lexer::new("\"open").tokenize().is_err());
        assert!(Lexer::new("/* open").tokenize().is_err());

        let err = Lexer::new("int x;\n  @").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(2, 3));
    }
}
