// Parse tree definitions for the minic front end
//
// One type per grammar nonterminal. Choice nonterminals are a struct carrying
// the node's line plus a variant enum; repetitions with separators use
// `Separated`, so an operator chain always holds one more operand than
// operators. Every node records the line of its leftmost terminal when it is
// built and is never mutated afterwards.

use crate::parser::lexer::Token;
use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Grammar symbol a node instantiates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    CompUnit,
    Decl,
    ConstDecl,
    BType,
    ConstDef,
    ConstInitVal,
    VarDecl,
    VarDef,
    InitVal,
    FuncDef,
    MainFuncDef,
    FuncType,
    FuncFParams,
    FuncFParam,
    Block,
    BlockItem,
    Stmt,
    Exp,
    Cond,
    LVal,
    PrimaryExp,
    Number,
    UnaryExp,
    UnaryOp,
    FuncRParams,
    MulExp,
    AddExp,
    RelExp,
    EqExp,
    LAndExp,
    LOrExp,
    ConstExp,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::CompUnit => "CompUnit",
            NodeKind::Decl => "Decl",
            NodeKind::ConstDecl => "ConstDecl",
            NodeKind::BType => "BType",
            NodeKind::ConstDef => "ConstDef",
            NodeKind::ConstInitVal => "ConstInitVal",
            NodeKind::VarDecl => "VarDecl",
            NodeKind::VarDef => "VarDef",
            NodeKind::InitVal => "InitVal",
            NodeKind::FuncDef => "FuncDef",
            NodeKind::MainFuncDef => "MainFuncDef",
            NodeKind::FuncType => "FuncType",
            NodeKind::FuncFParams => "FuncFParams",
            NodeKind::FuncFParam => "FuncFParam",
            NodeKind::Block => "Block",
            NodeKind::BlockItem => "BlockItem",
            NodeKind::Stmt => "Stmt",
            NodeKind::Exp => "Exp",
            NodeKind::Cond => "Cond",
            NodeKind::LVal => "LVal",
            NodeKind::PrimaryExp => "PrimaryExp",
            NodeKind::Number => "Number",
            NodeKind::UnaryExp => "UnaryExp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::FuncRParams => "FuncRParams",
            NodeKind::MulExp => "MulExp",
            NodeKind::AddExp => "AddExp",
            NodeKind::RelExp => "RelExp",
            NodeKind::EqExp => "EqExp",
            NodeKind::LAndExp => "LAndExp",
            NodeKind::LOrExp => "LOrExp",
            NodeKind::ConstExp => "ConstExp",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One child of a node, in source order
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Token(&'a Token),
    Node(&'a dyn SyntaxNode),
}

/// Uniform read-only view over the typed tree.
///
/// Printers and generic checks walk the tree through this trait instead of
/// matching on every node type.
pub trait SyntaxNode: fmt::Debug {
    fn kind(&self) -> NodeKind;

    /// Line of the leftmost terminal in this subtree
    fn line(&self) -> usize;

    /// Direct children in source order. Never empty.
    fn children(&self) -> Vec<Element<'_>>;
}

/// All terminals of a subtree, left to right
pub fn terminals(node: &dyn SyntaxNode) -> Vec<&Token> {
    let mut out = Vec::new();
    collect_terminals(node, &mut out);
    out
}

fn collect_terminals<'a>(node: &'a dyn SyntaxNode, out: &mut Vec<&'a Token>) {
    for child in node.children() {
        match child {
            Element::Token(token) => out.push(token),
            Element::Node(inner) => collect_terminals(inner, out),
        }
    }
}

/// A non-empty list of items joined by separator tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Separated<T> {
    pub first: T,
    pub rest: Vec<(Token, T)>,
}

impl<T> Separated<T> {
    pub fn new(first: T) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    pub fn push(&mut self, separator: Token, item: T) {
        self.rest.push((separator, item));
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, item)| item))
    }

    pub fn separators(&self) -> impl Iterator<Item = &Token> {
        self.rest.iter().map(|(sep, _)| sep)
    }
}

impl<T: SyntaxNode> Separated<T> {
    fn push_children<'a>(&'a self, out: &mut Vec<Element<'a>>) {
        out.push(Element::Node(&self.first));
        for (sep, item) in &self.rest {
            out.push(Element::Token(sep));
            out.push(Element::Node(item));
        }
    }
}

/// `[ inner ]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bracketed<T> {
    pub open: Token,
    pub inner: T,
    pub close: Token,
}

impl<T: SyntaxNode> Bracketed<T> {
    fn push_children<'a>(&'a self, out: &mut Vec<Element<'a>>) {
        out.push(Element::Token(&self.open));
        out.push(Element::Node(&self.inner));
        out.push(Element::Token(&self.close));
    }
}

// ===== Top level =====

/// Top-level program structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompUnit {
    pub decls: Vec<Decl>,
    pub func_defs: Vec<FuncDef>,
    pub main_func_def: MainFuncDef,
    pub line: usize,
}

impl SyntaxNode for CompUnit {
    fn kind(&self) -> NodeKind {
        NodeKind::CompUnit
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out: Vec<Element<'_>> = Vec::new();
        out.extend(self.decls.iter().map(|d| Element::Node(d)));
        out.extend(self.func_defs.iter().map(|f| Element::Node(f)));
        out.push(Element::Node(&self.main_func_def));
        out
    }
}

// ===== Declarations =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decl {
    pub line: usize,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeclKind {
    Const(ConstDecl),
    Var(VarDecl),
}

impl SyntaxNode for Decl {
    fn kind(&self) -> NodeKind {
        NodeKind::Decl
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        match &self.kind {
            DeclKind::Const(decl) => vec![Element::Node(decl)],
            DeclKind::Var(decl) => vec![Element::Node(decl)],
        }
    }
}

/// `const int a = 1, b[2] = {1, 2};`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstDecl {
    pub const_kw: Token,
    pub btype: BType,
    pub defs: Separated<ConstDef>,
    pub semicolon: Token,
    pub line: usize,
}

impl SyntaxNode for ConstDecl {
    fn kind(&self) -> NodeKind {
        NodeKind::ConstDecl
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![
            Element::Token(&self.const_kw),
            Element::Node(&self.btype),
        ];
        self.defs.push_children(&mut out);
        out.push(Element::Token(&self.semicolon));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BType {
    pub int_kw: Token,
    pub line: usize,
}

impl SyntaxNode for BType {
    fn kind(&self) -> NodeKind {
        NodeKind::BType
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![Element::Token(&self.int_kw)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstDef {
    pub ident: Token,
    pub dims: Vec<Bracketed<ConstExp>>,
    pub assign: Token,
    pub init: ConstInitVal,
    pub line: usize,
}

impl SyntaxNode for ConstDef {
    fn kind(&self) -> NodeKind {
        NodeKind::ConstDef
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![Element::Token(&self.ident)];
        for dim in &self.dims {
            dim.push_children(&mut out);
        }
        out.push(Element::Token(&self.assign));
        out.push(Element::Node(&self.init));
        out
    }
}

/// Shared shape of `ConstInitVal` and `InitVal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Initializer<I, E> {
    Single(E),
    /// `{ ... }`; `items` is `None` for the zero-filled `{}`
    Aggregate {
        lbrace: Token,
        items: Option<Box<Separated<I>>>,
        rbrace: Token,
    },
}

impl<I: SyntaxNode, E: SyntaxNode> Initializer<I, E> {
    /// Number of sub-initializers inside braces, or `None` for a single
    /// expression
    pub fn aggregate_len(&self) -> Option<usize> {
        match self {
            Initializer::Single(_) => None,
            Initializer::Aggregate { items, .. } => {
                Some(items.as_ref().map_or(0, |i| i.len()))
            }
        }
    }

    fn children(&self) -> Vec<Element<'_>> {
        match self {
            Initializer::Single(exp) => vec![Element::Node(exp)],
            Initializer::Aggregate {
                lbrace,
                items,
                rbrace,
            } => {
                let mut out = vec![Element::Token(lbrace)];
                if let Some(items) = items {
                    items.push_children(&mut out);
                }
                out.push(Element::Token(rbrace));
                out
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstInitVal {
    pub line: usize,
    pub kind: Initializer<ConstInitVal, ConstExp>,
}

impl SyntaxNode for ConstInitVal {
    fn kind(&self) -> NodeKind {
        NodeKind::ConstInitVal
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        self.kind.children()
    }
}

/// `int a, b[3] = {1, 2, 3};`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarDecl {
    pub btype: BType,
    pub defs: Separated<VarDef>,
    pub semicolon: Token,
    pub line: usize,
}

impl SyntaxNode for VarDecl {
    fn kind(&self) -> NodeKind {
        NodeKind::VarDecl
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![Element::Node(&self.btype)];
        self.defs.push_children(&mut out);
        out.push(Element::Token(&self.semicolon));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarDef {
    pub ident: Token,
    pub dims: Vec<Bracketed<ConstExp>>,
    /// `=` and the initializer, when present
    pub init: Option<(Token, InitVal)>,
    pub line: usize,
}

impl SyntaxNode for VarDef {
    fn kind(&self) -> NodeKind {
        NodeKind::VarDef
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![Element::Token(&self.ident)];
        for dim in &self.dims {
            dim.push_children(&mut out);
        }
        if let Some((assign, init)) = &self.init {
            out.push(Element::Token(assign));
            out.push(Element::Node(init));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitVal {
    pub line: usize,
    pub kind: Initializer<InitVal, Exp>,
}

impl SyntaxNode for InitVal {
    fn kind(&self) -> NodeKind {
        NodeKind::InitVal
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        self.kind.children()
    }
}

// ===== Functions =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncDef {
    pub func_type: FuncType,
    pub ident: Token,
    pub lparen: Token,
    pub params: Option<FuncFParams>,
    pub rparen: Token,
    pub body: Block,
    pub line: usize,
}

impl SyntaxNode for FuncDef {
    fn kind(&self) -> NodeKind {
        NodeKind::FuncDef
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![
            Element::Node(&self.func_type),
            Element::Token(&self.ident),
            Element::Token(&self.lparen),
        ];
        if let Some(params) = &self.params {
            out.push(Element::Node(params));
        }
        out.push(Element::Token(&self.rparen));
        out.push(Element::Node(&self.body));
        out
    }
}

/// `int main ( ) Block`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainFuncDef {
    pub int_kw: Token,
    pub main_kw: Token,
    pub lparen: Token,
    pub rparen: Token,
    pub body: Block,
    pub line: usize,
}

impl SyntaxNode for MainFuncDef {
    fn kind(&self) -> NodeKind {
        NodeKind::MainFuncDef
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![
            Element::Token(&self.int_kw),
            Element::Token(&self.main_kw),
            Element::Token(&self.lparen),
            Element::Token(&self.rparen),
            Element::Node(&self.body),
        ]
    }
}

/// `void` or `int`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncType {
    pub keyword: Token,
    pub line: usize,
}

impl SyntaxNode for FuncType {
    fn kind(&self) -> NodeKind {
        NodeKind::FuncType
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![Element::Token(&self.keyword)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncFParams {
    pub params: Separated<FuncFParam>,
    pub line: usize,
}

impl SyntaxNode for FuncFParams {
    fn kind(&self) -> NodeKind {
        NodeKind::FuncFParams
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = Vec::new();
        self.params.push_children(&mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncFParam {
    pub btype: BType,
    pub ident: Token,
    pub array: Option<ArrayParam>,
    pub line: usize,
}

/// `[]` followed by zero or more sized dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayParam {
    pub lbracket: Token,
    pub rbracket: Token,
    pub dims: Vec<Bracketed<ConstExp>>,
}

impl FuncFParam {
    /// Array rank, counting the decayed first dimension
    pub fn rank(&self) -> usize {
        self.array.as_ref().map_or(0, |a| 1 + a.dims.len())
    }
}

impl SyntaxNode for FuncFParam {
    fn kind(&self) -> NodeKind {
        NodeKind::FuncFParam
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![Element::Node(&self.btype), Element::Token(&self.ident)];
        if let Some(array) = &self.array {
            out.push(Element::Token(&array.lbracket));
            out.push(Element::Token(&array.rbracket));
            for dim in &array.dims {
                dim.push_children(&mut out);
            }
        }
        out
    }
}

// ===== Blocks and statements =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub lbrace: Token,
    pub items: Vec<BlockItem>,
    pub rbrace: Token,
    pub line: usize,
}

impl SyntaxNode for Block {
    fn kind(&self) -> NodeKind {
        NodeKind::Block
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![Element::Token(&self.lbrace)];
        out.extend(self.items.iter().map(|item| Element::Node(item)));
        out.push(Element::Token(&self.rbrace));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockItem {
    pub line: usize,
    pub kind: BlockItemKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BlockItemKind {
    Decl(Decl),
    Stmt(Stmt),
}

impl SyntaxNode for BlockItem {
    fn kind(&self) -> NodeKind {
        NodeKind::BlockItem
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        match &self.kind {
            BlockItemKind::Decl(decl) => vec![Element::Node(decl)],
            BlockItemKind::Stmt(stmt) => vec![Element::Node(stmt)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stmt {
    pub line: usize,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StmtKind {
    /// `LVal = Exp ;`
    Assign {
        lval: LVal,
        assign: Token,
        exp: Exp,
        semicolon: Token,
    },
    /// `LVal = getint ( ) ;`
    GetInt {
        lval: LVal,
        assign: Token,
        getint_kw: Token,
        lparen: Token,
        rparen: Token,
        semicolon: Token,
    },
    /// `[Exp] ;` where a lone `;` is the empty statement
    Expr {
        exp: Option<Exp>,
        semicolon: Token,
    },
    Block(Block),
    If {
        if_kw: Token,
        lparen: Token,
        cond: Cond,
        rparen: Token,
        then_branch: Box<Stmt>,
        else_branch: Option<(Token, Box<Stmt>)>,
    },
    While {
        while_kw: Token,
        lparen: Token,
        cond: Cond,
        rparen: Token,
        body: Box<Stmt>,
    },
    Break {
        keyword: Token,
        semicolon: Token,
    },
    Continue {
        keyword: Token,
        semicolon: Token,
    },
    Return {
        keyword: Token,
        exp: Option<Exp>,
        semicolon: Token,
    },
    Printf {
        printf_kw: Token,
        lparen: Token,
        format: Token,
        args: Vec<(Token, Exp)>,
        rparen: Token,
        semicolon: Token,
    },
}

impl SyntaxNode for Stmt {
    fn kind(&self) -> NodeKind {
        NodeKind::Stmt
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        match &self.kind {
            StmtKind::Assign {
                lval,
                assign,
                exp,
                semicolon,
            } => vec![
                Element::Node(lval),
                Element::Token(assign),
                Element::Node(exp),
                Element::Token(semicolon),
            ],
            StmtKind::GetInt {
                lval,
                assign,
                getint_kw,
                lparen,
                rparen,
                semicolon,
            } => vec![
                Element::Node(lval),
                Element::Token(assign),
                Element::Token(getint_kw),
                Element::Token(lparen),
                Element::Token(rparen),
                Element::Token(semicolon),
            ],
            StmtKind::Expr { exp, semicolon } => {
                let mut out = Vec::new();
                if let Some(exp) = exp {
                    out.push(Element::Node(exp));
                }
                out.push(Element::Token(semicolon));
                out
            }
            StmtKind::Block(block) => vec![Element::Node(block)],
            StmtKind::If {
                if_kw,
                lparen,
                cond,
                rparen,
                then_branch,
                else_branch,
            } => {
                let mut out = vec![
                    Element::Token(if_kw),
                    Element::Token(lparen),
                    Element::Node(cond),
                    Element::Token(rparen),
                    Element::Node(then_branch.as_ref()),
                ];
                if let Some((else_kw, stmt)) = else_branch {
                    out.push(Element::Token(else_kw));
                    out.push(Element::Node(stmt.as_ref()));
                }
                out
            }
            StmtKind::While {
                while_kw,
                lparen,
                cond,
                rparen,
                body,
            } => vec![
                Element::Token(while_kw),
                Element::Token(lparen),
                Element::Node(cond),
                Element::Token(rparen),
                Element::Node(body.as_ref()),
            ],
            StmtKind::Break { keyword, semicolon }
            | StmtKind::Continue { keyword, semicolon } => {
                vec![Element::Token(keyword), Element::Token(semicolon)]
            }
            StmtKind::Return {
                keyword,
                exp,
                semicolon,
            } => {
                let mut out = vec![Element::Token(keyword)];
                if let Some(exp) = exp {
                    out.push(Element::Node(exp));
                }
                out.push(Element::Token(semicolon));
                out
            }
            StmtKind::Printf {
                printf_kw,
                lparen,
                format,
                args,
                rparen,
                semicolon,
            } => {
                let mut out = vec![
                    Element::Token(printf_kw),
                    Element::Token(lparen),
                    Element::Token(format),
                ];
                for (comma, exp) in args {
                    out.push(Element::Token(comma));
                    out.push(Element::Node(exp));
                }
                out.push(Element::Token(rparen));
                out.push(Element::Token(semicolon));
                out
            }
        }
    }
}

// ===== Expressions =====

/// General expression; additive level only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exp {
    pub add: AddExp,
    pub line: usize,
}

impl SyntaxNode for Exp {
    fn kind(&self) -> NodeKind {
        NodeKind::Exp
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![Element::Node(&self.add)]
    }
}

/// Condition of `if`/`while`; the only place logical operators appear
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cond {
    pub lor: LOrExp,
    pub line: usize,
}

impl SyntaxNode for Cond {
    fn kind(&self) -> NodeKind {
        NodeKind::Cond
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![Element::Node(&self.lor)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstExp {
    pub add: AddExp,
    pub line: usize,
}

impl SyntaxNode for ConstExp {
    fn kind(&self) -> NodeKind {
        NodeKind::ConstExp
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![Element::Node(&self.add)]
    }
}

/// Identifier with optional index expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LVal {
    pub ident: Token,
    pub indices: Vec<Bracketed<Exp>>,
    pub line: usize,
}

impl SyntaxNode for LVal {
    fn kind(&self) -> NodeKind {
        NodeKind::LVal
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = vec![Element::Token(&self.ident)];
        for index in &self.indices {
            index.push_children(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryExp {
    pub line: usize,
    pub kind: PrimaryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrimaryKind {
    Paren {
        lparen: Token,
        exp: Box<Exp>,
        rparen: Token,
    },
    Number(Number),
    LVal(LVal),
}

impl SyntaxNode for PrimaryExp {
    fn kind(&self) -> NodeKind {
        NodeKind::PrimaryExp
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        match &self.kind {
            PrimaryKind::Paren {
                lparen,
                exp,
                rparen,
            } => vec![
                Element::Token(lparen),
                Element::Node(exp.as_ref()),
                Element::Token(rparen),
            ],
            PrimaryKind::Number(number) => vec![Element::Node(number)],
            PrimaryKind::LVal(lval) => vec![Element::Node(lval)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Number {
    pub int_const: Token,
    pub line: usize,
}

impl SyntaxNode for Number {
    fn kind(&self) -> NodeKind {
        NodeKind::Number
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![Element::Token(&self.int_const)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnaryExp {
    pub line: usize,
    pub kind: UnaryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UnaryKind {
    Primary(PrimaryExp),
    /// `ident ( [FuncRParams] )`
    Call {
        ident: Token,
        lparen: Token,
        args: Option<Box<FuncRParams>>,
        rparen: Token,
    },
    /// One prefix operator per nesting level
    Unary {
        op: UnaryOp,
        operand: Box<UnaryExp>,
    },
}

impl SyntaxNode for UnaryExp {
    fn kind(&self) -> NodeKind {
        NodeKind::UnaryExp
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        match &self.kind {
            UnaryKind::Primary(primary) => vec![Element::Node(primary)],
            UnaryKind::Call {
                ident,
                lparen,
                args,
                rparen,
            } => {
                let mut out = vec![Element::Token(ident), Element::Token(lparen)];
                if let Some(args) = args {
                    out.push(Element::Node(args.as_ref()));
                }
                out.push(Element::Token(rparen));
                out
            }
            UnaryKind::Unary { op, operand } => {
                vec![Element::Node(op), Element::Node(operand.as_ref())]
            }
        }
    }
}

/// `+`, `-` or `!`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnaryOp {
    pub token: Token,
    pub line: usize,
}

impl SyntaxNode for UnaryOp {
    fn kind(&self) -> NodeKind {
        NodeKind::UnaryOp
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        vec![Element::Token(&self.token)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncRParams {
    pub args: Separated<Exp>,
    pub line: usize,
}

impl SyntaxNode for FuncRParams {
    fn kind(&self) -> NodeKind {
        NodeKind::FuncRParams
    }

    fn line(&self) -> usize {
        self.line
    }

    fn children(&self) -> Vec<Element<'_>> {
        let mut out = Vec::new();
        self.args.push_children(&mut out);
        out
    }
}

/// Defines one left-associative precedence level: a flat chain of
/// next-tighter operands joined by this level's operators.
macro_rules! binary_level {
    ($(#[$meta:meta])* $name:ident, $operand:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub operands: Separated<$operand>,
            pub line: usize,
        }

        impl SyntaxNode for $name {
            fn kind(&self) -> NodeKind {
                NodeKind::$name
            }

            fn line(&self) -> usize {
                self.line
            }

            fn children(&self) -> Vec<Element<'_>> {
                let mut out = Vec::new();
                self.operands.push_children(&mut out);
                out
            }
        }
    };
}

binary_level!(
    /// `*`, `/`, `%`
    MulExp,
    UnaryExp
);
binary_level!(
    /// `+`, `-`
    AddExp,
    MulExp
);
binary_level!(
    /// `<`, `>`, `<=`, `>=`
    RelExp,
    AddExp
);
binary_level!(
    /// `==`, `!=`
    EqExp,
    RelExp
);
binary_level!(LAndExp, EqExp);
binary_level!(LOrExp, LAndExp);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::TokenKind;

    fn tok(kind: TokenKind, lexeme: &str, line: usize) -> Token {
        Token::new(kind, lexeme, SourceLocation::new(line, 1))
    }

    fn number(lexeme: &str, line: usize) -> UnaryExp {
        UnaryExp {
            line,
            kind: UnaryKind::Primary(PrimaryExp {
                line,
                kind: PrimaryKind::Number(Number {
                    int_const: tok(TokenKind::IntConst, lexeme, line),
                    line,
                }),
            }),
        }
    }

    #[test]
    fn test_separated_counts() {
        let mut list = Separated::new(1);
        list.push(tok(TokenKind::Comma, ",", 1), 2);
        list.push(tok(TokenKind::Comma, ",", 1), 3);

        assert_eq!(list.len(), 3);
        assert_eq!(list.items().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(list.separators().count(), 2);
    }

    #[test]
    fn test_binary_level_children_alternate() {
        let mut operands = Separated::new(number("1", 1));
        operands.push(tok(TokenKind::Star, "*", 1), number("2", 2));
        let mul = MulExp { operands, line: 1 };

        let children = mul.children();
        assert_eq!(children.len(), 3);
        assert!(matches!(
            children[0],
            Element::Node(n) if n.kind() == NodeKind::UnaryExp
        ));
        assert!(matches!(
            children[1],
            Element::Token(t) if t.kind == TokenKind::Star
        ));
        assert!(matches!(children[2], Element::Node(n) if n.line() == 2));
    }

    #[test]
    fn test_terminals_in_order() {
        let lval = LVal {
            ident: tok(TokenKind::Ident, "a", 1),
            indices: vec![Bracketed {
                open: tok(TokenKind::LBracket, "[", 1),
                inner: Exp {
                    add: AddExp {
                        operands: Separated::new(MulExp {
                            operands: Separated::new(number("0", 1)),
                            line: 1,
                        }),
                        line: 1,
                    },
                    line: 1,
                },
                close: tok(TokenKind::RBracket, "]", 1),
            }],
            line: 1,
        };

        let lexemes: Vec<_> = terminals(&lval)
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(lexemes, vec!["a", "[", "0", "]"]);
    }

    #[test]
    fn test_single_initializer_has_no_aggregate_len() {
        let init = InitVal {
            line: 2,
            kind: Initializer::Single(Exp {
                add: AddExp {
                    operands: Separated::new(MulExp {
                        operands: Separated::new(number("5", 2)),
                        line: 2,
                    }),
                    line: 2,
                },
                line: 2,
            }),
        };

        assert_eq!(init.kind.aggregate_len(), None);
    }

    #[test]
    fn test_empty_aggregate_has_braces_only() {
        let init = InitVal {
            line: 4,
            kind: Initializer::Aggregate {
                lbrace: tok(TokenKind::LBrace, "{", 4),
                items: None,
                rbrace: tok(TokenKind::RBrace, "}", 4),
            },
        };

        assert_eq!(init.kind.aggregate_len(), Some(0));
        assert_eq!(init.children().len(), 2);
    }
}
