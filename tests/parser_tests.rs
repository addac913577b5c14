//! End-to-end tests for the minic syntax analyzer
//!
//! Each test feeds complete source text through the lexer and parser and
//! checks the resulting tree through its public, kind-agnostic view.

use minic::parser::ast::*;
use minic::parser::lexer::{Lexer, TokenKind};
use minic::parser::parse::{Parser, SyntaxError, MAX_NESTING};
use minic::{parse_source, Error};
use rstest::rstest;

fn parse(source: &str) -> CompUnit {
    parse_source(source)
        .unwrap_or_else(|e| panic!("Parsing failed: {}\n{}", e, source))
}

/// Statements of `main`, in order
fn main_stmts(unit: &CompUnit) -> Vec<&StmtKind> {
    unit.main_func_def
        .body
        .items
        .iter()
        .filter_map(|item| match &item.kind {
            BlockItemKind::Stmt(stmt) => Some(&stmt.kind),
            BlockItemKind::Decl(_) => None,
        })
        .collect()
}

fn find<'a>(
    node: &'a dyn SyntaxNode,
    kind: NodeKind,
) -> Option<&'a dyn SyntaxNode> {
    if node.kind() == kind {
        return Some(node);
    }
    node.children().into_iter().find_map(|child| match child {
        Element::Node(inner) => find(inner, kind),
        Element::Token(_) => None,
    })
}

fn assert_lines_propagate(node: &dyn SyntaxNode) {
    let first = terminals(node)[0].line();
    assert_eq!(node.line(), first, "{} starts on line {}", node.kind(), first);
    for child in node.children() {
        if let Element::Node(inner) = child {
            assert_lines_propagate(inner);
        }
    }
}

const SAMPLE: &str = r#"const int N = 4, M[2] = {1, 2};
int grid[N][N];

int sum(int a[], int n) {
    int i = 0, s = 0;
    while (i < n) {
        s = s + a[i];
        i = i + 1;
    }
    return s;
}

void show(int v) {
    printf("%d\n", v);
}

int main() {
    int x;
    x = getint();
    if (x >= 0 && x != N)
        show(sum(M, 2) * x);
    else {
        ;
    }
    return 0;
}
"#;

#[rstest]
#[case::minimal("int main() { return 0; }")]
#[case::empty_statements("int main() { ; {} {;} }")]
#[case::globals(
    "const int N = 3; int g[N] = {1, 2, 3}; int main() { return g[0]; }"
)]
#[case::void_function("void f() { return; } int main() { f(); return 0; }")]
#[case::call_arguments(
    r#"int add(int a, int b) { return a + b; }
       int main() { printf("%d\n", add(1, 2)); return 0; }"#
)]
#[case::loops(
    "int main() { int x; x = getint(); while (x > 0) {
         if (x % 2 == 0) continue; else x = x - 1; break;
     } return x; }"
)]
#[case::array_params(
    "int sum(int a[], int m[][3]) { return a[0] + m[1][2]; }
     int main() { return 0; }"
)]
#[case::nested_initializers(
    "int main() { int a[2][2] = {{}, {1, 2}}; return -+!a[1][0]; }"
)]
#[case::logical_condition(
    "int main() { int a, b, c, x; if (a || b && !c) x = 1; return 0; }"
)]
#[case::moderate_nesting(
    "int main() { { { { if (1) if (1) while (1) x = ((((1)))); } } } }"
)]
#[case::comments("// leading\nint main() { /* inline */ return 0; }")]
#[case::sample(SAMPLE)]
fn test_valid_programs(#[case] source: &str) {
    let unit = parse(source);
    assert_eq!(unit.kind(), NodeKind::CompUnit);
}

#[rstest]
#[case::empty_input("")]
#[case::declarations_only("int a; const int b = 1;")]
#[case::missing_semicolon("int main() { return 0 }")]
#[case::unterminated_declaration("int main() { int a = 1 }")]
#[case::void_main("void main() {}")]
#[case::trailing_definition("int main() {} int x;")]
#[case::broken_getint("int main() { int a; a = getint(; }")]
#[case::if_without_body("int main() { if (1) }")]
#[case::printf_without_format("int main() { printf(x); }")]
#[case::logical_outside_condition("int main() { return 1 && 2; }")]
#[case::unsized_local_array("int main() { int a[] = {1}; }")]
#[case::const_without_value("int main() { const int a; }")]
#[case::unclosed_main("int main() { return 0;")]
fn test_invalid_programs(#[case] source: &str) {
    assert!(matches!(parse_source(source), Err(Error::Syntax(_))));
}

#[test]
fn test_lex_errors_surface_separately() {
    let err = parse_source("int main() { return 1 & 2; }").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
}

#[test]
fn test_parsing_is_deterministic() {
    assert_eq!(parse(SAMPLE), parse(SAMPLE));
}

#[test]
fn test_tree_consumes_every_token() {
    let tokens = Lexer::new(SAMPLE).tokenize().unwrap();
    let unit = parse(SAMPLE);

    let lexemes: Vec<_> = terminals(&unit)
        .iter()
        .map(|t| t.lexeme.clone())
        .collect();
    let expected: Vec<_> = tokens.iter().map(|t| t.lexeme.clone()).collect();
    assert_eq!(lexemes, expected);
}

#[test]
fn test_node_lines_follow_first_terminal() {
    let unit = parse(SAMPLE);
    assert_lines_propagate(&unit);

    assert_eq!(unit.func_defs[0].line, 4);
    assert_eq!(unit.func_defs[1].line, 13);
    assert_eq!(unit.main_func_def.line, 17);
}

#[test]
fn test_additive_chain_is_one_flat_node() {
    let unit = parse("int main() { int a, b, c; return a + b - c; }");
    let add = find(&unit, NodeKind::AddExp).unwrap();

    let children = add.children();
    assert_eq!(children.len(), 5);
    assert!(matches!(children[1], Element::Token(t) if t.kind == TokenKind::Plus));
    assert!(matches!(children[3], Element::Token(t) if t.kind == TokenKind::Minus));
    assert!(children
        .iter()
        .step_by(2)
        .all(|c| matches!(c, Element::Node(n) if n.kind() == NodeKind::MulExp)));
}

#[test]
fn test_else_binds_to_nearest_if() {
    let unit = parse(
        "int main() { int a, b, x; if (a) if (b) x = 1; else x = 2; return x; }",
    );
    let stmts = main_stmts(&unit);
    let StmtKind::If {
        then_branch,
        else_branch,
        ..
    } = stmts[0]
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
fn test_statements_starting_with_lvalue() {
    let unit = parse(
        "int main() { int a[2]; a[0] = getint(); a[1] = 1 + 2; a[0]; return 0; }",
    );
    let stmts = main_stmts(&unit);

    assert!(matches!(stmts[0], StmtKind::GetInt { .. }));
    assert!(matches!(stmts[1], StmtKind::Assign { .. }));

    let StmtKind::Expr { exp: Some(exp), .. } = stmts[2] else {
        panic!("Expected expression statement");
    };
    assert!(matches!(
        &exp.add.operands.first.operands.first.kind,
        UnaryKind::Primary(PrimaryExp {
            kind: PrimaryKind::LVal(lval),
            ..
        }) if lval.indices.len() == 1
    ));
}

#[test]
fn test_empty_aggregate_initializer() {
    let unit = parse("int a[2] = {}; int main() { return 0; }");
    let DeclKind::Var(decl) = &unit.decls[0].kind else {
        panic!("Expected variable declaration");
    };

    let (_, init) = decl.defs.first.init.as_ref().unwrap();
    assert!(matches!(
        init.kind,
        Initializer::Aggregate { items: None, .. }
    ));
    assert_eq!(init.kind.aggregate_len(), Some(0));
    assert_eq!(init.children().len(), 2);
}

#[test]
fn test_empty_constant_aggregate_initializer() {
    let unit = parse("const int a[2] = {}; int main() { return 0; }");
    let DeclKind::Const(decl) = &unit.decls[0].kind else {
        panic!("Expected constant declaration");
    };

    let def = &decl.defs.first;
    assert_eq!(def.dims.len(), 1);
    assert!(matches!(
        def.init.kind,
        Initializer::Aggregate { items: None, .. }
    ));
    assert_eq!(def.init.kind.aggregate_len(), Some(0));
    assert_eq!(def.init.children().len(), 2);
}

#[test]
fn test_call_and_parenthesized_identifier_differ() {
    let unit = parse(
        "int f(int x) { return x; }
         int main() { int x; x = f(x); x = (x); return 0; }",
    );
    let stmts = main_stmts(&unit);

    let unary_of = |stmt: &StmtKind| match stmt {
        StmtKind::Assign { exp, .. } => {
            exp.add.operands.first.operands.first.clone()
        }
        _ => panic!("Expected assignment"),
    };

    assert!(matches!(unary_of(stmts[0]).kind, UnaryKind::Call { .. }));
    assert!(matches!(
        unary_of(stmts[1]).kind,
        UnaryKind::Primary(PrimaryExp {
            kind: PrimaryKind::Paren { .. },
            ..
        })
    ));
}

#[test]
fn test_malformed_statement_truncates_block() {
    let source = "int main() {\n    int a = 1;\n    a = ;\n    return a;\n}\n";
    let mut parser = Parser::from_source(source).unwrap();
    let err = parser.parse_comp_unit().unwrap_err();

    // Reported at the start of the bad statement, as a missing `}`
    assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
    assert_eq!(err.expected(), "'}' to close block");
    assert_eq!(err.position(), 10);
    assert_eq!(err.line(), 3);

    // The discarded failure points at the real problem
    let deepest = parser.deepest_rejection().unwrap();
    assert_eq!(deepest.position(), 12);
    assert_eq!(deepest.expected(), "expression");
}

#[test]
fn test_declarations_without_main_run_out_of_input() {
    let err = parse_source("int a; int f() { return 0; }").unwrap_err();
    assert!(matches!(err, Error::Syntax(SyntaxError::UnexpectedEof { .. })));
}

/// Parse `source` as a whole unit and return the furthest swallowed failure
fn nesting_failure(source: &str) -> SyntaxError {
    let mut parser = Parser::from_source(source).unwrap();
    let err = parser.parse_comp_unit().unwrap_err();
    match parser.deepest_rejection() {
        Some(deeper) if deeper.position() > err.position() => deeper.clone(),
        _ => err,
    }
}

#[rstest]
#[case::parentheses(format!(
    "int main() {{ return {}1{}; }}",
    "(".repeat(3000),
    ")".repeat(3000)
))]
#[case::unary_operators(format!("int main() {{ return {}1; }}", "-".repeat(3000)))]
#[case::blocks(format!(
    "int main() {{ {}{} }}",
    "{".repeat(3000),
    "}".repeat(3000)
))]
#[case::if_statements(format!(
    "int main() {{ {}x = 1; }}",
    "if (1) ".repeat(3000)
))]
#[case::while_statements(format!(
    "int main() {{ {}; }}",
    "while (1) ".repeat(3000)
))]
#[case::initializers(format!(
    "int main() {{ int a = {}1{}; }}",
    "{".repeat(3000),
    "}".repeat(3000)
))]
#[case::call_arguments(format!(
    "int main() {{ return {}1{}; }}",
    "f(".repeat(3000),
    ")".repeat(3000)
))]
#[case::array_indices(format!(
    "int main() {{ return {}0{}; }}",
    "a[".repeat(3000),
    "]".repeat(3000)
))]
fn test_deep_nesting_is_a_syntax_error(#[case] source: String) {
    assert!(matches!(parse_source(&source), Err(Error::Syntax(_))));
    assert_eq!(nesting_failure(&source).expected(), "shallower nesting");
}

#[test]
fn test_nesting_up_to_the_limit_parses() {
    // `return` adds one level for its expression
    let depth = MAX_NESTING - 4;
    let source = format!(
        "int main() {{ return {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    assert!(parse_source(&source).is_ok());
}
