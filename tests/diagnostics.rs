use std::cell::Cell;

use formulary::{
    Diagnostic, ErrorMode, Expression, Parser, Resolution, Settings, SymbolTable,
    settings::DEFAULT_MAX_DEPTH,
};
use pretty_assertions::assert_eq;

/// Compiles `src` against `symbols` and returns the diagnostics.
fn diagnostics_with(symbols: &SymbolTable, src: &str) -> Vec<Diagnostic> {
    let mut expression = Expression::new();
    expression.register_symbol_table(symbols);

    let mut parser = Parser::new();
    let compiled = parser.compile(src, &mut expression);
    assert_eq!(compiled, parser.error_count() == 0);
    assert_eq!(compiled, expression.is_compiled());

    parser.errors().to_vec()
}

fn diagnostics(src: &str) -> Vec<Diagnostic> {
    diagnostics_with(&SymbolTable::new(), src)
}

fn rendered(src: &str) -> Vec<String> {
    diagnostics(src).iter().map(ToString::to_string).collect()
}

#[test]
fn undefined_symbol_is_fully_described() {
    assert_eq!(diagnostics("x + 1"),
               vec![Diagnostic { mode:        ErrorMode::Symtab,
                                 token_type:  "SYMBOL",
                                 token_value: "x".to_string(),
                                 message:     "undefined symbol: 'x'".to_string(),
                                 source_line: "x + 1".to_string(),
                                 line:        1,
                                 column:      1, }]);
}

#[test]
fn positions_are_line_and_column() {
    let found = diagnostics("1 +\n  foo");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source_line, "  foo");
    assert_eq!(found[0].to_string(), "2:3: symbol error: undefined symbol: 'foo'");
}

#[test]
fn undefined_symbols_are_reported_once() {
    assert_eq!(rendered("y + y * y"), vec!["1:1: symbol error: undefined symbol: 'y'"]);
}

#[test]
fn syntax_errors_resynchronize_at_semicolons() {
    assert_eq!(rendered("1 +; 2 *; 3"),
               vec!["1:4: syntax error: unexpected token ';'",
                    "1:9: syntax error: unexpected token ';'"]);
}

#[test]
fn every_lexical_error_is_reported() {
    let found = diagnostics("1 $ 2 @");
    assert_eq!(found.iter().map(|d| d.mode).collect::<Vec<_>>(),
               vec![ErrorMode::Lexer, ErrorMode::Lexer]);
    assert_eq!(found.iter().map(|d| d.token_value.as_str()).collect::<Vec<_>>(),
               vec!["$", "@"]);
    assert_eq!(found.iter().map(|d| d.column).collect::<Vec<_>>(), vec![3, 7]);
}

#[test]
fn malformed_literals_are_lexical_errors() {
    let messages = |src: &str| {
        diagnostics(src).into_iter()
                        .map(|d| (d.mode, d.message))
                        .collect::<Vec<_>>()
    };

    assert_eq!(messages("1e3 + 2e"),
               vec![(ErrorMode::Lexer, "malformed number literal".to_string())]);
    assert_eq!(messages("'abc"),
               vec![(ErrorMode::Lexer, "unterminated string literal".to_string())]);
    assert_eq!(messages("1 + /* never closed\n 2"),
               vec![(ErrorMode::Lexer, "unterminated comment".to_string())]);
    assert_eq!(messages("'a\\qb'"),
               vec![(ErrorMode::Lexer, "invalid escape sequence in string literal".to_string())]);
}

#[test]
fn kinds_of_errors_are_collected_in_order() {
    assert_eq!(rendered("a + 'x'; b"),
               vec!["1:1: symbol error: undefined symbol: 'a'",
                    "1:3: type error: operator '+' cannot be applied to a scalar and a string",
                    "1:10: symbol error: undefined symbol: 'b'"]);
}

#[test]
fn type_errors_name_the_operator() {
    let found = diagnostics("'a' * 2");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].mode, ErrorMode::Parser);
    assert_eq!(found[0].token_value, "*");
    assert_eq!(found[0].message, "operator '*' cannot be applied to a string and a scalar");
}

#[test]
fn premature_end_points_past_the_source() {
    let found = diagnostics("1 +");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].token_type, "EOF");
    assert_eq!(found[0].to_string(), "1:4: syntax error: unexpected end of expression");
}

#[test]
fn empty_source_is_an_error() {
    assert_eq!(rendered(""), vec!["1:1: syntax error: empty expression"]);
    assert_eq!(rendered("  ;  // nothing"), vec!["1:16: syntax error: empty expression"]);
}

#[test]
fn arity_mismatch_is_a_syntax_error() {
    let found = diagnostics("hypot(1)");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].mode, ErrorMode::Syntax);
    assert_eq!(found[0].token_value, "hypot");
    assert_eq!(found[0].message, "arity mismatch: 'hypot' takes 2 arguments, got 1");

    let symbols = SymbolTable::new();
    symbols.add_function1("f", |x| x).unwrap();
    let found = diagnostics_with(&symbols, "f(1, 2)");
    assert_eq!(found[0].message, "arity mismatch: 'f' takes 1 argument, got 2");
}

#[test]
fn unknown_functions_and_constants() {
    assert_eq!(rendered("foo(1)"), vec!["1:1: symbol error: undefined function: 'foo'"]);

    let symbols = SymbolTable::new();
    symbols.add_constants();
    assert_eq!(diagnostics_with(&symbols, "pi := 3").into_iter()
                                                    .map(|d| (d.mode, d.message))
                                                    .collect::<Vec<_>>(),
               vec![(ErrorMode::Parser, "cannot assign to constant 'pi'".to_string())]);
}

#[test]
fn chained_comparison_is_rejected() {
    assert_eq!(rendered("1 < 2 < 3"),
               vec!["1:7: syntax error: comparison operators do not chain"]);
}

#[test]
fn nesting_depth_is_bounded() {
    let mut expression = Expression::new();
    let mut parser = Parser::with_settings(Settings::default().with_max_depth(10));

    assert!(parser.compile("((1))", &mut expression));
    assert!(!parser.compile("((((((((((((1))))))))))))", &mut expression));
    assert_eq!(parser.error_count(), 1);
    assert_eq!(parser.error(0).unwrap().message, "expression nesting exceeds 10 levels");
}

#[test]
fn deep_chains_stop_at_the_depth_limit() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 1.0).unwrap();
    symbols.create_stringvar("s", "abc").unwrap();

    let limit = format!("expression nesting exceeds {DEFAULT_MAX_DEPTH} levels");
    let chains = ["x ? 1 : ".repeat(10_000) + "0",
                  "x := ".repeat(10_000) + "1",
                  "(".repeat(10_000) + "1" + &")".repeat(10_000),
                  "{".repeat(10_000) + "1" + &"}".repeat(10_000),
                  "-".repeat(10_000) + "x",
                  "not ".repeat(10_000) + "x",
                  "x".to_string() + &"^x".repeat(10_000),
                  "if (x) ".repeat(10_000) + "1",
                  "abs(".repeat(10_000) + "x" + &")".repeat(10_000),
                  "s".to_string() + &"[0:2]".repeat(10_000)];

    for src in &chains {
        let found = diagnostics_with(&symbols, src);
        assert_eq!(found.iter().map(|d| (d.mode, d.message.as_str())).collect::<Vec<_>>(),
                   vec![(ErrorMode::Syntax, limit.as_str())],
                   "{}...",
                   &src[..20]);
    }
}

#[test]
fn deepest_accepted_nesting_compiles() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 2.0).unwrap();

    let levels = DEFAULT_MAX_DEPTH - 1;
    let src = "(".repeat(levels) + "x" + &")".repeat(levels);
    assert_eq!(Expression::compile(&src, &symbols).unwrap().value(), 2.0);

    let src = "(".repeat(levels + 1) + "x" + &")".repeat(levels + 1);
    assert!(Expression::compile(&src, &symbols).is_err());
}

#[test]
fn diagnostics_are_cleared_by_the_next_compilation() {
    let mut expression = Expression::new();
    let mut parser = Parser::new();

    assert!(!parser.compile("1 +", &mut expression));
    assert_eq!(parser.error_count(), 1);

    assert!(parser.compile("1 + 2", &mut expression));
    assert_eq!(parser.error_count(), 0);
    assert_eq!(parser.error(0), None);
    assert_eq!(expression.value(), 3.0);

    assert!(!parser.compile("1 +", &mut expression));
    assert!(!expression.is_compiled());
}

#[test]
fn compile_error_summarizes_the_diagnostics() {
    let error = Expression::compile("1 +; 2 *", &SymbolTable::new()).unwrap_err();

    assert_eq!(error.diagnostics().len(), 2);
    assert_eq!(error.to_string(), "1:4: syntax error: unexpected token ';' (and 1 more)");
}

#[test]
fn resolver_creates_deferred_variables() {
    let symbols = SymbolTable::new();
    let mut expression = Expression::new();
    expression.register_symbol_table(&symbols);

    let calls = Cell::new(0);
    let mut resolver = |_: &str, _: &SymbolTable| {
        calls.set(calls.get() + 1);
        Resolution::Resolved
    };

    let mut parser = Parser::new();
    assert!(parser.compile_with_resolver("a * b + a", &mut expression, &mut resolver));
    assert_eq!(calls.get(), 2);
    assert_eq!(parser.resolved_symbols(), ["a".to_string(), "b".to_string()]);
    assert_eq!(symbols.get_variable_list(), vec!["a", "b"]);
    assert_eq!(expression.value(), 0.0);

    symbols.variable_ref("a").unwrap().set(2.0);
    symbols.variable_ref("b").unwrap().set(5.0);
    assert_eq!(expression.value(), 12.0);
}

#[test]
fn resolver_may_bind_the_name_itself() {
    let symbols = SymbolTable::new();
    let mut expression = Expression::new();
    expression.register_symbol_table(&symbols);

    let mut resolver = |name: &str, table: &SymbolTable| match table.create_stringvar(name, "bound") {
        Ok(()) => Resolution::Resolved,
        Err(e) => Resolution::Failed(e.to_string()),
    };

    let mut parser = Parser::new();
    assert!(parser.compile_with_resolver("greeting + '!'", &mut expression, &mut resolver));
    assert_eq!(expression.evaluate(), formulary::Value::from("bound!"));
    assert_eq!(symbols.variable_count(), 0);
}

#[test]
fn resolver_failures_carry_their_message() {
    let symbols = SymbolTable::new();
    let mut expression = Expression::new();
    expression.register_symbol_table(&symbols);

    let calls = Cell::new(0);
    let mut resolver = |name: &str, _: &SymbolTable| {
        calls.set(calls.get() + 1);
        Resolution::Failed(format!("no input named '{name}'"))
    };

    let mut parser = Parser::new();
    assert!(!parser.compile_with_resolver("u + u", &mut expression, &mut resolver));
    assert_eq!(calls.get(), 1);
    assert_eq!(parser.errors().iter().map(ToString::to_string).collect::<Vec<_>>(),
               vec!["1:1: symbol error: no input named 'u'"]);
    assert!(parser.resolved_symbols().is_empty());
}
