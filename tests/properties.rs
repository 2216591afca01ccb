use formulary::{
    Expression, Parser, Settings, SymbolTable, Value, evaluate, interpreter::lexer::tokenize,
};
use proptest::prelude::*;

fn bound(x: f64, y: f64, z: f64) -> SymbolTable {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", x).unwrap();
    symbols.create_variable("y", y).unwrap();
    symbols.create_variable("z", z).unwrap();
    symbols
}

fn value_of(symbols: &SymbolTable, src: &str) -> f64 {
    Expression::compile(src, symbols).unwrap().value()
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

proptest! {
    #[test]
    fn operators_match_ieee_arithmetic(x in -1e6f64..1e6, y in -1e6f64..1e6, z in -1e3f64..1e3) {
        let symbols = bound(x, y, z);

        prop_assert!(same(value_of(&symbols, "x + y * z"), x + y * z));
        prop_assert!(same(value_of(&symbols, "(x + y) * z"), (x + y) * z));
        prop_assert!(same(value_of(&symbols, "x - y - z"), (x - y) - z));
        prop_assert!(same(value_of(&symbols, "x / y"), x / y));
        prop_assert!(same(value_of(&symbols, "x % y"), x % y));
        prop_assert!(same(value_of(&symbols, "-x^2"), -(x.powf(2.0))));
    }

    #[test]
    fn comparisons_yield_truth_values(x in -100i32..100, y in -100i32..100) {
        let symbols = bound(f64::from(x), f64::from(y), 0.0);
        let truth = |b: bool| if b { 1.0 } else { 0.0 };

        prop_assert_eq!(value_of(&symbols, "x < y"), truth(x < y));
        prop_assert_eq!(value_of(&symbols, "x >= y"), truth(x >= y));
        prop_assert_eq!(value_of(&symbols, "x == y"), truth(x == y));
        prop_assert_eq!(value_of(&symbols, "x <> y"), truth(x != y));
        prop_assert_eq!(value_of(&symbols, "x < y and y < 0"), truth(x < y && y < 0));
    }

    #[test]
    fn folding_does_not_change_results(a in -1000i32..1000, b in 1i32..1000, c in -50i32..50) {
        let src = format!("({a}) * ({b}) - ({c}) / ({b}) + max({a}, {c}) % ({b}) + ({a} < {c} ? 1 : 2)");

        let mut expression = Expression::new();
        let mut folded = Parser::new();
        prop_assert!(folded.compile(&src, &mut expression));
        let with_folding = expression.value();

        let mut unfolded = Parser::with_settings(Settings::default().with_constant_folding(false));
        prop_assert!(unfolded.compile(&src, &mut expression));
        prop_assert!(same(with_folding, expression.value()));
    }

    #[test]
    fn substrings_are_clipped(text in "[a-z]{0,12}", start in -5i32..20, end in -5i32..20) {
        let src = format!("'{text}'[{start}:{end}]");
        let Ok(Value::Text(bytes)) = evaluate(&src) else {
            return Err(TestCaseError::fail(format!("{src:?} did not produce a string")));
        };

        prop_assert!(bytes.len() <= text.len());
        prop_assert!(text.as_bytes().windows(bytes.len().max(1)).any(|w| w.starts_with(&bytes))
                     || bytes.is_empty());
    }

    #[test]
    fn vector_reads_never_go_out_of_bounds(len in 1usize..8, index in -10i32..20) {
        let symbols = SymbolTable::new();
        symbols.create_vector("v", &vec![1.0; len]).unwrap();

        let value = value_of(&symbols, &format!("v[{index}]"));
        let in_range = usize::try_from(index).is_ok_and(|i| i < len);
        prop_assert_eq!(value.is_nan(), !in_range);
    }

    #[test]
    fn string_storage_round_trips_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let symbols = SymbolTable::new();
        symbols.create_stringvar("s", "hello").unwrap();
        let s = symbols.stringvar_ref("s").unwrap();
        prop_assert_eq!(s.get(), b"hello".to_vec());

        s.set(&bytes);
        prop_assert_eq!(s.get(), bytes.clone());
        prop_assert_eq!(s.len(), bytes.len());

        let expression = Expression::compile("s + ''", &symbols).unwrap();
        prop_assert_eq!(expression.evaluate(), Value::Text(bytes));
    }

    #[test]
    fn lexer_never_panics(source in "\\PC{0,40}") {
        let _ = tokenize(&source);
    }

    #[test]
    fn compiler_never_panics(source in "[-+*/^()\\[\\]{}:;,<>=!&|?'a-z0-9 .]{0,40}") {
        let mut expression = Expression::new();
        let mut parser = Parser::with_settings(Settings::default().with_max_loop_iterations(Some(1_000)));
        let compiled = parser.compile(&source, &mut expression);

        prop_assert_eq!(compiled, parser.error_count() == 0);
        if compiled {
            let _ = expression.evaluate();
        }
    }
}
