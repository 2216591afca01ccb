use formulary::{Expression, Parser, Settings, SymbolTable, Value, evaluate};

fn number(src: &str) -> f64 {
    match evaluate(src) {
        Ok(Value::Number(n)) => n,
        Ok(other) => panic!("Expression {src:?} produced {other:?}, not a number"),
        Err(e) => panic!("Expression {src:?} failed: {e}"),
    }
}

fn text(src: &str) -> String {
    match evaluate(src) {
        Ok(Value::Text(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(other) => panic!("Expression {src:?} produced {other:?}, not a string"),
        Err(e) => panic!("Expression {src:?} failed: {e}"),
    }
}

fn assert_value(src: &str, expected: f64) {
    let actual = number(src);
    assert!(actual == expected || (actual - expected).abs() <= 1e-12 * expected.abs().max(1.0),
            "{src:?}: expected {expected}, got {actual}");
}

fn assert_true(src: &str) {
    assert_value(src, 1.0);
}

fn assert_false(src: &str) {
    assert_value(src, 0.0);
}

fn assert_nan(src: &str) {
    let actual = number(src);
    assert!(actual.is_nan(), "{src:?}: expected NaN, got {actual}");
}

fn assert_failure(src: &str) {
    if evaluate(src).is_ok() {
        panic!("Expression {src:?} compiled but was expected to fail")
    }
}

fn compile_with(symbols: &SymbolTable, src: &str) -> Expression {
    Expression::compile(src, symbols).unwrap_or_else(|e| panic!("Expression {src:?} failed: {e}"))
}

#[test]
fn arithmetic_and_precedence() {
    assert_value("1 + 2 * 3", 7.0);
    assert_value("(1 + 2) * 3", 9.0);
    assert_value("10 - 4 - 3", 3.0);
    assert_value("2 * 3 / 4", 1.5);
    assert_value("7 % 3", 1.0);
    assert_value("-7 % 3", -1.0);
    assert_value("-2^2", -4.0);
    assert_value("2^3^2", 512.0);
    assert_value("2^-1", 0.5);
    assert_value("--3", 3.0);
    assert_value("+4", 4.0);
}

#[test]
fn number_literals() {
    assert_value(".5 + 2.", 2.5);
    assert_value("1.5e1", 15.0);
    assert_value("25E-1", 2.5);
    assert_failure("1e");
    assert_failure("2.5e+");
}

#[test]
fn division_by_zero_follows_ieee() {
    assert_value("1 / 0", f64::INFINITY);
    assert_value("-1 / 0", f64::NEG_INFINITY);
    assert_nan("0 / 0");
    assert_true("1 / 0 == inf");
}

#[test]
fn logical_operators() {
    assert_false("1 and 0");
    assert_true("2 and -1");
    assert_true("0 or 3");
    assert_false("1 xor 1");
    assert_true("1 xor 0");
    assert_false("1 nand 1");
    assert_true("0 nor 0");
    assert_true("0 xnor 0");
    assert_true("not 0");
    assert_false("!5");
    assert_true("1 & 1");
    assert_true("0 | 1");
    assert_true("true");
    assert_false("false");
}

#[test]
fn logical_precedence() {
    // and binds tighter than xor, which binds tighter than or
    assert_true("1 or 0 and 0");
    assert_true("1 xor 0 and 0");
    assert_false("1 xor 1 or 0");
    assert_true("1 < 2 and 2 < 3");
}

#[test]
fn comparisons() {
    assert_true("2 < 3");
    assert_true("3 > 2");
    assert_true("2 <= 2");
    assert_true("3 >= 3");
    assert_true("3 = 3");
    assert_true("3 == 3");
    assert_true("3 != 4");
    assert_true("3 <> 4");
    assert_false("0 / 0 == 0 / 0");
}

#[test]
fn comparisons_do_not_chain() {
    assert_failure("1 < 2 < 3");
    assert_failure("1 == 1 == 1");
}

#[test]
fn conditional_operator_and_if() {
    assert_value("1 ? 2 : 3", 2.0);
    assert_value("0 ? 2 : 3", 3.0);
    assert_value("0 ? 1 : 0 ? 2 : 3", 3.0);
    assert_value("if(1 < 2, 10, 20)", 10.0);
    assert_value("if (0) 1; else 2", 2.0);
    assert_value("if (1) { 3 } else { 4 }", 3.0);
    assert_nan("if (0) 5");
}

#[test]
fn string_conditionals() {
    assert_eq!(text("1 ? 'yes' : 'no'"), "yes");
    assert_eq!(text("if (0) 'yes'"), "");
    assert_failure("1 ? 'yes' : 2");
}

#[test]
fn strings() {
    assert_eq!(text("'ab' + 'cd'"), "abcd");
    assert_eq!(text("'it\\'s'"), "it's");
    assert_eq!(text("'abcdef'[1:3]"), "bcd");
    assert_eq!(text("'abcdef'[:1]"), "ab");
    assert_eq!(text("'abcdef'[4:]"), "ef");
    assert_eq!(text("'abc'[2:10]"), "c");
    assert_eq!(text("'abc'[5:9]"), "");
    assert_value("'abc'[]", 3.0);
    assert_value("('ab' + 'cde')[]", 5.0);
}

#[test]
fn string_comparison_and_matching() {
    assert_true("'abc' < 'abd'");
    assert_true("'b' == 'b'");
    assert_true("'a' != 'b'");
    assert_true("'bc' in 'abcd'");
    assert_false("'x' in 'abcd'");
    assert_true("'Hello' like 'H*o'");
    assert_false("'Hello' like 'h*o'");
    assert_true("'HELLO' ilike 'h?llo'");
    assert_true("'anything' like '*'");
}

#[test]
fn string_type_errors() {
    assert_failure("'a' - 'b'");
    assert_failure("'a' * 2");
    assert_failure("'a' + 1");
    assert_failure("'a' < 1");
    assert_failure("1 in 'abc'");
    assert_failure("-'a'");
    assert_failure("'abc'[1]");
}

#[test]
fn builtin_functions() {
    assert_value("abs(-5)", 5.0);
    assert_value("sqrt(9)", 3.0);
    assert_value("round(3.7)", 4.0);
    assert_value("sgn(-42)", -1.0);
    assert_value("sgn(0)", 0.0);
    assert_value("hypot(3, 4)", 5.0);
    assert_value("pow(2, 10)", 1024.0);
    assert_value("root(27, 3)", 3.0);
    assert_value("root(-8, 3)", -2.0);
    assert_value("roundn(3.14159, 2)", 3.14);
    assert_value("frac(2.25)", 0.25);
    assert_value("trunc(-2.7)", -2.0);
    assert_value("clamp(-1, 5, 1)", 1.0);
    assert_value("clamp(-1, 0.5, 1)", 0.5);
    assert_value("iclamp(0, 0.2, 1)", 0.0);
    assert_true("inrange(0, 0.5, 1)");
    assert_false("inrange(0, 2, 1)");
    assert_true("equal(0.1 + 0.2, 0.3)");
    assert_false("not_equal(0.1 + 0.2, 0.3)");
    assert_value("notnot(-3)", 1.0);
    assert_value("deg2rad(180)", std::f64::consts::PI);
    assert_value("sin(pi / 2)", 1.0);
}

#[test]
fn variadic_builtins() {
    assert_value("min(3, 1, 2)", 1.0);
    assert_value("max(3, 1, 2)", 3.0);
    assert_value("sum(1, 2, 3, 4)", 10.0);
    assert_value("avg(1, 2, 3)", 2.0);
    assert_value("mul(2, 3, 4)", 24.0);
    assert_value("max(7)", 7.0);
}

#[test]
fn builtin_call_errors() {
    assert_failure("hypot(1)");
    assert_failure("sin(1, 2)");
    assert_failure("min()");
    assert_failure("sin");
    assert_failure("sin 1");
}

#[test]
fn comments_and_whitespace() {
    assert_value("1 + /* two */ 2 // trailing", 3.0);
    assert_value("# leading comment\n4", 4.0);
    assert_value("1 +\n\t2", 3.0);
}

#[test]
fn statements_and_blocks() {
    assert_value("1; 2; 3", 3.0);
    assert_value("1; 2;", 2.0);
    assert_value("{ 1; 2 }", 2.0);
    assert_value("(1; 2) * 3", 6.0);
    assert_failure("");
    assert_failure(";;");
    assert_failure("()");
}

#[test]
fn local_scalar_declarations() {
    assert_value("var x := 3; x * 2", 6.0);
    assert_value("var x; x", 0.0);
    assert_value("var x := 2; x += 3; x", 5.0);
    assert_value("var x := 2; x -= 3", -1.0);
    assert_value("var x := 4; x *= 2; x /= 4; x", 2.0);
    assert_value("var x := 7; x %= 4", 3.0);
    assert_value("var a := 1; var b := a + 1; a + b", 3.0);
    assert_failure("var x := 1; var x := 2; x");
    assert_failure("var sin := 1; 1");
    assert_failure("var pi := 1; 1");
}

#[test]
fn local_string_declarations() {
    assert_eq!(text("var s := 'ab'; s += 'cd'; s"), "abcd");
    assert_eq!(text("var s := 'ab'; s := 'xy'"), "xy");
    assert_failure("var s := 'ab'; s -= 'b'; s");
    assert_failure("var s := 'ab'; s := 1");
}

#[test]
fn local_vector_declarations() {
    assert_value("var v[3] := {1, 2, 3}; sum(v)", 6.0);
    assert_value("var v[4] := 2; sum(v)", 8.0);
    assert_value("var v[4] := {1, 2}; v[3]", 0.0);
    assert_value("var v[2]; v[]", 2.0);
    assert_value("var a[3] := {1, 2, 3}; var b[3] := a * 2; sum(b)", 12.0);
    assert_value("var v[3] := {1, 2, 3}; v[1] := 9; v[1] + v[0]", 10.0);
    assert_value("var v[3] := {1, 2, 3}; v[2] += 1", 4.0);
    assert_failure("var v[0]; 1");
    assert_failure("var v[1.5]; 1");
    assert_failure("var v[2] := {1, 2, 3}; 1");
}

#[test]
fn out_of_range_vector_access() {
    assert_nan("var v[3] := {1, 2, 3}; v[3]");
    assert_nan("var v[3] := {1, 2, 3}; v[-1]");
    assert_nan("var v[3] := {1, 2, 3}; v[5] := 1");
    assert_value("var v[3] := {1, 2, 3}; v[5] := 1; sum(v)", 6.0);
    assert_value("var v[3] := {1, 2, 3}; v[1.9]", 2.0);
}

#[test]
fn while_loops() {
    assert_value("var i := 0; var s := 0; while (i < 5) { s += i; i += 1 }; s", 10.0);
    assert_value("var i := 0; while (i < 3) i += 1", 3.0);
    assert_nan("while (0) 1");
}

#[test]
fn for_loops() {
    assert_value("var p := 1; for (var i := 1; i <= 5; i += 1) { p *= i }; p", 120.0);
    assert_value("var s := 0; for (var i := 0; i < 4; i += 1) s += i", 6.0);
    assert_nan("for (var i := 0; i < 0; i += 1) i");
}

#[test]
fn loop_iteration_limit() {
    let symbols = SymbolTable::new();
    let mut expression = Expression::new();
    expression.register_symbol_table(&symbols);

    let settings = Settings::default().with_max_loop_iterations(Some(10));
    let mut parser = Parser::with_settings(settings);

    assert!(parser.compile("var i := 0; while (1) i += 1; i", &mut expression));
    assert_eq!(expression.value(), 10.0);

    assert!(parser.compile("var i := 0; for (;;) i += 1; i", &mut expression));
    assert_eq!(expression.value(), 10.0);
}

#[test]
fn switch_statement() {
    let src = "var x := 2; switch { case x = 1: 10; case x = 2: 20; default: 0; }";
    assert_value(src, 20.0);
    assert_value("switch { case 0: 1; default: 5 }", 5.0);
    assert_value("switch { default: 7; }", 7.0);
    assert_failure("switch { case 1: 2; }");
    assert_failure("switch { case 1: 'a'; default: 0; }");
}

#[test]
fn constants_are_folded_and_read_only() {
    assert_value("2 * pi", 2.0 * std::f64::consts::PI);
    assert_true("epsilon > 0");
    assert_failure("pi := 3");
    assert_failure("pi += 1");
}

#[test]
fn bound_variables_are_read_live() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 2.0).unwrap();
    let x = symbols.variable_ref("x").unwrap();

    let expression = compile_with(&symbols, "x^2 + 1");
    assert_eq!(expression.value(), 5.0);

    x.set(3.0);
    assert_eq!(expression.value(), 10.0);
}

#[test]
fn assignments_write_through_to_bound_storage() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 1.0).unwrap();
    symbols.create_stringvar("s", "ab").unwrap();
    symbols.create_vector("v", &[1.0, 2.0, 3.0]).unwrap();

    let expression = compile_with(&symbols, "x := x + 1; s += 'c'; v[0] := 10; v *= 2");
    assert_eq!(expression.evaluate(), Value::Vector(vec![20.0, 4.0, 6.0]));

    assert_eq!(symbols.variable_ref("x").unwrap().get(), 2.0);
    assert_eq!(symbols.stringvar_ref("s").unwrap().get(), b"abc");
    assert_eq!(symbols.get_vector("v").unwrap().to_vec(), vec![20.0, 4.0, 6.0]);

    expression.value();
    assert_eq!(symbols.variable_ref("x").unwrap().get(), 3.0);
    assert_eq!(symbols.stringvar_ref("s").unwrap().get(), b"abcc");
}

#[test]
fn vector_operations() {
    let symbols = SymbolTable::new();
    symbols.create_vector("v", &[1.0, -2.0, 3.0]).unwrap();
    symbols.create_vector("w", &[1.0, 1.0]).unwrap();

    let value = |src: &str| compile_with(&symbols, src).evaluate();

    assert_eq!(value("v[1]"), Value::Number(-2.0));
    assert_eq!(value("v[]"), Value::Number(3.0));
    assert_eq!(value("sum(v)"), Value::Number(2.0));
    assert_eq!(value("avg(v)"), Value::Number(2.0 / 3.0));
    assert_eq!(value("max(v)"), Value::Number(3.0));
    assert_eq!(value("min(v)"), Value::Number(-2.0));
    assert_eq!(value("mul(v)"), Value::Number(-6.0));
    assert_eq!(value("v * 2"), Value::Vector(vec![2.0, -4.0, 6.0]));
    assert_eq!(value("1 - v"), Value::Vector(vec![0.0, 3.0, -2.0]));
    assert_eq!(value("-v"), Value::Vector(vec![-1.0, 2.0, -3.0]));
    assert_eq!(value("abs(v)"), Value::Vector(vec![1.0, 2.0, 3.0]));
    assert_eq!(value("v + w"), Value::Vector(vec![2.0, -1.0]));
    assert_eq!(value("(v * 2)[2]"), Value::Number(6.0));
    assert_eq!(value("(v + w)[]"), Value::Number(2.0));
}

#[test]
fn vector_type_errors() {
    let symbols = SymbolTable::new();
    symbols.create_vector("v", &[1.0, 2.0]).unwrap();

    for src in ["v < 1", "v and 1", "hypot(v, 1)", "v + 'a'", "1 ? v : v", "v[]:= 1", "'a'[v]"] {
        assert!(Expression::compile(src, &symbols).is_err(), "{src:?} compiled");
    }
}

#[test]
fn user_functions() {
    let symbols = SymbolTable::new();
    symbols.add_function1("twice", |x| 2.0 * x).unwrap();
    symbols.add_function2("add", |a, b| a + b).unwrap();
    symbols.add_function3("mad", |a, b, c| a * b + c).unwrap();
    symbols.add_function4("sum4", |a, b, c, d| a + b + c + d).unwrap();

    assert_eq!(compile_with(&symbols, "twice(4)").value(), 8.0);
    assert_eq!(compile_with(&symbols, "add(2, twice(1))").value(), 4.0);
    assert_eq!(compile_with(&symbols, "mad(2, 3, 4)").value(), 10.0);
    assert_eq!(compile_with(&symbols, "sum4(1, 2, 3, 4)").value(), 10.0);

    assert!(Expression::compile("add(1)", &symbols).is_err());
    assert!(Expression::compile("twice", &symbols).is_err());
    assert!(Expression::compile("twice := 1", &symbols).is_err());
    assert!(Expression::compile("nothing(1)", &symbols).is_err());
}

#[test]
fn constant_folding_can_be_disabled() {
    let symbols = SymbolTable::new();
    symbols.add_constants();

    let mut expression = Expression::new();
    expression.register_symbol_table(&symbols);
    let mut parser = Parser::with_settings(Settings::default().with_constant_folding(false));

    for (src, expected) in [("1 + 2 * 3", 7.0),
                            ("if (1) 2; else 3", 2.0),
                            ("'ab' + 'c' == 'abc'", 1.0),
                            ("'abcdef'[1:2][]", 2.0),
                            ("hypot(3, 4)", 5.0)]
    {
        assert!(parser.compile(src, &mut expression), "{src:?} did not compile");
        assert_eq!(expression.value(), expected, "{src:?}");
    }
}

#[test]
fn expression_reports_its_kind() {
    let symbols = SymbolTable::new();
    symbols.create_vector("v", &[1.0]).unwrap();

    assert_eq!(compile_with(&symbols, "1").kind(), Some(formulary::Kind::Scalar));
    assert_eq!(compile_with(&symbols, "'a'").kind(), Some(formulary::Kind::String));
    assert_eq!(compile_with(&symbols, "v + 1").kind(), Some(formulary::Kind::Vector));

    let string = compile_with(&symbols, "'a'");
    assert!(string.value().is_nan());
    assert_eq!(string.evaluate(), Value::from("a"));

    let empty = Expression::new();
    assert!(!empty.is_compiled());
    assert!(empty.value().is_nan());
    assert_eq!(empty.kind(), None);
}

#[test]
fn operator_runs_keep_left_to_right_order() {
    assert_value("10 - 4 - 3 - 2", 1.0);
    assert_value("2 * 3 + 4 * 5 - 6 / 3", 24.0);
    assert_value("(1 + 2) ^ 2 * 3 - 1", 26.0);
    assert_value("100 / 10 / 5 % 3", 2.0);
    assert_true("1 + 1 < 3 and 2 * 2 == 4 and 1");
    assert_false("1 xor 1 xor 1 xor 1");
    assert_value("'ab' + 'cd' + 'ef' == 'abcdef'", 1.0);

    let symbols = SymbolTable::new();
    symbols.create_variable("x", 0.0).unwrap();
    symbols.create_variable("hits", 0.0).unwrap();
    symbols.create_vector("v", &[1.0, 2.0, 3.0]).unwrap();
    symbols.create_vector("w", &[10.0, 20.0]).unwrap();

    let expression = compile_with(&symbols, "x and (hits += 1) and (hits += 1) or (hits += 10)");
    assert_eq!(expression.value(), 1.0);
    assert_eq!(symbols.variable_ref("hits").unwrap().get(), 10.0);

    let expression = compile_with(&symbols, "v * 2 + w - 1");
    assert_eq!(expression.evaluate(), Value::Vector(vec![11.0, 23.0]));
    assert_eq!(compile_with(&symbols, "(2 - v + w)[]").value(), 2.0);
}

#[test]
fn long_flat_expressions_evaluate() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 1.0).unwrap();
    symbols.create_stringvar("s", "ab").unwrap();
    symbols.create_vector("v", &[1.0, 2.0]).unwrap();

    let run = |operator: &str, operand: &str, count: usize| {
        compile_with(&symbols, &vec![operand; count].join(operator)).evaluate()
    };

    assert_eq!(run(" + ", "x", 100_000), Value::Number(100_000.0));
    assert_eq!(run(" * ", "x", 100_000), Value::Number(1.0));
    assert_eq!(run(" - ", "x", 100_000), Value::Number(-99_998.0));
    assert_eq!(run(" and ", "x", 100_000), Value::Number(1.0));
    assert_eq!(run(" < 2 or ", "x", 50_000), Value::Number(1.0));
    assert_eq!(run(" + ", "v", 100_000), Value::Vector(vec![100_000.0, 200_000.0]));

    let Value::Text(bytes) = run(" + ", "s", 100_000) else {
        panic!("concatenation did not produce a string");
    };
    assert_eq!(bytes.len(), 200_000);
}
