use std::{cell::Cell, rc::Rc};

use formulary::{
    BindingError, Expression, Function, StringVar, SymbolTable, Value, Variable, VectorVar,
};
use pretty_assertions::assert_eq;

/// A function carrying its own context: a polynomial in one variable.
struct Polynomial {
    coefficients: Vec<f64>,
    calls:        Rc<Cell<usize>>,
}

impl Function for Polynomial {
    fn arity(&self) -> usize {
        1
    }

    fn call(&self, args: &[f64]) -> f64 {
        self.calls.set(self.calls.get() + 1);
        let x = args.first().copied().unwrap_or(f64::NAN);
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }
}

struct Nullary;

impl Function for Nullary {
    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _: &[f64]) -> f64 {
        0.0
    }
}

#[test]
fn names_must_be_valid_and_unreserved() {
    let symbols = SymbolTable::new();

    assert_eq!(symbols.create_variable("1x", 0.0),
               Err(BindingError::InvalidName { name: "1x".to_string() }));
    assert_eq!(symbols.create_variable("", 0.0),
               Err(BindingError::InvalidName { name: String::new() }));
    assert_eq!(symbols.create_variable("a-b", 0.0),
               Err(BindingError::InvalidName { name: "a-b".to_string() }));
    assert_eq!(symbols.create_variable("sin", 0.0),
               Err(BindingError::ReservedName { name: "sin".to_string() }));
    assert_eq!(symbols.create_variable("while", 0.0),
               Err(BindingError::ReservedName { name: "while".to_string() }));
    assert_eq!(symbols.create_variable("_ok_1", 0.0), Ok(()));
    assert_eq!(symbols.variable_count(), 1);
}

#[test]
fn names_are_unique_across_kinds() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 1.0).unwrap();

    let duplicate = Err(BindingError::DuplicateName { name: "x".to_string() });
    assert_eq!(symbols.create_variable("x", 2.0), duplicate);
    assert_eq!(symbols.create_stringvar("x", "a"), duplicate);
    assert_eq!(symbols.create_vector("x", &[1.0]), duplicate);
    assert_eq!(symbols.add_function1("x", |x| x), duplicate);

    assert_eq!(symbols.variable_ref("x").unwrap().get(), 1.0);
    assert_eq!(symbols.stringvar_count(), 0);
    assert_eq!(symbols.vector_count(), 0);
    assert_eq!(symbols.function_count(), 0);
}

#[test]
fn vectors_must_not_be_empty() {
    let symbols = SymbolTable::new();

    assert_eq!(symbols.create_vector("v", &[]),
               Err(BindingError::EmptyVector { name: "v".to_string() }));
    assert!(!symbols.symbol_exists("v"));
}

#[test]
fn function_arity_is_checked_at_registration() {
    let symbols = SymbolTable::new();

    assert_eq!(symbols.add_function("nothing", Nullary),
               Err(BindingError::InvalidArity { name:  "nothing".to_string(),
                                                arity: 0, }));
    assert_eq!(symbols.function_count(), 0);
}

#[test]
fn removal_and_lookup() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 1.0).unwrap();
    symbols.create_stringvar("s", "text").unwrap();
    symbols.create_vector("v", &[1.0, 2.0]).unwrap();
    symbols.add_function2("f", |a, b| a - b).unwrap();

    assert!(symbols.symbol_exists("x"));
    assert_eq!(symbols.remove_variable("x"), Ok(()));
    assert!(!symbols.symbol_exists("x"));
    assert_eq!(symbols.remove_variable("x"),
               Err(BindingError::NotFound { name: "x".to_string(),
                                            kind: "variable", }));

    assert!(symbols.remove_variable("s").is_err());
    assert_eq!(symbols.remove_stringvar("s"), Ok(()));
    assert_eq!(symbols.remove_vector("v"), Ok(()));
    assert_eq!(symbols.remove_function("f"), Ok(()));
    assert!(symbols.remove_function("f").is_err());

    assert_eq!(symbols.variable_count()
               + symbols.stringvar_count()
               + symbols.vector_count()
               + symbols.function_count(),
               0);
}

#[test]
fn removed_storage_stays_alive_in_compiled_expressions() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 4.0).unwrap();

    let expression = Expression::compile("x * 2", &symbols).unwrap();
    symbols.remove_variable("x").unwrap();

    assert_eq!(expression.value(), 8.0);
    assert!(Expression::compile("x * 2", &symbols).is_err());
}

#[test]
fn caller_provided_storage_is_shared() {
    let symbols = SymbolTable::new();
    let x = Variable::new(1.0);
    let s = StringVar::new("ab");
    let v = VectorVar::new(&[1.0, 2.0, 3.0]);

    symbols.add_variable("x", x.clone(), false).unwrap();
    symbols.add_stringvar("s", s.clone(), false).unwrap();
    symbols.add_vector("v", v.clone()).unwrap();

    assert!(symbols.variable_ref("x").unwrap().ptr_eq(&x));
    assert!(symbols.stringvar_ref("s").unwrap().ptr_eq(&s));
    assert!(symbols.get_vector("v").unwrap().ptr_eq(&v));

    let expression = Expression::compile("x + v[1] + s[]", &symbols).unwrap();
    assert_eq!(expression.value(), 5.0);

    x.set(10.0);
    v.set(1, 20.0);
    s.set("abcd");
    assert_eq!(expression.value(), 34.0);
}

#[test]
fn constants() {
    let symbols = SymbolTable::new();
    assert!(symbols.add_constants());
    assert!(!symbols.add_pi());

    assert!(symbols.is_constant_node("pi"));
    assert!(symbols.is_constant_node("epsilon"));
    assert_eq!(symbols.variable_ref("inf").unwrap().get(), f64::INFINITY);

    symbols.create_variable("x", 1.0).unwrap();
    assert!(!symbols.is_constant_node("x"));

    symbols.add_stringvar("name", StringVar::new("fixed"), true).unwrap();
    assert!(symbols.is_constant_string("name"));
    assert!(Expression::compile("name := 'other'", &symbols).is_err());

    symbols.clear_local_constants();
    assert_eq!(symbols.get_variable_list(), vec!["x"]);
    assert_eq!(symbols.stringvar_count(), 1);
}

#[test]
fn constants_are_captured_when_folding() {
    let symbols = SymbolTable::new();
    let c = Variable::new(2.0);
    symbols.add_variable("c", c.clone(), true).unwrap();

    let expression = Expression::compile("c * 3", &symbols).unwrap();
    c.set(5.0);
    assert_eq!(expression.value(), 6.0);
}

#[test]
fn lists_are_sorted_by_name() {
    let symbols = SymbolTable::new();
    for name in ["zeta", "alpha", "mid"] {
        symbols.create_variable(name, 0.0).unwrap();
    }
    symbols.create_stringvar("s", "").unwrap();
    symbols.create_vector("v", &[0.0]).unwrap();
    symbols.add_function1("f", f64::abs).unwrap();

    assert_eq!(symbols.get_variable_list(), vec!["alpha", "mid", "zeta"]);
    assert_eq!(symbols.get_stringvar_list(), vec!["s"]);
    assert_eq!(symbols.get_vector_list(), vec!["v"]);
    assert_eq!(symbols.get_function_list(), vec!["f"]);
}

#[test]
fn clearing_by_kind() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 0.0).unwrap();
    symbols.create_stringvar("s", "").unwrap();
    symbols.create_vector("v", &[0.0]).unwrap();
    symbols.add_function1("f", f64::abs).unwrap();

    symbols.clear_variables();
    assert_eq!(symbols.variable_count(), 0);
    assert_eq!(symbols.stringvar_count(), 1);

    symbols.clear_strings();
    symbols.clear_vectors();
    assert_eq!(symbols.function_count(), 1);

    symbols.clear_functions();
    assert!(!symbols.symbol_exists("f"));
    assert!(symbols.valid());
}

#[test]
fn clones_share_bindings() {
    let symbols = SymbolTable::new();
    let alias = symbols.clone();

    alias.create_variable("x", 3.0).unwrap();
    assert!(symbols.ptr_eq(&alias));
    assert_eq!(symbols.variable_ref("x").unwrap().get(), 3.0);
    assert!(!symbols.ptr_eq(&SymbolTable::new()));
}

#[test]
fn load_from_copies_values_and_shares_functions() {
    let base = SymbolTable::new();
    base.create_variable("x", 1.0).unwrap();
    base.create_stringvar("s", "base").unwrap();
    base.create_vector("v", &[1.0, 2.0]).unwrap();
    base.add_function1("f", |x| x + 1.0).unwrap();
    base.add_constants();

    let table = SymbolTable::new();
    table.create_variable("x", 10.0).unwrap();

    assert_eq!(table.load_from(&base), 6);
    assert_eq!(table.load_from(&table), 0);
    assert_eq!(table.variable_ref("x").unwrap().get(), 10.0);
    assert!(table.is_constant_node("pi"));

    base.stringvar_ref("s").unwrap().set("changed");
    base.get_vector("v").unwrap().set(0, 9.0);
    assert_eq!(table.stringvar_ref("s").unwrap().get(), b"base");
    assert_eq!(table.get_vector("v").unwrap().to_vec(), vec![1.0, 2.0]);
    assert!(Rc::ptr_eq(&table.get_function("f").unwrap(), &base.get_function("f").unwrap()));
}

#[test]
fn functions_with_context() {
    let calls = Rc::new(Cell::new(0));
    let symbols = SymbolTable::new();
    symbols.add_function("poly",
                         Polynomial { coefficients: vec![1.0, 0.0, 2.0],
                                      calls:        Rc::clone(&calls), })
           .unwrap();
    symbols.create_variable("x", 3.0).unwrap();

    let expression = Expression::compile("poly(x) + poly(1)", &symbols).unwrap();
    assert_eq!(expression.value(), 19.0 + 3.0);
    assert_eq!(calls.get(), 2);

    // arguments that are all constant are still passed at evaluation time
    assert_eq!(expression.value(), 22.0);
    assert_eq!(calls.get(), 4);
}

#[test]
fn functions_outlive_their_binding() {
    let symbols = SymbolTable::new();
    symbols.add_function2("hyp", f64::hypot).unwrap();

    let expression = Expression::compile("hyp(6, 8)", &symbols).unwrap();
    symbols.clear_functions();
    assert_eq!(expression.value(), 10.0);
}

#[test]
fn reregistering_a_table_requires_recompiling() {
    let first = SymbolTable::new();
    first.create_variable("x", 1.0).unwrap();
    let second = SymbolTable::new();
    second.create_variable("x", 2.0).unwrap();

    let mut expression = Expression::new();
    expression.register_symbol_table(&first);
    let mut parser = formulary::Parser::new();
    assert!(parser.compile("x", &mut expression));

    expression.register_symbol_table(&second);
    assert_eq!(expression.value(), 1.0);
    assert!(expression.symbol_table().ptr_eq(&second));

    assert!(parser.compile("x", &mut expression));
    assert_eq!(expression.value(), 2.0);
}

#[test]
fn string_storage_keeps_arbitrary_bytes() {
    let symbols = SymbolTable::new();
    symbols.create_stringvar("s", "hello").unwrap();
    let s = symbols.stringvar_ref("s").unwrap();
    assert_eq!(s.get(), b"hello");

    s.set([0u8, b'a', 0, 0xff, 0]);
    assert_eq!(s.get(), [0u8, b'a', 0, 0xff, 0]);

    let expression = Expression::compile("s + 'z'", &symbols).unwrap();
    assert_eq!(expression.evaluate(), Value::Text(vec![0, b'a', 0, 0xff, 0, b'z']));
    assert_eq!(Expression::compile("s[]", &symbols).unwrap().value(), 5.0);
}

#[test]
fn expressions_keep_their_source() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 2.0).unwrap();

    let mut expression = Expression::compile("x * 3", &symbols).unwrap();
    assert_eq!(expression.source(), "x * 3");
    assert!(format!("{expression:?}").contains("x * 3"));

    expression.release();
    assert_eq!(expression.source(), "");
    assert_eq!(Expression::new().source(), "");
}

#[test]
fn clones_recompile_against_the_same_table() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 2.0).unwrap();
    symbols.create_vector("v", &[1.0, 2.0]).unwrap();

    let original = Expression::compile("var n[2] := {x, 1}; v + n", &symbols).unwrap();
    let copy = original.clone();
    assert!(copy.is_compiled());
    assert_eq!(copy.source(), original.source());
    assert!(copy.symbol_table().ptr_eq(&symbols));
    assert_eq!(copy.evaluate(), Value::Vector(vec![3.0, 3.0]));

    symbols.variable_ref("x").unwrap().set(5.0);
    assert_eq!(original.evaluate(), copy.evaluate());
    assert_eq!(copy.evaluate(), Value::Vector(vec![6.0, 3.0]));

    assert!(!Expression::new().clone().is_compiled());

    symbols.remove_variable("x").unwrap();
    assert!(!original.clone().is_compiled());
    assert_eq!(original.evaluate(), Value::Vector(vec![6.0, 3.0]));
}

#[test]
fn compile_with_vars_creates_unknown_scalars() {
    let symbols = SymbolTable::new();
    symbols.create_variable("x", 2.0).unwrap();

    let (expression, created) = Expression::compile_with_vars("a * x + b - a", &symbols).unwrap();
    assert_eq!(created, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(symbols.get_variable_list(), vec!["a", "b", "x"]);
    assert_eq!(expression.value(), 0.0);

    symbols.variable_ref("a").unwrap().set(4.0);
    symbols.variable_ref("b").unwrap().set(1.0);
    assert_eq!(expression.value(), 5.0);

    let (_, created) = Expression::compile_with_vars("a + b", &symbols).unwrap();
    assert!(created.is_empty());

    let error = Expression::compile_with_vars("a +", &symbols).unwrap_err();
    assert_eq!(error.diagnostics().len(), 1);
}
