use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use tracing::debug;

use crate::{
    error::BindingError,
    interpreter::{evaluator::function::is_builtin, lexer::KEYWORDS},
    symbol_table::{
        function::{Function, Function1, Function2, Function3, Function4, FunctionRef},
        storage::{StringVar, Variable, VectorVar},
    },
};

/// A resolved symbol, as seen by the compiler.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A scalar variable or constant.
    Scalar {
        /// The bound storage.
        variable: Variable,
        /// Whether expressions may assign to it.
        constant: bool,
    },
    /// A string variable.
    String {
        /// The bound storage.
        variable: StringVar,
        /// Whether expressions may assign to it.
        constant: bool,
    },
    /// A fixed-length vector.
    Vector(VectorVar),
    /// A user function.
    Function(FunctionRef),
}

#[derive(Clone)]
struct Slot<T> {
    storage:  T,
    constant: bool,
}

/// The bindings behind a [`SymbolTable`] handle.
#[derive(Default)]
struct SymbolStore {
    variables: BTreeMap<String, Slot<Variable>>,
    strings:   BTreeMap<String, Slot<StringVar>>,
    vectors:   BTreeMap<String, VectorVar>,
    functions: BTreeMap<String, FunctionRef>,
}

impl SymbolStore {
    fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
        || self.strings.contains_key(name)
        || self.vectors.contains_key(name)
        || self.functions.contains_key(name)
    }
}

/// A registry mapping names to live storage.
///
/// A `SymbolTable` is a cheap handle: clones share the same bindings. Names
/// are unique across all kinds of bindings, and a failed operation leaves the
/// table untouched.
///
/// # Example
/// ```
/// use formulary::{Expression, SymbolTable, Variable};
///
/// let symbols = SymbolTable::new();
/// let x = Variable::new(1.0);
/// symbols.add_variable("x", x.clone(), false).unwrap();
///
/// let expression = Expression::compile("x + 1", &symbols).unwrap();
/// assert_eq!(expression.value(), 2.0);
///
/// x.set(5.0);
/// assert_eq!(expression.value(), 6.0);
/// ```
#[derive(Clone, Default)]
pub struct SymbolTable {
    store: Rc<RefCell<SymbolStore>>,
}

/// Generates the closure helpers `add_function1` to `add_function4`.
macro_rules! closure_helpers {
    ($($method:ident => $adapter:ident($($ty:ty),+)),+ $(,)?) => {
        impl SymbolTable {
            $(
                #[doc = concat!("Registers a closure through [`", stringify!($adapter), "`].")]
                ///
                /// # Errors
                /// Fails if the name is invalid, reserved or already taken.
                pub fn $method<F>(&self, name: &str, function: F) -> Result<(), BindingError>
                    where F: Fn($($ty),+) -> f64 + 'static
                {
                    self.add_function(name, $adapter(function))
                }
            )+
        }
    };
}

closure_helpers! {
    add_function1 => Function1(f64),
    add_function2 => Function2(f64, f64),
    add_function3 => Function3(f64, f64, f64),
    add_function4 => Function4(f64, f64, f64, f64),
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to caller-provided scalar storage.
    ///
    /// A constant binding cannot be assigned from expressions, and with
    /// constant folding enabled its value is captured at compile time.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken.
    pub fn add_variable(&self,
                        name: &str,
                        variable: Variable,
                        constant: bool)
                        -> Result<(), BindingError> {
        self.insert(name, |store| {
                store.variables.insert(name.to_string(),
                                       Slot { storage: variable,
                                              constant });
            })
    }

    /// Allocates a scalar initialised to `value` and binds it to `name`.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken.
    pub fn create_variable(&self, name: &str, value: f64) -> Result<(), BindingError> {
        self.add_variable(name, Variable::new(value), false)
    }

    /// Registers an immutable scalar.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken.
    pub fn add_constant(&self, name: &str, value: f64) -> Result<(), BindingError> {
        self.add_variable(name, Variable::new(value), true)
    }

    /// Binds `name` to caller-provided string storage.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken.
    pub fn add_stringvar(&self,
                         name: &str,
                         variable: StringVar,
                         constant: bool)
                         -> Result<(), BindingError> {
        self.insert(name, |store| {
                store.strings.insert(name.to_string(),
                                     Slot { storage: variable,
                                            constant });
            })
    }

    /// Allocates a string holding `value` and binds it to `name`.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken.
    pub fn create_stringvar(&self,
                            name: &str,
                            value: impl AsRef<[u8]>)
                            -> Result<(), BindingError> {
        self.add_stringvar(name, StringVar::new(value), false)
    }

    /// Binds `name` to caller-provided vector storage.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken, or if the
    /// vector is empty.
    pub fn add_vector(&self, name: &str, vector: VectorVar) -> Result<(), BindingError> {
        if vector.is_empty() {
            return Err(BindingError::EmptyVector { name: name.to_string() });
        }
        self.insert(name, |store| {
                store.vectors.insert(name.to_string(), vector);
            })
    }

    /// Allocates a vector holding a copy of `values` and binds it to `name`.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken, or if
    /// `values` is empty.
    pub fn create_vector(&self, name: &str, values: &[f64]) -> Result<(), BindingError> {
        self.add_vector(name, VectorVar::new(values))
    }

    /// Registers a user function.
    ///
    /// # Errors
    /// Fails if the name is invalid, reserved or already taken, or if the
    /// function's arity is not between 1 and 4.
    pub fn add_function(&self,
                        name: &str,
                        function: impl Function + 'static)
                        -> Result<(), BindingError> {
        self.add_function_ref(name, Rc::new(function))
    }

    /// Registers an already shared function handle.
    ///
    /// # Errors
    /// Same as [`SymbolTable::add_function`].
    pub fn add_function_ref(&self, name: &str, function: FunctionRef) -> Result<(), BindingError> {
        let arity = function.arity();
        if !(1..=4).contains(&arity) {
            return Err(BindingError::InvalidArity { name: name.to_string(),
                                                    arity });
        }
        self.insert(name, |store| {
                store.functions.insert(name.to_string(), function);
            })
    }

    /// Unbinds a scalar variable or constant.
    ///
    /// Expressions compiled against it keep their own handle and continue to
    /// read the now detached storage.
    ///
    /// # Errors
    /// Fails with [`BindingError::NotFound`] if no such scalar exists.
    pub fn remove_variable(&self, name: &str) -> Result<(), BindingError> {
        self.store
            .borrow_mut()
            .variables
            .remove(name)
            .map(drop)
            .ok_or_else(|| not_found(name, "variable"))
    }

    /// Unbinds a string variable.
    ///
    /// # Errors
    /// Fails with [`BindingError::NotFound`] if no such string exists.
    pub fn remove_stringvar(&self, name: &str) -> Result<(), BindingError> {
        self.store
            .borrow_mut()
            .strings
            .remove(name)
            .map(drop)
            .ok_or_else(|| not_found(name, "string variable"))
    }

    /// Unbinds a vector.
    ///
    /// # Errors
    /// Fails with [`BindingError::NotFound`] if no such vector exists.
    pub fn remove_vector(&self, name: &str) -> Result<(), BindingError> {
        self.store
            .borrow_mut()
            .vectors
            .remove(name)
            .map(drop)
            .ok_or_else(|| not_found(name, "vector"))
    }

    /// Unbinds a function.
    ///
    /// # Errors
    /// Fails with [`BindingError::NotFound`] if no such function exists.
    pub fn remove_function(&self, name: &str) -> Result<(), BindingError> {
        self.store
            .borrow_mut()
            .functions
            .remove(name)
            .map(drop)
            .ok_or_else(|| not_found(name, "function"))
    }

    /// Removes every scalar, constants included.
    pub fn clear_variables(&self) {
        let removed = std::mem::take(&mut self.store.borrow_mut().variables);
        debug!(count = removed.len(), "cleared variables");
    }

    /// Removes every string variable.
    pub fn clear_strings(&self) {
        let removed = std::mem::take(&mut self.store.borrow_mut().strings);
        debug!(count = removed.len(), "cleared string variables");
    }

    /// Removes every vector.
    pub fn clear_vectors(&self) {
        let removed = std::mem::take(&mut self.store.borrow_mut().vectors);
        debug!(count = removed.len(), "cleared vectors");
    }

    /// Removes the constant scalars, keeping mutable variables.
    pub fn clear_local_constants(&self) {
        let mut store = self.store.borrow_mut();
        let before = store.variables.len();
        store.variables.retain(|_, slot| !slot.constant);
        debug!(count = before - store.variables.len(), "cleared constants");
    }

    /// Removes every user function.
    pub fn clear_functions(&self) {
        let removed = std::mem::take(&mut self.store.borrow_mut().functions);
        debug!(count = removed.len(), "cleared functions");
    }

    /// Live handle to a scalar binding (variable or constant).
    #[must_use]
    pub fn variable_ref(&self, name: &str) -> Option<Variable> {
        self.store
            .borrow()
            .variables
            .get(name)
            .map(|slot| slot.storage.clone())
    }

    /// Live handle to a string binding.
    #[must_use]
    pub fn stringvar_ref(&self, name: &str) -> Option<StringVar> {
        self.store
            .borrow()
            .strings
            .get(name)
            .map(|slot| slot.storage.clone())
    }

    /// Live handle to a vector binding.
    #[must_use]
    pub fn get_vector(&self, name: &str) -> Option<VectorVar> {
        self.store.borrow().vectors.get(name).cloned()
    }

    /// Handle to a registered function.
    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<FunctionRef> {
        self.store.borrow().functions.get(name).cloned()
    }

    /// Looks up any kind of binding.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        let store = self.store.borrow();

        if let Some(slot) = store.variables.get(name) {
            return Some(Binding::Scalar { variable: slot.storage.clone(),
                                          constant: slot.constant, });
        }
        if let Some(slot) = store.strings.get(name) {
            return Some(Binding::String { variable: slot.storage.clone(),
                                          constant: slot.constant, });
        }
        if let Some(vector) = store.vectors.get(name) {
            return Some(Binding::Vector(vector.clone()));
        }
        store.functions
             .get(name)
             .map(|function| Binding::Function(Rc::clone(function)))
    }

    /// Number of scalars, constants included.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.store.borrow().variables.len()
    }

    /// Number of string variables.
    #[must_use]
    pub fn stringvar_count(&self) -> usize {
        self.store.borrow().strings.len()
    }

    /// Number of vectors.
    #[must_use]
    pub fn vector_count(&self) -> usize {
        self.store.borrow().vectors.len()
    }

    /// Number of user functions.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.store.borrow().functions.len()
    }

    /// Whether any binding uses `name`.
    #[must_use]
    pub fn symbol_exists(&self, name: &str) -> bool {
        self.store.borrow().contains(name)
    }

    /// Whether `name` is a constant scalar.
    #[must_use]
    pub fn is_constant_node(&self, name: &str) -> bool {
        self.store
            .borrow()
            .variables
            .get(name)
            .is_some_and(|slot| slot.constant)
    }

    /// Whether `name` is a constant string.
    #[must_use]
    pub fn is_constant_string(&self, name: &str) -> bool {
        self.store
            .borrow()
            .strings
            .get(name)
            .is_some_and(|slot| slot.constant)
    }

    /// Names of all scalars, constants included.
    #[must_use]
    pub fn get_variable_list(&self) -> Vec<String> {
        self.store.borrow().variables.keys().cloned().collect()
    }

    /// Names of all string variables.
    #[must_use]
    pub fn get_stringvar_list(&self) -> Vec<String> {
        self.store.borrow().strings.keys().cloned().collect()
    }

    /// Names of all vectors.
    #[must_use]
    pub fn get_vector_list(&self) -> Vec<String> {
        self.store.borrow().vectors.keys().cloned().collect()
    }

    /// Names of all user functions.
    #[must_use]
    pub fn get_function_list(&self) -> Vec<String> {
        self.store.borrow().functions.keys().cloned().collect()
    }

    /// Registers `pi`, `epsilon` and `inf`.
    ///
    /// Returns `false` if any of the names was already taken; the others are
    /// still registered.
    pub fn add_constants(&self) -> bool {
        let pi = self.add_pi();
        let epsilon = self.add_epsilon();
        let infinity = self.add_infinity();
        pi && epsilon && infinity
    }

    /// Registers `pi`.
    pub fn add_pi(&self) -> bool {
        self.add_constant("pi", std::f64::consts::PI).is_ok()
    }

    /// Registers `epsilon`, the machine epsilon of `f64`.
    pub fn add_epsilon(&self) -> bool {
        self.add_constant("epsilon", f64::EPSILON).is_ok()
    }

    /// Registers `inf`, positive infinity.
    pub fn add_infinity(&self) -> bool {
        self.add_constant("inf", f64::INFINITY).is_ok()
    }

    /// Merges the bindings of `other` into this table.
    ///
    /// Scalars, strings and vectors are copied into fresh storage; functions
    /// are shared. Names already present here are left untouched. Returns the
    /// number of bindings added.
    ///
    /// # Example
    /// ```
    /// use formulary::SymbolTable;
    ///
    /// let base = SymbolTable::new();
    /// base.create_variable("x", 1.0).unwrap();
    /// base.create_variable("y", 2.0).unwrap();
    ///
    /// let table = SymbolTable::new();
    /// table.create_variable("x", 10.0).unwrap();
    ///
    /// assert_eq!(table.load_from(&base), 1);
    /// assert_eq!(table.variable_ref("x").unwrap().get(), 10.0);
    /// assert_eq!(table.variable_ref("y").unwrap().get(), 2.0);
    /// ```
    pub fn load_from(&self, other: &Self) -> usize {
        if Rc::ptr_eq(&self.store, &other.store) {
            return 0;
        }

        let source = other.store.borrow();
        let mut target = self.store.borrow_mut();
        let mut added = 0;

        for (name, slot) in &source.variables {
            if !target.contains(name) {
                target.variables.insert(name.clone(),
                                        Slot { storage:  Variable::new(slot.storage.get()),
                                               constant: slot.constant, });
                added += 1;
            }
        }
        for (name, slot) in &source.strings {
            if !target.contains(name) {
                target.strings.insert(name.clone(),
                                      Slot { storage:  StringVar::new(&*slot.storage.borrow()),
                                             constant: slot.constant, });
                added += 1;
            }
        }
        for (name, vector) in &source.vectors {
            if !target.contains(name) {
                target.vectors
                      .insert(name.clone(), VectorVar::new(&vector.borrow()));
                added += 1;
            }
        }
        for (name, function) in &source.functions {
            if !target.contains(name) {
                target.functions.insert(name.clone(), Rc::clone(function));
                added += 1;
            }
        }

        debug!(added, "loaded bindings from another table");
        added
    }

    /// Cheap sanity check: the table is not in the middle of a mutation.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.store.try_borrow_mut().is_ok()
    }

    /// Whether both handles share the same bindings.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    /// Validates `name` and runs `insert` when it is free.
    fn insert(&self,
              name: &str,
              insert: impl FnOnce(&mut SymbolStore))
              -> Result<(), BindingError> {
        let result = validate_name(name).and_then(|()| {
                                            let mut store = self.store.borrow_mut();
                                            if store.contains(name) {
                                                return Err(BindingError::DuplicateName {
                                                    name: name.to_string(),
                                                });
                                            }
                                            insert(&mut store);
                                            Ok(())
                                        });

        if let Err(error) = &result {
            debug!(name, %error, "binding rejected");
        }
        result
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.borrow();
        f.debug_struct("SymbolTable")
         .field("variables",
                &store.variables
                      .iter()
                      .map(|(name, slot)| (name, slot.storage.get()))
                      .collect::<Vec<_>>())
         .field("strings",
                &store.strings
                      .iter()
                      .map(|(name, slot)| (name, slot.storage.to_string_lossy()))
                      .collect::<Vec<_>>())
         .field("vectors",
                &store.vectors
                      .iter()
                      .map(|(name, vector)| (name, vector.to_vec()))
                      .collect::<Vec<_>>())
         .field("functions", &store.functions.keys().collect::<Vec<_>>())
         .finish()
    }
}

/// Checks the shape of a symbol name.
///
/// A valid name starts with an ASCII letter or underscore, continues with
/// ASCII letters, digits or underscores, and is neither a keyword nor a
/// built-in function.
///
/// # Example
/// ```
/// use formulary::symbol_table::core::validate_name;
///
/// assert!(validate_name("x_1").is_ok());
/// assert!(validate_name("1x").is_err());
/// assert!(validate_name("sin").is_err());
/// assert!(validate_name("while").is_err());
/// ```
///
/// # Errors
/// Returns [`BindingError::InvalidName`] or [`BindingError::ReservedName`].
pub fn validate_name(name: &str) -> Result<(), BindingError> {
    let mut chars = name.chars();
    let well_formed = chars.next()
                           .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                      && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !well_formed {
        return Err(BindingError::InvalidName { name: name.to_string() });
    }
    if is_reserved_identifier(name) {
        return Err(BindingError::ReservedName { name: name.to_string() });
    }
    Ok(())
}

/// Whether `name` is a keyword or the name of a built-in function.
#[must_use]
pub fn is_reserved_identifier(name: &str) -> bool {
    KEYWORDS.contains(&name) || is_builtin(name)
}

fn not_found(name: &str, kind: &'static str) -> BindingError {
    BindingError::NotFound { name: name.to_string(),
                             kind }
}
