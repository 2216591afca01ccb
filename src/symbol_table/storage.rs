use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

/// Shared storage for one scalar binding.
///
/// Cloning a `Variable` produces another handle to the same slot. Compiled
/// expressions read the slot on every evaluation, so [`Variable::set`] is
/// visible to the next evaluation without recompiling.
///
/// # Example
/// ```
/// use formulary::Variable;
///
/// let x = Variable::new(1.0);
/// let alias = x.clone();
/// alias.set(5.0);
///
/// assert_eq!(x.get(), 5.0);
/// ```
#[derive(Clone, Default)]
pub struct Variable(Rc<Cell<f64>>);

impl Variable {
    /// Allocates a new slot holding `value`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> f64 {
        self.0.get()
    }

    /// Replaces the value.
    pub fn set(&self, value: f64) {
        self.0.set(value);
    }

    /// Whether both handles point to the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({})", self.get())
    }
}

/// Shared storage for one string binding.
///
/// Strings are byte strings: they are not required to be UTF-8 and may
/// contain NUL bytes. Replacing the content may change its length.
///
/// # Example
/// ```
/// use formulary::StringVar;
///
/// let s = StringVar::new("hello");
/// s.set(b"a\0b");
///
/// assert_eq!(s.get(), b"a\0b".to_vec());
/// assert_eq!(s.len(), 3);
/// ```
#[derive(Clone, Default)]
pub struct StringVar(Rc<RefCell<Vec<u8>>>);

impl StringVar {
    /// Allocates a new string slot holding a copy of `value`.
    #[must_use]
    pub fn new(value: impl AsRef<[u8]>) -> Self {
        Self(Rc::new(RefCell::new(value.as_ref().to_vec())))
    }

    /// A copy of the current content.
    #[must_use]
    pub fn get(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    /// Replaces the content.
    pub fn set(&self, value: impl AsRef<[u8]>) {
        let mut content = self.0.borrow_mut();
        content.clear();
        content.extend_from_slice(value.as_ref());
    }

    /// Appends to the content.
    pub fn append(&self, value: &[u8]) {
        self.0.borrow_mut().extend_from_slice(value);
    }

    /// Borrows the content without copying it.
    ///
    /// # Panics
    /// Panics if the string is being modified at the same time.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, [u8]> {
        Ref::map(self.0.borrow(), Vec::as_slice)
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// The content decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Whether both handles point to the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StringVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringVar({:?})", self.to_string_lossy())
    }
}

/// Shared storage for one fixed-length vector binding.
///
/// The length is set at construction. Element writes and
/// [`VectorVar::copy_from`] never change it.
///
/// # Example
/// ```
/// use formulary::VectorVar;
///
/// let v = VectorVar::new(&[1.0, 2.0, 3.0]);
/// v.copy_from(&[9.0, 8.0]);
///
/// assert_eq!(v.to_vec(), vec![9.0, 8.0, 3.0]);
/// assert_eq!(v.get(5), None);
/// ```
#[derive(Clone)]
pub struct VectorVar(Rc<RefCell<Vec<f64>>>);

impl VectorVar {
    /// Allocates a vector holding a copy of `values`.
    #[must_use]
    pub fn new(values: &[f64]) -> Self {
        Self(Rc::new(RefCell::new(values.to_vec())))
    }

    /// Allocates a vector of `len` zeros.
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self(Rc::new(RefCell::new(vec![0.0; len])))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// The element at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.borrow().get(index).copied()
    }

    /// Writes the element at `index`. Returns `false` when out of range.
    pub fn set(&self, index: usize, value: f64) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            },
            None => false,
        }
    }

    /// Overwrites the leading elements with `values`; extra values are
    /// ignored.
    pub fn copy_from(&self, values: &[f64]) {
        for (slot, value) in self.0.borrow_mut().iter_mut().zip(values) {
            *slot = *value;
        }
    }

    /// A copy of all elements.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.borrow().clone()
    }

    /// Borrows the contiguous backing storage.
    ///
    /// # Panics
    /// Panics if the vector is being modified at the same time.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, [f64]> {
        Ref::map(self.0.borrow(), Vec::as_slice)
    }

    /// Mutably borrows the backing storage. The slice cannot change length.
    ///
    /// # Panics
    /// Panics if the vector is borrowed elsewhere at the same time.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, [f64]> {
        RefMut::map(self.0.borrow_mut(), Vec::as_mut_slice)
    }

    /// Whether both handles point to the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for VectorVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VectorVar({:?})", self.0.borrow())
    }
}
