use crate::closures::{Closure, EffClosure};
use crate::error::{ContractViolation, OrRaise};
use crate::list_ops::Array;
use pcc_core::{Key, Managed, make_managed, make_managed_unsized};
use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_void;
use std::fmt;
use std::ops::Deref;

/// Deferred computation: called with no arguments, yields the next value
pub type ThunkFn = fn() -> Value;

/// Plain one-argument function
pub type Function = fn(&Value) -> Value;

/// Plain zero-argument effect
pub type EffFunction = fn() -> Value;

/// Record payload: (key, value) slots in construction order
pub type MapEntries = Box<[(Key, Value)]>;

/// Data constructor payload: field 0 is the constructor tag
pub type DataFields = Box<[Value]>;

/// Discriminant of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Thunk,
    Integer,
    Double,
    Character,
    Boolean,
    StringLiteral,
    String,
    Array,
    Function,
    EffFunction,
    Closure,
    EffClosure,
    Map,
    Data,
    RawPointer,
    Pointer,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Thunk => "Thunk",
            Tag::Integer => "Integer",
            Tag::Double => "Double",
            Tag::Character => "Character",
            Tag::Boolean => "Boolean",
            Tag::StringLiteral => "StringLiteral",
            Tag::String => "String",
            Tag::Array => "Array",
            Tag::Function => "Function",
            Tag::EffFunction => "EffFunction",
            Tag::Closure => "Closure",
            Tag::EffClosure => "EffClosure",
            Tag::Map => "Map",
            Tag::Data => "Data",
            Tag::RawPointer => "RawPointer",
            Tag::Pointer => "Pointer",
        }
    }

    /// Either text storage
    pub fn is_text(self) -> bool {
        matches!(self, Tag::StringLiteral | Tag::String)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value: the single runtime representation every expression evaluates to
///
/// Exactly one payload is active, selected by the variant. Scalars, static
/// text, plain functions and raw pointers are stored inline and copied.
/// Everything else is held through a [`Managed`] handle: cloning a `Value`
/// shares the payload and bumps its count, dropping releases it.
///
/// A `Thunk` is not a terminal value. Operations that inspect a variant go
/// through [`Value::force`] first, which resolves any chain of thunks.
///
/// # Mutability
///
/// Only `Array` has interior mutability: its element sequence is shared by
/// every holder and may grow or shrink in place. All other payloads are
/// immutable once constructed.
#[derive(Clone)]
pub enum Value {
    /// Deferred computation, resolved by forcing
    Thunk(ThunkFn),

    /// 32-bit signed integer
    Integer(i32),

    /// IEEE 754 double precision
    Double(f64),

    /// Unicode scalar value
    Character(char),

    /// Boolean value
    Boolean(bool),

    /// Borrowed text with static lifetime, never freed by the value
    StringLiteral(&'static str),

    /// Owned text, shared
    String(Managed<String>),

    /// Shared mutable sequence of values
    Array(Array),

    /// Plain one-argument function pointer
    Function(Function),

    /// Plain zero-argument effect pointer
    EffFunction(EffFunction),

    /// One-argument function with captured state
    Closure(Managed<dyn Closure>),

    /// Zero-argument effect with captured state
    EffClosure(Managed<dyn EffClosure>),

    /// Fixed-size record: (key, value) slots, looked up by key identity
    Map(Managed<MapEntries>),

    /// Fixed-size algebraic data constructor payload
    Data(Managed<DataFields>),

    /// Untyped foreign pointer, not owned
    RawPointer(*mut c_void),

    /// Typed opaque foreign object, shared
    Pointer(Managed<dyn Any>),
}

impl Value {
    /// Current discriminant (without forcing)
    pub fn tag(&self) -> Tag {
        match self {
            Value::Thunk(_) => Tag::Thunk,
            Value::Integer(_) => Tag::Integer,
            Value::Double(_) => Tag::Double,
            Value::Character(_) => Tag::Character,
            Value::Boolean(_) => Tag::Boolean,
            Value::StringLiteral(_) => Tag::StringLiteral,
            Value::String(_) => Tag::String,
            Value::Array(_) => Tag::Array,
            Value::Function(_) => Tag::Function,
            Value::EffFunction(_) => Tag::EffFunction,
            Value::Closure(_) => Tag::Closure,
            Value::EffClosure(_) => Tag::EffClosure,
            Value::Map(_) => Tag::Map,
            Value::Data(_) => Tag::Data,
            Value::RawPointer(_) => Tag::RawPointer,
            Value::Pointer(_) => Tag::Pointer,
        }
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Integer from a 64-bit source, range-checked against `i32`
    pub fn try_from_long(n: i64) -> Result<Value, ContractViolation> {
        i32::try_from(n).map(Value::Integer).map_err(|_| {
            ContractViolation::new("from_long", "value within Integer range", Tag::Integer)
                .with_detail(format!("{} does not fit in 32 bits", n))
        })
    }

    /// Deferred value
    pub fn thunk(f: ThunkFn) -> Value {
        Value::Thunk(f)
    }

    /// Plain one-argument function
    pub fn function(f: Function) -> Value {
        Value::Function(f)
    }

    /// Plain zero-argument effect
    pub fn eff_function(f: EffFunction) -> Value {
        Value::EffFunction(f)
    }

    /// One-argument function with captured state, allocated once and shared
    pub fn closure<F>(f: F) -> Value
    where
        F: Fn(&Value) -> Value + 'static,
    {
        Value::Closure(make_managed_unsized!(f => dyn Closure))
    }

    /// Zero-argument effect with captured state, allocated once and shared
    pub fn eff_closure<F>(f: F) -> Value
    where
        F: Fn() -> Value + 'static,
    {
        Value::EffClosure(make_managed_unsized!(f => dyn EffClosure))
    }

    /// Record from its (key, value) slots; the slots are moved, never copied
    ///
    /// Takes anything that yields owned slots (array, `Vec`, boxed slice,
    /// iterator). A borrowed slice yields references and is rejected.
    pub fn record(entries: impl IntoIterator<Item = (Key, Value)>) -> Value {
        Value::Map(make_managed(entries.into_iter().collect::<MapEntries>()))
    }

    /// Data constructor from its fields (field 0 is the constructor tag)
    pub fn data(fields: impl IntoIterator<Item = Value>) -> Value {
        Value::Data(make_managed(fields.into_iter().collect::<DataFields>()))
    }

    /// Typed opaque foreign object
    pub fn pointer<T: Any>(object: T) -> Value {
        Value::Pointer(make_managed_unsized!(object => dyn Any))
    }

    /// Untyped foreign pointer
    pub fn raw_pointer(ptr: *mut c_void) -> Value {
        Value::RawPointer(ptr)
    }

    /// The null pointer sentinel
    pub fn null() -> Value {
        Value::RawPointer(std::ptr::null_mut())
    }

    // ------------------------------------------------------------------
    // Coercion
    // ------------------------------------------------------------------

    pub fn try_as_int(&self) -> Result<i32, ContractViolation> {
        match &*self.force() {
            Value::Integer(n) => Ok(*n),
            other => Err(ContractViolation::new("as_int", "Integer", other.tag())),
        }
    }

    pub fn as_int(&self) -> i32 {
        self.try_as_int().or_raise()
    }

    pub fn try_as_double(&self) -> Result<f64, ContractViolation> {
        match &*self.force() {
            Value::Double(d) => Ok(*d),
            other => Err(ContractViolation::new("as_double", "Double", other.tag())),
        }
    }

    pub fn as_double(&self) -> f64 {
        self.try_as_double().or_raise()
    }

    pub fn try_as_bool(&self) -> Result<bool, ContractViolation> {
        match &*self.force() {
            Value::Boolean(b) => Ok(*b),
            other => Err(ContractViolation::new("as_bool", "Boolean", other.tag())),
        }
    }

    pub fn as_bool(&self) -> bool {
        self.try_as_bool().or_raise()
    }

    pub fn try_as_char(&self) -> Result<char, ContractViolation> {
        match &*self.force() {
            Value::Character(c) => Ok(*c),
            other => Err(ContractViolation::new("as_char", "Character", other.tag())),
        }
    }

    pub fn as_char(&self) -> char {
        self.try_as_char().or_raise()
    }

    /// Non-negative Integer as an index or size
    pub fn try_as_usize(&self) -> Result<usize, ContractViolation> {
        let n = self.try_as_int().map_err(|mut v| {
            v.operation = "as_usize";
            v
        })?;
        usize::try_from(n).map_err(|_| {
            ContractViolation::new("as_usize", "non-negative Integer", Tag::Integer)
                .with_detail(format!("got {}", n))
        })
    }

    pub fn as_usize(&self) -> usize {
        self.try_as_usize().or_raise()
    }

    /// Text content, whichever storage backs it
    pub fn try_as_text(&self) -> Result<Text, ContractViolation> {
        match &*self.force() {
            Value::StringLiteral(s) => Ok(Text::Literal(*s)),
            Value::String(s) => Ok(Text::Owned(s.clone())),
            other => Err(ContractViolation::new(
                "as_text",
                "String or StringLiteral",
                other.tag(),
            )),
        }
    }

    pub fn as_text(&self) -> Text {
        self.try_as_text().or_raise()
    }

    /// Shared handle to the array payload (not a copy of the elements)
    pub fn try_as_array(&self) -> Result<Array, ContractViolation> {
        match &*self.force() {
            Value::Array(a) => Ok(a.clone()),
            other => Err(ContractViolation::new("as_array", "Array", other.tag())),
        }
    }

    pub fn as_array(&self) -> Array {
        self.try_as_array().or_raise()
    }

    pub fn try_as_raw_pointer(&self) -> Result<*mut c_void, ContractViolation> {
        match &*self.force() {
            Value::RawPointer(p) => Ok(*p),
            other => Err(ContractViolation::new(
                "as_raw_pointer",
                "RawPointer",
                other.tag(),
            )),
        }
    }

    pub fn as_raw_pointer(&self) -> *mut c_void {
        self.try_as_raw_pointer().or_raise()
    }

    /// Payload address of a Map, Data or Pointer value
    ///
    /// `expected` names the variant the caller believes it holds; a mismatch
    /// is a violation.
    pub fn try_extract_pointer(&self, expected: Tag) -> Result<*const (), ContractViolation> {
        let forced = self.force();
        let ptr = match (&*forced, expected) {
            (Value::Map(m), Tag::Map) => Managed::as_ptr(m),
            (Value::Data(d), Tag::Data) => Managed::as_ptr(d),
            (Value::Pointer(p), Tag::Pointer) => Managed::as_ptr(p),
            (other, _) => {
                return Err(ContractViolation::new(
                    "extract_pointer",
                    expected.name(),
                    other.tag(),
                ));
            }
        };
        Ok(ptr)
    }

    pub fn extract_pointer(&self, expected: Tag) -> *const () {
        self.try_extract_pointer(expected).or_raise()
    }

    /// Borrow the typed foreign object behind a Pointer value
    pub fn try_with_pointer<T: Any, R>(
        &self,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R, ContractViolation> {
        let forced = self.force();
        match &*forced {
            Value::Pointer(p) => match p.downcast_ref::<T>() {
                Some(object) => Ok(f(object)),
                None => Err(
                    ContractViolation::new("with_pointer", "Pointer of the requested type", Tag::Pointer)
                        .with_detail(std::any::type_name::<T>()),
                ),
            },
            other => Err(ContractViolation::new("with_pointer", "Pointer", other.tag())),
        }
    }

    pub fn with_pointer<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.try_with_pointer(f).or_raise()
    }

    /// Element count of an Array, byte length of text
    pub fn try_size(&self) -> Result<usize, ContractViolation> {
        match &*self.force() {
            Value::Array(a) => Ok(a.len()),
            Value::StringLiteral(s) => Ok(s.len()),
            Value::String(s) => Ok(s.len()),
            other => Err(ContractViolation::new(
                "size",
                "Array, String or StringLiteral",
                other.tag(),
            )),
        }
    }

    pub fn size(&self) -> usize {
        self.try_size().or_raise()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Text content of an already-forced value, None for non-text variants
    pub(crate) fn text_ref(&self) -> Option<&str> {
        match self {
            Value::StringLiteral(s) => Some(s),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------
// Conversions from native values
// ----------------------------------------------------------------------

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<i64> for Value {
    /// Out-of-range input raises
    fn from(n: i64) -> Self {
        Value::try_from_long(n).or_raise()
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Character(c)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&'static str> for Value {
    /// Stored as a borrowed literal, no copy
    fn from(s: &'static str) -> Self {
        Value::StringLiteral(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(make_managed(s))
    }
}

impl From<Managed<String>> for Value {
    fn from(s: Managed<String>) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from(items))
    }
}

impl From<&[Value]> for Value {
    /// Copies the elements into a new array (payloads are shared)
    fn from(items: &[Value]) -> Self {
        Value::Array(Array::from(items.to_vec()))
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl<const N: usize> From<[(Key, Value); N]> for Value {
    fn from(entries: [(Key, Value); N]) -> Self {
        Value::record(entries)
    }
}

impl From<Text> for Value {
    fn from(text: Text) -> Self {
        match text {
            Text::Literal(s) => Value::StringLiteral(s),
            Text::Owned(s) => Value::String(s),
        }
    }
}

thread_local! {
    // Arrays whose elements are being formatted on this thread
    static FORMATTING: RefCell<Vec<*const ()>> = const { RefCell::new(Vec::new()) };
}

fn fmt_array(array: &Array, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let id = array.as_ptr();
    if FORMATTING.with(|open| open.borrow().contains(&id)) {
        return f.write_str("Array(<cycle>)");
    }
    FORMATTING.with(|open| open.borrow_mut().push(id));
    let result = f.debug_tuple("Array").field(&array.to_vec()).finish();
    FORMATTING.with(|open| open.borrow_mut().pop());
    result
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Thunk(t) => write!(f, "Thunk({:p})", *t as *const ()),
            Value::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            Value::Double(d) => f.debug_tuple("Double").field(d).finish(),
            Value::Character(c) => f.debug_tuple("Character").field(c).finish(),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::StringLiteral(s) => f.debug_tuple("StringLiteral").field(s).finish(),
            Value::String(s) => f.debug_tuple("String").field(&s.as_str()).finish(),
            Value::Array(a) => fmt_array(a, f),
            Value::Function(func) => write!(f, "Function({:p})", *func as *const ()),
            Value::EffFunction(func) => write!(f, "EffFunction({:p})", *func as *const ()),
            Value::Closure(c) => write!(f, "Closure({:p})", Managed::as_ptr(c)),
            Value::EffClosure(c) => write!(f, "EffClosure({:p})", Managed::as_ptr(c)),
            Value::Map(m) => {
                f.write_str("Map")?;
                f.debug_map().entries(m.iter().map(|(k, v)| (k, v))).finish()
            }
            Value::Data(d) => f.debug_tuple("Data").field(&&d[..]).finish(),
            Value::RawPointer(p) => write!(f, "RawPointer({:p})", *p),
            Value::Pointer(p) => write!(f, "Pointer({:p})", Managed::as_ptr(p)),
        }
    }
}

/// Text content backed by either storage strategy
///
/// Cheap to clone: a literal is a `&'static str`, owned text shares the
/// managed buffer.
#[derive(Clone)]
pub enum Text {
    Literal(&'static str),
    Owned(Managed<String>),
}

impl Text {
    pub fn as_str(&self) -> &str {
        match self {
            Text::Literal(s) => s,
            Text::Owned(s) => s.as_str(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Text::Literal(_))
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Text {}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
