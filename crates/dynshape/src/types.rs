//! Shapes and values: the runtime type layer both the converter and the comparator
//! operate on.
//!
//! A [`Shape`] is the declared type of a slot. A [`Value`] is a value together with
//! enough of its shape to be classified, allocated into, and compared without any
//! static type information: empty sequences still know their element shape, nil
//! pointers still know what they would point to, structs carry their field list with
//! per-field visibility.
//!
//! `&mut Value` is the settable handle the converter writes through; `&Value` is the
//! read-only handle the comparator inspects.

use crate::error::BoxError;
use crate::kind::Kind;
use std::fmt;
use std::sync::Arc;

/// Bit width of a signed integer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// Narrow `n` to this width with two's complement wrapping, as a cast would.
    pub fn truncate(self, n: i64) -> i64 {
        match self {
            IntWidth::W8 => n as i8 as i64,
            IntWidth::W16 => n as i16 as i64,
            IntWidth::W32 => n as i32 as i64,
            IntWidth::W64 => n,
        }
    }

    pub fn fits(self, n: i64) -> bool {
        self.truncate(n) == n
    }
}

/// Bit width of an unsigned integer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UintWidth {
    W8,
    W16,
    W32,
    W64,
}

impl UintWidth {
    pub fn bits(self) -> u32 {
        match self {
            UintWidth::W8 => 8,
            UintWidth::W16 => 16,
            UintWidth::W32 => 32,
            UintWidth::W64 => 64,
        }
    }

    pub fn truncate(self, n: u64) -> u64 {
        match self {
            UintWidth::W8 => n as u8 as u64,
            UintWidth::W16 => n as u16 as u64,
            UintWidth::W32 => n as u32 as u64,
            UintWidth::W64 => n,
        }
    }

    pub fn fits(self, n: u64) -> bool {
        self.truncate(n) == n
    }
}

/// A complex number with real and imaginary parts of the same precision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

/// Shapes with no text conversion and no meaningful ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opaque {
    Func,
    Chan,
    UnsafePointer,
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opaque::Func => f.write_str("func"),
            Opaque::Chan => f.write_str("chan"),
            Opaque::UnsafePointer => f.write_str("unsafe pointer"),
        }
    }
}

/// A shape that parses itself from text instead of going through the generic grammar.
///
/// Timestamps are the typical case: `2026-03-01T09:00:00Z` has no sensible reading as
/// a positional struct literal, so the shape opts out and owns its text format.
pub trait TextUnmarshaler: fmt::Debug + Send + Sync {
    /// Name of the shape, used for shape equality and error messages.
    fn type_name(&self) -> &str;

    /// The zero value stored before any text has been parsed.
    fn zero(&self) -> Value;

    /// Parse `text` into the value this shape stores.
    fn unmarshal_text(&self, text: &str) -> Result<Value, BoxError>;

    /// Render a stored value back to text. Defaults to the generic grammar.
    fn marshal_text(&self, value: &Value) -> String {
        crate::encode::format_value(value)
    }
}

/// One field of a struct shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
    /// Private fields are invisible to comparison, conversion and the struct helpers.
    pub public: bool,
}

/// Named, ordered field list of a struct.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructShape {
    pub name: String,
    pub fields: Vec<FieldShape>,
}

impl StructShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a public field.
    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(FieldShape {
            name: name.into(),
            shape,
            public: true,
        });
        self
    }

    /// Append a private field.
    pub fn private_field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(FieldShape {
            name: name.into(),
            shape,
            public: false,
        });
        self
    }

    pub fn public_fields(&self) -> impl Iterator<Item = &FieldShape> {
        self.fields.iter().filter(|f| f.public)
    }

    pub fn into_shape(self) -> Shape {
        Shape::Struct(Arc::new(self))
    }
}

/// Declared type of a slot.
#[derive(Debug, Clone)]
pub enum Shape {
    Bool,
    Int(IntWidth),
    Uint(UintWidth),
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    /// Fixed-length sequence.
    Array(Box<Shape>, usize),
    Slice(Box<Shape>),
    /// Key shape, value shape.
    Map(Box<Shape>, Box<Shape>),
    Struct(Arc<StructShape>),
    Pointer(Box<Shape>),
    /// Holds a value of any shape.
    Interface,
    Custom(Arc<dyn TextUnmarshaler>),
    Opaque(Opaque),
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Shape::Bool, Shape::Bool)
            | (Shape::Float32, Shape::Float32)
            | (Shape::Float64, Shape::Float64)
            | (Shape::Complex64, Shape::Complex64)
            | (Shape::Complex128, Shape::Complex128)
            | (Shape::String, Shape::String)
            | (Shape::Interface, Shape::Interface) => true,
            (Shape::Int(a), Shape::Int(b)) => a == b,
            (Shape::Uint(a), Shape::Uint(b)) => a == b,
            (Shape::Array(a, n), Shape::Array(b, m)) => n == m && a == b,
            (Shape::Slice(a), Shape::Slice(b)) | (Shape::Pointer(a), Shape::Pointer(b)) => a == b,
            (Shape::Map(ak, av), Shape::Map(bk, bv)) => ak == bk && av == bv,
            (Shape::Struct(a), Shape::Struct(b)) => Arc::ptr_eq(a, b) || a == b,
            (Shape::Custom(a), Shape::Custom(b)) => a.type_name() == b.type_name(),
            (Shape::Opaque(a), Shape::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl Shape {
    pub fn array(elem: Shape, len: usize) -> Self {
        Shape::Array(Box::new(elem), len)
    }

    pub fn slice(elem: Shape) -> Self {
        Shape::Slice(Box::new(elem))
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Shape::Map(Box::new(key), Box::new(value))
    }

    pub fn pointer(elem: Shape) -> Self {
        Shape::Pointer(Box::new(elem))
    }

    /// Kind of values stored in a slot of this shape. Custom shapes report the kind of
    /// their zero value.
    pub fn kind(&self) -> Kind {
        match self {
            Shape::Bool => Kind::Bool,
            Shape::Int(_) => Kind::Int,
            Shape::Uint(_) => Kind::Uint,
            Shape::Float32 => Kind::Float32,
            Shape::Float64 => Kind::Float64,
            Shape::Complex64 => Kind::Complex64,
            Shape::Complex128 => Kind::Complex128,
            Shape::String => Kind::String,
            Shape::Array(..) => Kind::Array,
            Shape::Slice(_) => Kind::Slice,
            Shape::Map(..) => Kind::Map,
            Shape::Struct(_) => Kind::Struct,
            Shape::Pointer(_) => Kind::Pointer,
            Shape::Interface => Kind::Interface,
            Shape::Custom(u) => u.zero().kind(),
            Shape::Opaque(_) => Kind::Unsupported,
        }
    }

    /// Allocate a zero value of this shape.
    pub fn zero(&self) -> Value {
        match self {
            Shape::Bool => Value::Bool(false),
            Shape::Int(w) => Value::Int(*w, 0),
            Shape::Uint(w) => Value::Uint(*w, 0),
            Shape::Float32 => Value::Float32(0.0),
            Shape::Float64 => Value::Float64(0.0),
            Shape::Complex64 => Value::Complex64(Complex::default()),
            Shape::Complex128 => Value::Complex128(Complex::default()),
            Shape::String => Value::String(String::new()),
            Shape::Array(elem, len) => Value::Array(Sequence {
                elem: (**elem).clone(),
                items: (0..*len).map(|_| elem.zero()).collect(),
            }),
            Shape::Slice(elem) => Value::Slice(Sequence::new((**elem).clone())),
            Shape::Map(key, value) => {
                Value::Map(MapValue::new((**key).clone(), (**value).clone()))
            }
            Shape::Struct(s) => Value::Struct(StructValue::zero(Arc::clone(s))),
            Shape::Pointer(elem) => Value::Pointer(PointerValue::nil((**elem).clone())),
            Shape::Interface => Value::Interface(None),
            Shape::Custom(u) => Value::Custom(CustomValue {
                unmarshaler: Arc::clone(u),
                inner: Box::new(u.zero()),
            }),
            Shape::Opaque(o) => Value::Opaque(*o),
        }
    }
}

/// Contents of an array or slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub elem: Shape,
    pub items: Vec<Value>,
}

impl Sequence {
    pub fn new(elem: Shape) -> Self {
        Self {
            elem,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Associative container. Entries keep insertion order; inserting an equal key
/// replaces the stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    pub key: Shape,
    pub value: Shape,
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new(key: Shape, value: Shape) -> Self {
        Self {
            key,
            value,
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn into_entries(self) -> Vec<(Value, Value)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A struct instance: its shape plus one value per declared field, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub shape: Arc<StructShape>,
    pub values: Vec<Value>,
}

impl StructValue {
    /// Every field at its zero value.
    pub fn zero(shape: Arc<StructShape>) -> Self {
        let values = shape.fields.iter().map(|f| f.shape.zero()).collect();
        Self { shape, values }
    }

    pub fn name(&self) -> &str {
        &self.shape.name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldShape, &Value)> {
        self.shape.fields.iter().zip(&self.values)
    }

    /// Public fields in declaration order.
    pub fn public_fields(&self) -> impl Iterator<Item = (&FieldShape, &Value)> {
        self.fields().filter(|(f, _)| f.public)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.index_of(name)?;
        self.values.get(idx)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let idx = self.index_of(name)?;
        self.values.get_mut(idx)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.shape.fields.iter().position(|f| f.name == name)
    }
}

/// A pointer slot. `target == None` is nil.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerValue {
    pub elem: Shape,
    pub target: Option<Box<Value>>,
}

impl PointerValue {
    pub fn nil(elem: Shape) -> Self {
        Self { elem, target: None }
    }

    pub fn is_nil(&self) -> bool {
        self.target.is_none()
    }
}

/// A value whose shape owns its text format.
#[derive(Debug, Clone)]
pub struct CustomValue {
    pub unmarshaler: Arc<dyn TextUnmarshaler>,
    pub inner: Box<Value>,
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.unmarshaler.type_name() == other.unmarshaler.type_name() && self.inner == other.inner
    }
}

/// A runtime value of any shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Payload always fits the width.
    Int(IntWidth, i64),
    Uint(UintWidth, u64),
    Float32(f32),
    Float64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
    String(String),
    Array(Sequence),
    Slice(Sequence),
    Map(MapValue),
    Struct(StructValue),
    Pointer(PointerValue),
    /// `None` is a nil interface.
    Interface(Option<Box<Value>>),
    Custom(CustomValue),
    Opaque(Opaque),
}

impl Value {
    /// 64-bit signed integer.
    pub fn int(n: i64) -> Self {
        Value::Int(IntWidth::W64, n)
    }

    /// 64-bit unsigned integer.
    pub fn uint(n: u64) -> Self {
        Value::Uint(UintWidth::W64, n)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn slice(elem: Shape, items: Vec<Value>) -> Self {
        Value::Slice(Sequence { elem, items })
    }

    pub fn array(elem: Shape, items: Vec<Value>) -> Self {
        Value::Array(Sequence { elem, items })
    }

    /// Non-nil pointer to `value`.
    pub fn pointer_to(value: Value) -> Self {
        Value::Pointer(PointerValue {
            elem: value.shape(),
            target: Some(Box::new(value)),
        })
    }

    /// Interface holding `value`.
    pub fn any(value: Value) -> Self {
        Value::Interface(Some(Box::new(value)))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(..) => Kind::Int,
            Value::Uint(..) => Kind::Uint,
            Value::Float32(_) => Kind::Float32,
            Value::Float64(_) => Kind::Float64,
            Value::Complex64(_) => Kind::Complex64,
            Value::Complex128(_) => Kind::Complex128,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Slice(_) => Kind::Slice,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
            Value::Pointer(_) => Kind::Pointer,
            Value::Interface(_) => Kind::Interface,
            Value::Custom(c) => c.inner.kind(),
            Value::Opaque(_) => Kind::Unsupported,
        }
    }

    /// Declared shape of this value's slot.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Bool(_) => Shape::Bool,
            Value::Int(w, _) => Shape::Int(*w),
            Value::Uint(w, _) => Shape::Uint(*w),
            Value::Float32(_) => Shape::Float32,
            Value::Float64(_) => Shape::Float64,
            Value::Complex64(_) => Shape::Complex64,
            Value::Complex128(_) => Shape::Complex128,
            Value::String(_) => Shape::String,
            Value::Array(seq) => Shape::array(seq.elem.clone(), seq.items.len()),
            Value::Slice(seq) => Shape::slice(seq.elem.clone()),
            Value::Map(m) => Shape::map(m.key.clone(), m.value.clone()),
            Value::Struct(s) => Shape::Struct(Arc::clone(&s.shape)),
            Value::Pointer(p) => Shape::pointer(p.elem.clone()),
            Value::Interface(_) => Shape::Interface,
            Value::Custom(c) => Shape::Custom(Arc::clone(&c.unmarshaler)),
            Value::Opaque(o) => Shape::Opaque(*o),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::encode::format_value(self))
    }
}
