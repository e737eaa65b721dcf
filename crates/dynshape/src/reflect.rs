//! Bridge between ordinary Rust types and the dynamic [`Value`] tree.
//!
//! [`Reflect`] gives a type a [`Shape`], a way to snapshot itself as a [`Value`], and
//! a way to rebuild itself from one. That is all [`convert_into`] and
//! [`compare_reflect`] need to work on plain Rust data:
//!
//! ```
//! use dynshape::{convert_into, compare_reflect};
//! use std::cmp::Ordering;
//!
//! let mut a = [0i64; 5];
//! convert_into("9,8", &mut a).unwrap();
//! assert_eq!(a, [9, 8, 0, 0, 0]);
//!
//! assert_eq!(compare_reflect(&vec![0, 1, 2], &vec![9, 8, 7]), Ordering::Less);
//! ```
//!
//! | Rust type | Shape |
//! |-----------|-------|
//! | `bool` | bool |
//! | `i8`..`i64`, `isize` | int (matching width; `isize` as 64) |
//! | `u8`..`u64`, `usize` | uint (matching width; `usize` as 64) |
//! | `char` | int, 32 bit |
//! | `f32`, `f64` | float32, float64 |
//! | `Complex<f32>`, `Complex<f64>` | complex64, complex128 |
//! | `String` | string |
//! | `[T; N]` | array |
//! | `Vec<T>` | slice |
//! | `BTreeMap<K, V>`, `HashMap<K, V>` | map |
//! | `Option<T>` | pointer, `None` is nil |
//! | `Value` | interface |
//! | `DateTime<Utc>` | custom, RFC 3339 text |
//!
//! Structs implement it through [`reflect_struct!`](crate::reflect_struct).

use crate::compare::compare;
use crate::convert::convert;
use crate::error::{BoxError, ConvertError, Result};
use crate::types::{
    Complex, CustomValue, IntWidth, MapValue, PointerValue, Sequence, Shape, TextUnmarshaler,
    UintWidth, Value,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

/// A Rust type with a runtime shape.
pub trait Reflect: Sized {
    /// Declared shape of a slot holding this type.
    fn shape() -> Shape;

    /// Snapshot `self` as a dynamic value.
    fn to_value(&self) -> Value;

    /// Rebuild from a dynamic value of [`Self::shape`].
    fn from_value(value: Value) -> Result<Self>;
}

/// Parse `text` into `target` through its reflected shape.
///
/// `target` is only replaced when conversion succeeds.
pub fn convert_into<T: Reflect>(text: &str, target: &mut T) -> Result<()> {
    let mut value = target.to_value();
    convert(text, &mut value)?;
    *target = T::from_value(value)?;
    Ok(())
}

/// Compare two reflected values of possibly unrelated types.
pub fn compare_reflect<A: Reflect, B: Reflect>(a: &A, b: &B) -> Ordering {
    compare(&a.to_value(), &b.to_value())
}

pub(crate) fn mismatch<T>(expected: &str, got: &Value) -> Result<T> {
    Err(ConvertError::InvalidParameter(format!(
        "expected {expected}, got {} value",
        got.kind()
    )))
}

impl Reflect for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

macro_rules! reflect_int {
    ($($ty:ty => $width:expr),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape() -> Shape {
                Shape::Int($width)
            }

            fn to_value(&self) -> Value {
                Value::Int($width, *self as i64)
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Int(_, n) => Ok(n as $ty),
                    other => mismatch(stringify!($ty), &other),
                }
            }
        }
    )*};
}

macro_rules! reflect_uint {
    ($($ty:ty => $width:expr),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape() -> Shape {
                Shape::Uint($width)
            }

            fn to_value(&self) -> Value {
                Value::Uint($width, *self as u64)
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Uint(_, n) => Ok(n as $ty),
                    other => mismatch(stringify!($ty), &other),
                }
            }
        }
    )*};
}

reflect_int! {
    i8 => IntWidth::W8,
    i16 => IntWidth::W16,
    i32 => IntWidth::W32,
    i64 => IntWidth::W64,
    isize => IntWidth::W64,
}

reflect_uint! {
    u8 => UintWidth::W8,
    u16 => UintWidth::W16,
    u32 => UintWidth::W32,
    u64 => UintWidth::W64,
    usize => UintWidth::W64,
}

impl Reflect for char {
    fn shape() -> Shape {
        Shape::Int(IntWidth::W32)
    }

    fn to_value(&self) -> Value {
        Value::Int(IntWidth::W32, *self as i64)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(_, n) => u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    ConvertError::InvalidParameter(format!("{n} is not a unicode scalar value"))
                }),
            other => mismatch("char", &other),
        }
    }
}

impl Reflect for f32 {
    fn shape() -> Shape {
        Shape::Float32
    }

    fn to_value(&self) -> Value {
        Value::Float32(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float32(f) => Ok(f),
            other => mismatch("f32", &other),
        }
    }
}

impl Reflect for f64 {
    fn shape() -> Shape {
        Shape::Float64
    }

    fn to_value(&self) -> Value {
        Value::Float64(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float64(f) => Ok(f),
            other => mismatch("f64", &other),
        }
    }
}

impl Reflect for Complex<f32> {
    fn shape() -> Shape {
        Shape::Complex64
    }

    fn to_value(&self) -> Value {
        Value::Complex64(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Complex64(c) => Ok(c),
            other => mismatch("Complex<f32>", &other),
        }
    }
}

impl Reflect for Complex<f64> {
    fn shape() -> Shape {
        Shape::Complex128
    }

    fn to_value(&self) -> Value {
        Value::Complex128(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Complex128(c) => Ok(c),
            other => mismatch("Complex<f64>", &other),
        }
    }
}

impl Reflect for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch("String", &other),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::slice(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Slice(Sequence {
            elem: T::shape(),
            items: self.iter().map(Reflect::to_value).collect(),
        })
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Slice(seq) => seq.items.into_iter().map(T::from_value).collect(),
            other => mismatch("slice", &other),
        }
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape(), N)
    }

    fn to_value(&self) -> Value {
        Value::Array(Sequence {
            elem: T::shape(),
            items: self.iter().map(Reflect::to_value).collect(),
        })
    }

    fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(seq) => seq.items,
            other => return mismatch("array", &other),
        };
        let items: Vec<T> = items.into_iter().map(T::from_value).collect::<Result<_>>()?;
        let len = items.len();
        items.try_into().map_err(|_| {
            ConvertError::InvalidParameter(format!("expected array of {N} elements, got {len}"))
        })
    }
}

fn map_from_value<K: Reflect, V: Reflect>(value: Value) -> Result<Vec<(K, V)>> {
    match value {
        Value::Map(map) => map
            .into_entries()
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect(),
        other => mismatch("map", &other),
    }
}

impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        let mut map = MapValue::new(K::shape(), V::shape());
        for (k, v) in self {
            map.insert(k.to_value(), v.to_value());
        }
        Value::Map(map)
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(map_from_value::<K, V>(value)?.into_iter().collect())
    }
}

impl<K: Reflect + Eq + Hash, V: Reflect> Reflect for HashMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        let mut map = MapValue::new(K::shape(), V::shape());
        for (k, v) in self {
            map.insert(k.to_value(), v.to_value());
        }
        Value::Map(map)
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(map_from_value::<K, V>(value)?.into_iter().collect())
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::pointer(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Pointer(PointerValue {
            elem: T::shape(),
            target: self.as_ref().map(|v| Box::new(v.to_value())),
        })
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Pointer(p) => p.target.map(|v| T::from_value(*v)).transpose(),
            other => mismatch("pointer", &other),
        }
    }
}

/// `Value` reflects as an interface: a slot that may hold anything.
impl Reflect for Value {
    fn shape() -> Shape {
        Shape::Interface
    }

    fn to_value(&self) -> Value {
        Value::any(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Interface(Some(inner)) => Ok(*inner),
            Value::Interface(None) => Err(ConvertError::InvalidParameter(
                "nil interface has no value".to_string(),
            )),
            other => Ok(other),
        }
    }
}

/// RFC 3339 timestamps, stored as their normalized UTC text so that text order is
/// chronological order.
#[derive(Debug)]
struct Rfc3339;

fn rfc3339_text(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl TextUnmarshaler for Rfc3339 {
    fn type_name(&self) -> &str {
        "DateTime<Utc>"
    }

    fn zero(&self) -> Value {
        Value::String(rfc3339_text(&DateTime::<Utc>::UNIX_EPOCH))
    }

    fn unmarshal_text(&self, text: &str) -> std::result::Result<Value, BoxError> {
        let parsed = DateTime::parse_from_rfc3339(text)?;
        Ok(Value::String(rfc3339_text(&parsed.with_timezone(&Utc))))
    }

    fn marshal_text(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => crate::encode::format_value(other),
        }
    }
}

impl Reflect for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Custom(Arc::new(Rfc3339))
    }

    fn to_value(&self) -> Value {
        Value::Custom(CustomValue {
            unmarshaler: Arc::new(Rfc3339),
            inner: Box::new(Value::String(rfc3339_text(self))),
        })
    }

    fn from_value(value: Value) -> Result<Self> {
        let inner = match value {
            Value::Custom(c) => *c.inner,
            other => return mismatch("DateTime<Utc>", &other),
        };
        match inner {
            Value::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| ConvertError::InvalidParameter(e.to_string())),
            other => mismatch("RFC 3339 text", &other),
        }
    }
}

/// Declare a struct and implement [`Reflect`] for it.
///
/// Fields written with a visibility qualifier (`pub`, `pub(crate)`, ...) are public
/// to comparison and conversion; fields without one are private and never take part.
///
/// ```
/// use dynshape::{reflect_struct, convert_into};
///
/// reflect_struct! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Endpoint {
///         pub host: String,
///         pub port: u16,
///         retries: u8,
///     }
/// }
///
/// let mut ep = Endpoint::default();
/// convert_into("{localhost,8080}", &mut ep).unwrap();
/// assert_eq!(ep.host, "localhost");
/// assert_eq!(ep.port, 8080);
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Reflect for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::Struct(::std::sync::Arc::new(Self::struct_shape()))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Struct($crate::StructValue {
                    shape: ::std::sync::Arc::new(Self::struct_shape()),
                    values: ::std::vec![$($crate::Reflect::to_value(&self.$field)),*],
                })
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                let st = match value {
                    $crate::Value::Struct(st) => st,
                    other => {
                        return ::std::result::Result::Err($crate::ConvertError::InvalidParameter(
                            ::std::format!(
                                "expected struct {}, got {} value",
                                stringify!($name),
                                other.kind()
                            ),
                        ))
                    }
                };
                let mut values = st.values.into_iter();
                ::std::result::Result::Ok(Self {
                    $(
                        $field: <$ty as $crate::Reflect>::from_value(values.next().ok_or_else(|| {
                            $crate::ConvertError::InvalidParameter(::std::format!(
                                "struct {} is missing field {}",
                                stringify!($name),
                                stringify!($field)
                            ))
                        })?)?,
                    )*
                })
            }
        }

        impl $name {
            /// Runtime field list of this struct.
            pub fn struct_shape() -> $crate::StructShape {
                $crate::StructShape {
                    name: ::std::string::String::from(stringify!($name)),
                    fields: ::std::vec![$(
                        $crate::FieldShape {
                            name: ::std::string::String::from(stringify!($field)),
                            shape: <$ty as $crate::Reflect>::shape(),
                            public: !stringify!($fvis).is_empty(),
                        }
                    ),*],
                }
            }
        }
    };
}
