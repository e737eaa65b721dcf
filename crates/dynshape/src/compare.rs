//! Deep total ordering over values of any shape.
//!
//! Kind is the dominant key: two values of different kinds are ordered by kind alone,
//! however alike they look (`5 < "5"` because int sorts before string). Within a kind:
//!
//! - bool: `false < true`
//! - int, uint, float: numeric; `-0 == 0`, NaN equals NaN and sorts above numbers
//! - complex: lexicographic on the canonical `(re+imi)` text
//! - string: byte order
//! - array, slice: shorter first, then element by element
//! - map: fewer entries first, then keys sorted by text in each map, comparing key
//!   kinds, key text and finally values pairwise
//! - struct: public fields only; fewer first, then fields sorted by name in each
//!   struct, comparing declared field kind, field name and value pairwise. Type names
//!   never matter, so equality is structural.
//! - interface: nil first, otherwise the contents
//! - unsupported (func, chan, unsafe pointer): equal
//!
//! Pointers are followed before anything else; their depth is not compared. A nil
//! pointer sorts before everything except another nil pointer.

use crate::encode::{format_complex, format_value};
use crate::kind::compare_kind;
use crate::types::{FieldShape, MapValue, StructValue, Value};
use std::cmp::Ordering;

/// Compare two values. Never fails: undecidable comparisons are `Equal`.
///
/// # Examples
///
/// ```
/// use dynshape::{compare, Value};
/// use std::cmp::Ordering;
///
/// assert_eq!(compare(&Value::int(5), &Value::string("5")), Ordering::Less);
/// ```
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let a = resolve(a);
    let b = resolve(b);

    match (is_nil_pointer(a), is_nil_pointer(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    let by_kind = compare_kind(a.kind(), b.kind());
    if by_kind.is_ne() {
        return by_kind;
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(_, x), Value::Int(_, y)) => x.cmp(y),
        (Value::Uint(_, x), Value::Uint(_, y)) => x.cmp(y),
        (Value::Float32(x), Value::Float32(y)) => compare_float(f64::from(*x), f64::from(*y)),
        (Value::Float64(x), Value::Float64(y)) => compare_float(*x, *y),
        (Value::Complex64(x), Value::Complex64(y)) => {
            format_complex(x.re, x.im).cmp(&format_complex(y.re, y.im))
        }
        (Value::Complex128(x), Value::Complex128(y)) => {
            format_complex(x.re, x.im).cmp(&format_complex(y.re, y.im))
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) | (Value::Slice(x), Value::Slice(y)) => {
            compare_sequences(&x.items, &y.items)
        }
        (Value::Map(x), Value::Map(y)) => compare_maps(x, y),
        (Value::Struct(x), Value::Struct(y)) => compare_structs(x, y),
        (Value::Interface(x), Value::Interface(y)) => match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare(x, y),
        },
        _ => Ordering::Equal,
    }
}

/// [`compare`] as `-1`, `0` or `1`.
pub fn compare_values(a: &Value, b: &Value) -> i32 {
    compare(a, b) as i32
}

/// Follow non-nil pointers and custom wrappers down to the underlying value.
fn resolve(mut value: &Value) -> &Value {
    loop {
        match value {
            Value::Pointer(p) => match &p.target {
                Some(target) => value = &**target,
                None => return value,
            },
            Value::Custom(c) => value = &*c.inner,
            _ => return value,
        }
    }
}

fn is_nil_pointer(value: &Value) -> bool {
    matches!(value, Value::Pointer(p) if p.is_nil())
}

fn compare_float(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y)
        .unwrap_or_else(|| x.is_nan().cmp(&y.is_nan()))
}

fn compare_sequences(x: &[Value], y: &[Value]) -> Ordering {
    x.len().cmp(&y.len()).then_with(|| first_difference(x.iter().zip(y)))
}

fn first_difference<'a>(pairs: impl Iterator<Item = (&'a Value, &'a Value)>) -> Ordering {
    pairs
        .map(|(a, b)| compare(a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Map entries keyed by their text, sorted ascending. Equal texts fall back to the
/// keys themselves and then the values, so the result never depends on insertion order.
fn sorted_entries(map: &MapValue) -> Vec<(String, &Value, &Value)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (format_value(k), k, v)).collect();
    entries.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| compare_kind(a.1.kind(), b.1.kind()))
            .then_with(|| compare(a.1, b.1))
            .then_with(|| compare(a.2, b.2))
    });
    entries
}

fn compare_maps(x: &MapValue, y: &MapValue) -> Ordering {
    let by_len = x.len().cmp(&y.len());
    if by_len.is_ne() {
        return by_len;
    }
    let xs = sorted_entries(x);
    let ys = sorted_entries(y);

    for ((x_text, x_key, _), (y_text, y_key, _)) in xs.iter().zip(&ys) {
        let ord = compare_kind(x_key.kind(), y_key.kind()).then_with(|| x_text.cmp(y_text));
        if ord.is_ne() {
            return ord;
        }
    }
    first_difference(xs.iter().zip(&ys).map(|(x, y)| (x.2, y.2)))
}

/// Public fields sorted by name.
fn sorted_public_fields(st: &StructValue) -> Vec<(&FieldShape, &Value)> {
    let mut fields: Vec<_> = st.public_fields().collect();
    fields.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    fields
}

fn compare_structs(x: &StructValue, y: &StructValue) -> Ordering {
    let xs = sorted_public_fields(x);
    let ys = sorted_public_fields(y);
    let by_len = xs.len().cmp(&ys.len());
    if by_len.is_ne() {
        return by_len;
    }
    for ((xf, xv), (yf, yv)) in xs.iter().zip(&ys) {
        let ord = compare_kind(xf.shape.kind(), yf.shape.kind())
            .then_with(|| xf.name.cmp(&yf.name))
            .then_with(|| compare(xv, yv));
        if ord.is_ne() {
            return ord;
        }
    }
    Ordering::Equal
}
