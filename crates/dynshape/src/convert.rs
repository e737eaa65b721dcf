//! String-to-value conversion.
//!
//! [`convert`] parses text into whatever shape the target slot declares and writes the
//! result through the `&mut Value` in place. Dispatch order:
//!
//! 1. Custom shapes delegate to their [`TextUnmarshaler`](crate::types::TextUnmarshaler)
//!    and nothing else runs.
//! 2. Interfaces convert into the value they hold; pointers allocate a fresh pointee,
//!    convert into it, and only then point at it.
//! 3. Everything else dispatches on kind; compound kinds use the grammar in
//!    [`crate::grammar`].
//!
//! Compound targets are rebuilt in a fresh container and assigned only once every
//! element converted, so a failure never leaves a half-populated value behind.

use crate::error::{ConvertError, Result};
use crate::grammar;
use crate::kind::Kind;
use crate::types::{
    Complex, CustomValue, IntWidth, MapValue, PointerValue, Sequence, StructValue, UintWidth,
    Value,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do when a parsed integer does not fit the target width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Wrap to the target width, as a cast would (`"300"` into an 8-bit slot is 44).
    #[default]
    Truncate,
    /// Fail with [`ConvertError::ParseFailed`].
    Reject,
}

/// Converter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub overflow: OverflowPolicy,
}

impl ConvertOptions {
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

/// A configured text-to-value converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    options: ConvertOptions,
}

/// Convert `text` into `target` with default options.
///
/// # Examples
///
/// ```
/// use dynshape::{convert, Shape, Value};
///
/// let mut target = Shape::slice(Shape::String).zero();
/// convert("one,two,three", &mut target).unwrap();
/// assert_eq!(target.to_string(), "[one,two,three]");
/// ```
pub fn convert(text: &str, target: &mut Value) -> Result<()> {
    Converter::default().convert(text, target)
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Parse `text` into `target`, replacing its contents.
    pub fn convert(&self, text: &str, target: &mut Value) -> Result<()> {
        tracing::trace!(kind = %target.kind(), text, "convert");
        match target {
            Value::Custom(custom) => convert_custom(text, custom),
            Value::Interface(Some(inner)) => self.convert(text, inner),
            Value::Interface(None) => Err(ConvertError::InvalidParameter(
                "cannot convert into a nil interface".to_string(),
            )),
            Value::Pointer(ptr) => self.convert_pointer(text, ptr),
            Value::Bool(b) => {
                *b = parse_bool(text)?;
                Ok(())
            }
            Value::Int(width, n) => {
                *n = self.parse_int(text, *width)?;
                Ok(())
            }
            Value::Uint(width, n) => {
                *n = self.parse_uint(text, *width)?;
                Ok(())
            }
            Value::Float32(f) => {
                *f = parse_float(text, Kind::Float32)?;
                Ok(())
            }
            Value::Float64(f) => {
                *f = parse_float(text, Kind::Float64)?;
                Ok(())
            }
            Value::Complex64(c) => {
                *c = parse_complex(text, Kind::Complex64)?;
                Ok(())
            }
            Value::Complex128(c) => {
                *c = parse_complex(text, Kind::Complex128)?;
                Ok(())
            }
            Value::String(s) => {
                *s = text.to_string();
                Ok(())
            }
            Value::Array(seq) => self.convert_array(text, seq),
            Value::Slice(seq) => self.convert_slice(text, seq),
            Value::Map(map) => self.convert_map(text, map),
            Value::Struct(st) => self.convert_struct(text, st),
            Value::Opaque(o) => Err(ConvertError::UnsupportedKind(o.to_string())),
        }
    }

    fn convert_pointer(&self, text: &str, ptr: &mut PointerValue) -> Result<()> {
        let mut pointee = ptr.elem.zero();
        self.convert(text, &mut pointee)?;
        ptr.target = Some(Box::new(pointee));
        Ok(())
    }

    /// Fixed length: extra elements are dropped, missing ones stay zero.
    fn convert_array(&self, text: &str, seq: &mut Sequence) -> Result<()> {
        let pieces = grammar::split_compound(text, b'[', b']')?;
        let mut items: Vec<Value> = (0..seq.items.len()).map(|_| seq.elem.zero()).collect();
        for (slot, piece) in items.iter_mut().zip(&pieces) {
            self.convert_element(piece, slot)?;
        }
        seq.items = items;
        Ok(())
    }

    fn convert_slice(&self, text: &str, seq: &mut Sequence) -> Result<()> {
        let pieces = grammar::split_compound(text, b'[', b']')?;
        let mut items = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let mut slot = seq.elem.zero();
            self.convert_element(piece, &mut slot)?;
            items.push(slot);
        }
        seq.items = items;
        Ok(())
    }

    fn convert_map(&self, text: &str, map: &mut MapValue) -> Result<()> {
        let mut parsed = MapValue::new(map.key.clone(), map.value.clone());
        for piece in grammar::split_compound(text, b'[', b']')? {
            let (key_text, value_text) = grammar::split_pair(piece)?;
            let mut key = map.key.zero();
            self.convert_element(key_text, &mut key)?;
            let mut value = map.value.zero();
            self.convert_element(value_text, &mut value)?;
            parsed.insert(key, value);
        }
        *map = parsed;
        Ok(())
    }

    /// Positional: the i-th element fills the i-th public field.
    fn convert_struct(&self, text: &str, st: &mut StructValue) -> Result<()> {
        let pieces = grammar::split_compound(text, b'{', b'}')?;
        let public: Vec<usize> = st
            .shape
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.public)
            .map(|(i, _)| i)
            .collect();
        if pieces.len() > public.len() {
            return Err(ConvertError::syntax(
                text,
                format!(
                    "{} elements for {} public fields of {}",
                    pieces.len(),
                    public.len(),
                    st.name()
                ),
            ));
        }
        let mut parsed = StructValue::zero(st.shape.clone());
        for (&idx, piece) in public.iter().zip(&pieces) {
            self.convert_element(piece, &mut parsed.values[idx])?;
        }
        *st = parsed;
        Ok(())
    }

    fn convert_element(&self, piece: &str, slot: &mut Value) -> Result<()> {
        let text = grammar::unquote(piece)?;
        self.convert(&text, slot).inspect_err(|err| {
            tracing::debug!(kind = %slot.kind(), element = piece, error = %err, "element conversion failed");
        })
    }

    fn parse_int(&self, text: &str, width: IntWidth) -> Result<i64> {
        let n: i64 = text
            .parse()
            .map_err(|e| ConvertError::parse_failed(text, Kind::Int, e))?;
        match self.options.overflow {
            OverflowPolicy::Truncate => Ok(width.truncate(n)),
            OverflowPolicy::Reject if width.fits(n) => Ok(n),
            OverflowPolicy::Reject => Err(ConvertError::parse_failed(
                text,
                Kind::Int,
                format!("out of range for {}-bit integer", width.bits()),
            )),
        }
    }

    fn parse_uint(&self, text: &str, width: UintWidth) -> Result<u64> {
        let n: u64 = text
            .parse()
            .map_err(|e| ConvertError::parse_failed(text, Kind::Uint, e))?;
        match self.options.overflow {
            OverflowPolicy::Truncate => Ok(width.truncate(n)),
            OverflowPolicy::Reject if width.fits(n) => Ok(n),
            OverflowPolicy::Reject => Err(ConvertError::parse_failed(
                text,
                Kind::Uint,
                format!("out of range for {}-bit unsigned integer", width.bits()),
            )),
        }
    }
}

fn convert_custom(text: &str, custom: &mut CustomValue) -> Result<()> {
    match custom.unmarshaler.unmarshal_text(text) {
        Ok(value) => {
            *custom.inner = value;
            Ok(())
        }
        Err(source) => {
            let type_name = custom.unmarshaler.type_name().to_string();
            tracing::debug!(type_name = %type_name, text, error = %source, "custom unmarshaler rejected input");
            Err(ConvertError::CustomParseFailed {
                type_name,
                text: text.to_string(),
                source,
            })
        }
    }
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ConvertError::parse_failed(
            text,
            Kind::Bool,
            "invalid boolean literal",
        )),
    }
}

/// Parse at the target precision. A finite literal that overflows to infinity is out of
/// range; only an explicit `inf`/`infinity` may produce one.
fn parse_float<T>(text: &str, kind: Kind) -> Result<T>
where
    T: FromStr + Into<f64> + Copy,
    T::Err: std::fmt::Display,
{
    let value: T = text
        .parse()
        .map_err(|e| ConvertError::parse_failed(text, kind, e))?;
    let wide: f64 = value.into();
    if wide.is_infinite() && !is_infinity_literal(text) {
        return Err(ConvertError::parse_failed(
            text,
            kind,
            "value out of range",
        ));
    }
    Ok(value)
}

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parse `a`, `bi`, `a+bi` or `a-bi`, optionally in parentheses. A bare `i` means
/// one imaginary unit.
fn parse_complex<T>(text: &str, kind: Kind) -> Result<Complex<T>>
where
    T: FromStr + Default + Into<f64> + Copy,
    T::Err: std::fmt::Display,
{
    let mut s = text;
    if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
        s = &s[1..s.len() - 1];
    }
    let Some(body) = s.strip_suffix('i') else {
        return Ok(Complex::new(parse_float(s, kind)?, T::default()));
    };

    // The sign separating the parts: not leading, not an exponent sign.
    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&i| matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E'));
    let (re_text, im_text) = match split {
        Some(i) => (&body[..i], &body[i..]),
        None => ("", body),
    };

    let re = if re_text.is_empty() {
        T::default()
    } else {
        parse_component(re_text, text, kind)?
    };
    let im = match im_text {
        "" | "+" => parse_component("1", text, kind)?,
        "-" => parse_component("-1", text, kind)?,
        other => parse_component(other, text, kind)?,
    };
    Ok(Complex::new(re, im))
}

fn parse_component<T>(part: &str, text: &str, kind: Kind) -> Result<T>
where
    T: FromStr + Into<f64> + Copy,
    T::Err: std::fmt::Display,
{
    parse_float(part, kind).map_err(|e| match e {
        ConvertError::ParseFailed { reason, .. } => {
            ConvertError::parse_failed(text, kind, format!("invalid complex literal: {reason}"))
        }
        other => other,
    })
}
