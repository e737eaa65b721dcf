//! Value → text, in the grammar [`convert`](crate::convert()) reads.
//!
//! Top-level strings are emitted verbatim (a string target takes its text as-is);
//! strings inside compounds are quoted whenever they would otherwise be split,
//! trimmed, or mistaken for a nested literal. Floats use Rust's shortest round-trip
//! formatting, so `convert(format_value(v))` reproduces `v` for every finite value.
//!
//! Nil pointers and nil interfaces render as `nil` and opaque values as `<func>`,
//! `<chan>`, `<unsafe pointer>`; those do not read back.

use crate::types::Value;

/// Where a value sits: verbatim at the root, quoted-if-needed inside compounds.
#[derive(Clone, Copy, PartialEq)]
enum Position {
    Root,
    Element,
}

/// Render `value` as converter input text.
pub fn format_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, Position::Root, &mut out);
    out
}

/// Canonical text of a complex number: `(re+imi)`.
pub fn format_complex<T: std::fmt::Display + Into<f64> + Copy>(re: T, im: T) -> String {
    let im_wide: f64 = im.into();
    let sign = if im_wide.is_sign_negative() && !im_wide.is_nan() {
        ""
    } else {
        "+"
    };
    format!("({re}{sign}{im}i)")
}

fn write_value(value: &Value, pos: Position, out: &mut String) {
    match value {
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(_, n) => out.push_str(&n.to_string()),
        Value::Uint(_, n) => out.push_str(&n.to_string()),
        Value::Float32(f) => out.push_str(&f.to_string()),
        Value::Float64(f) => out.push_str(&f.to_string()),
        Value::Complex64(c) => out.push_str(&format_complex(c.re, c.im)),
        Value::Complex128(c) => out.push_str(&format_complex(c.re, c.im)),
        Value::String(s) => write_string(s, pos, out),
        Value::Array(seq) | Value::Slice(seq) => {
            out.push('[');
            for (i, item) in seq.items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, Position::Element, out);
            }
            out.push(']');
        }
        Value::Map(map) => {
            out.push('[');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(k, Position::Element, out);
                out.push('=');
                write_value(v, Position::Element, out);
            }
            out.push(']');
        }
        Value::Struct(st) => {
            out.push('{');
            for (i, (_, v)) in st.public_fields().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(v, Position::Element, out);
            }
            out.push('}');
        }
        Value::Pointer(p) => match &p.target {
            Some(target) => write_value(target, pos, out),
            None => out.push_str("nil"),
        },
        Value::Interface(inner) => match inner {
            Some(inner) => write_value(inner, pos, out),
            None => out.push_str("nil"),
        },
        Value::Custom(c) => {
            let text = c.unmarshaler.marshal_text(&c.inner);
            write_string(&text, pos, out);
        }
        Value::Opaque(o) => {
            out.push('<');
            out.push_str(&o.to_string());
            out.push('>');
        }
    }
}

fn write_string(s: &str, pos: Position, out: &mut String) {
    if pos == Position::Root || !needs_quoting(s) {
        out.push_str(s);
        return;
    }
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// An element string must be quoted if it is empty, has surrounding whitespace, or
/// contains a delimiter, a quote, a backslash or a control character.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s != s.trim() {
        return true;
    }
    s.chars().any(|c| {
        matches!(
            c,
            ',' | '=' | '[' | ']' | '{' | '}' | '"' | '\\' | '\n' | '\r' | '\t'
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Complex, Shape};

    #[test]
    fn root_strings_are_verbatim() {
        assert_eq!(format_value(&Value::string("a, b")), "a, b");
    }

    #[test]
    fn element_strings_are_quoted_when_ambiguous() {
        let v = Value::slice(
            Shape::String,
            vec![
                Value::string("plain"),
                Value::string("a,b"),
                Value::string(""),
                Value::string(" pad"),
                Value::string("say \"hi\""),
            ],
        );
        assert_eq!(
            format_value(&v),
            r#"[plain,"a,b",""," pad","say \"hi\""]"#
        );
    }

    #[test]
    fn complex_canonical_text() {
        assert_eq!(
            format_value(&Value::Complex128(Complex::new(3.0, 4.0))),
            "(3+4i)"
        );
        assert_eq!(
            format_value(&Value::Complex128(Complex::new(1.5, -2.0))),
            "(1.5-2i)"
        );
        assert_eq!(
            format_value(&Value::Complex64(Complex::new(0.0, f32::NAN))),
            "(0+NaNi)"
        );
    }

    #[test]
    fn nil_pointer_renders_nil() {
        assert_eq!(format_value(&Shape::pointer(Shape::Bool).zero()), "nil");
    }
}
