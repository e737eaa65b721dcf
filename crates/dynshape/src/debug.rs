//! Debug rendering of value trees as JSON.
//!
//! Unlike [`format_value`](crate::format_value), which only emits what the converter
//! reads back, this shows everything: private struct fields, nil pointers as `null`,
//! opaque values by name. Map keys become their text form.

use crate::encode::{format_complex, format_value};
use crate::types::Value;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as Json};

/// Render `value` as a JSON tree.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(_, n) => Json::Number((*n).into()),
        Value::Uint(_, n) => Json::Number((*n).into()),
        Value::Float32(f) => float_json(f64::from(*f)),
        Value::Float64(f) => float_json(*f),
        Value::Complex64(c) => Json::String(format_complex(c.re, c.im)),
        Value::Complex128(c) => Json::String(format_complex(c.re, c.im)),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(seq) | Value::Slice(seq) => {
            Json::Array(seq.items.iter().map(to_json).collect())
        }
        Value::Map(map) => {
            let mut obj = Map::new();
            for (k, v) in map.iter() {
                obj.insert(format_value(k), to_json(v));
            }
            Json::Object(obj)
        }
        Value::Struct(st) => {
            let mut obj = Map::new();
            for (field, v) in st.fields() {
                obj.insert(field.name.clone(), to_json(v));
            }
            Json::Object(obj)
        }
        Value::Pointer(p) => p.target.as_deref().map_or(Json::Null, to_json),
        Value::Interface(inner) => inner.as_deref().map_or(Json::Null, to_json),
        Value::Custom(c) => Json::String(c.unmarshaler.marshal_text(&c.inner)),
        Value::Opaque(o) => Json::String(format!("<{o}>")),
    }
}

/// Pretty-printed [`to_json`].
pub fn dump(value: &Value) -> String {
    let json = to_json(value);
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
}

/// Non-finite floats have no JSON number; they are shown as text.
fn float_json(f: f64) -> Json {
    Number::from_f64(f).map_or_else(|| Json::String(f.to_string()), Json::Number)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntWidth, Shape, StructShape, StructValue};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn structs_show_private_fields() {
        let shape = StructShape::new("Account")
            .field("owner", Shape::String)
            .private_field("pin", Shape::Int(IntWidth::W16));
        let mut st = StructValue::zero(Arc::new(shape));
        st.values[0] = Value::string("ada");
        st.values[1] = Value::Int(IntWidth::W16, 1234);
        assert_eq!(
            to_json(&Value::Struct(st)),
            json!({"owner": "ada", "pin": 1234})
        );
    }

    #[test]
    fn nil_and_non_finite() {
        assert_eq!(to_json(&Shape::pointer(Shape::Bool).zero()), Json::Null);
        assert_eq!(to_json(&Value::Float64(f64::INFINITY)), json!("inf"));
    }

    #[test]
    fn serialize_matches_to_json() {
        let v = Value::slice(Shape::Float64, vec![Value::Float64(1.5)]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1.5]");
    }
}
