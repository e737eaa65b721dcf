//! Struct helpers built on public-field enumeration.
//!
//! All three follow pointers and interfaces down to the struct they hold and only
//! ever look at public fields.

use crate::error::{ConvertError, Result};
use crate::types::{PointerValue, StructShape, StructValue, Value};

/// Copy every public field of `src` into the public field of `dst` with the same name
/// and an identical shape. Fields without such a counterpart are left alone.
///
/// Fails with [`ConvertError::InvalidParameter`] unless both sides hold a struct.
pub fn lazy_struct_copy(src: &Value, dst: &mut Value) -> Result<()> {
    let src = struct_ref(src)
        .ok_or_else(|| ConvertError::InvalidParameter("copy source is not a struct".into()))?;
    let dst = struct_mut(dst).ok_or_else(|| {
        ConvertError::InvalidParameter("copy destination is not a struct".into())
    })?;

    for (field, value) in src.public_fields() {
        let Some(idx) = dst.index_of(&field.name) else {
            continue;
        };
        let target = &dst.shape.fields[idx];
        if !target.public || target.shape != field.shape {
            tracing::trace!(field = %field.name, "skipping field with mismatched shape");
            continue;
        }
        dst.values[idx] = value.clone();
    }
    Ok(())
}

/// True when `x` and `y` are structs sharing at least one public field name.
pub fn struct_partial_equal(x: &Value, y: &Value) -> bool {
    let (Some(x), Some(y)) = (struct_ref(x), struct_ref(y)) else {
        return false;
    };
    x.shape
        .public_fields()
        .any(|f| y.shape.public_fields().any(|g| g.name == f.name))
}

/// Project the struct type of `value` onto its public fields minus `exclude`.
///
/// Returns a zero value of the anonymous projected struct; field values of `value`
/// are not carried over.
pub fn filter_struct(value: &Value, exclude: &[&str]) -> Result<Value> {
    let st = struct_ref(value)
        .ok_or_else(|| ConvertError::InvalidParameter("filter input is not a struct".into()))?;
    let projected = StructShape {
        name: String::new(),
        fields: st
            .shape
            .public_fields()
            .filter(|f| !exclude.contains(&f.name.as_str()))
            .cloned()
            .collect(),
    };
    Ok(projected.into_shape().zero())
}

fn struct_ref(value: &Value) -> Option<&StructValue> {
    match value {
        Value::Struct(st) => Some(st),
        Value::Pointer(PointerValue {
            target: Some(target),
            ..
        }) => struct_ref(target),
        Value::Interface(Some(inner)) => struct_ref(inner),
        _ => None,
    }
}

fn struct_mut(value: &mut Value) -> Option<&mut StructValue> {
    match value {
        Value::Struct(st) => Some(st),
        Value::Pointer(PointerValue {
            target: Some(target),
            ..
        }) => struct_mut(target),
        Value::Interface(Some(inner)) => struct_mut(inner),
        _ => None,
    }
}
