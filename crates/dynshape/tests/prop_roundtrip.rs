/// Property-based roundtrip tests for the text grammar.
///
/// For each generated Rust value `v`, renders `v` with `format_value` and converts
/// the text back into a fresh slot of the same type, expecting `v` again. This
/// exercises quoting and escaping of awkward strings, nested brackets and the float
/// formatting in one go.
///
/// Excluded by construction:
/// - NaN (not equal to itself under `PartialEq`)
/// - nil pointers (render as `nil`, which does not read back)
use dynshape::{convert_into, format_value, reflect_struct, Complex, Reflect};
use proptest::prelude::*;
use std::collections::BTreeMap;

reflect_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Record {
        pub label: String,
        pub count: i32,
        pub tags: Vec<String>,
        pub ratio: f64,
        pub flags: BTreeMap<String, bool>,
    }
}

/// Helper: format, convert back into `T::default()`, compare.
fn roundtrip<T: Reflect + Default + PartialEq + std::fmt::Debug>(
    value: &T,
) -> Result<(), TestCaseError> {
    let text = format_value(&value.to_value());
    let mut back = T::default();
    convert_into(&text, &mut back)
        .map_err(|e| TestCaseError::fail(format!("convert {text:?}: {e}")))?;
    prop_assert_eq!(&back, value, "text was {:?}", text);
    Ok(())
}

// ============================================================================
// Strategies
// ============================================================================

/// Strings biased towards the characters the grammar cares about.
fn arb_element_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]{0,12}",
        prop::string::string_regex("[a-z ,=\\[\\]{}\"\\\\]{0,12}").unwrap(),
        prop::string::string_regex("[ \t\n\r]{0,2}[a-z]{0,4}[ \t\n\r]{0,2}").unwrap(),
        Just(String::new()),
        Just("nil".to_string()),
        Just("\"\"".to_string()),
        ".{0,8}",
    ]
}

fn arb_finite_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO,
        -1.0e6..1.0e6,
    ]
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        arb_element_string(),
        any::<i32>(),
        prop::collection::vec(arb_element_string(), 0..4),
        arb_finite_f64(),
        prop::collection::btree_map(arb_element_string(), any::<bool>(), 0..3),
    )
        .prop_map(|(label, count, tags, ratio, flags)| Record {
            label,
            count,
            tags,
            ratio,
            flags,
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn ints(v in prop::collection::vec(any::<i64>(), 0..8)) {
        roundtrip(&v)?;
    }

    #[test]
    fn narrow_uints(v in prop::collection::vec(any::<u8>(), 0..8)) {
        roundtrip(&v)?;
    }

    #[test]
    fn floats(v in prop::collection::vec(arb_finite_f64(), 0..8)) {
        roundtrip(&v)?;
    }

    #[test]
    fn float32(x in prop::num::f32::NORMAL | prop::num::f32::ZERO) {
        roundtrip(&x)?;
    }

    #[test]
    fn complex(re in arb_finite_f64(), im in arb_finite_f64()) {
        roundtrip(&Complex::new(re, im))?;
    }

    #[test]
    fn strings(v in prop::collection::vec(arb_element_string(), 0..6)) {
        roundtrip(&v)?;
    }

    #[test]
    fn nested_strings(v in prop::collection::vec(prop::collection::vec(arb_element_string(), 0..3), 0..3)) {
        roundtrip(&v)?;
    }

    #[test]
    fn maps(m in prop::collection::btree_map(arb_element_string(), arb_element_string(), 0..5)) {
        roundtrip(&m)?;
    }

    #[test]
    fn fixed_arrays(a in any::<[i16; 4]>()) {
        roundtrip(&a)?;
    }

    #[test]
    fn structs(r in arb_record()) {
        roundtrip(&r)?;
    }

    #[test]
    fn struct_slices(v in prop::collection::vec(arb_record(), 0..3)) {
        roundtrip(&v)?;
    }

    #[test]
    fn present_pointers(v in prop::collection::vec(any::<i32>(), 1..4)) {
        roundtrip(&Some(v))?;
    }
}
