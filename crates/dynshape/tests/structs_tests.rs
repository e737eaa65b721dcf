use dynshape::{
    dump, filter_struct, lazy_struct_copy, reflect_struct, struct_partial_equal, ConvertError,
    IntWidth, Reflect, Shape, StructShape, Value,
};

reflect_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct Src {
        pub field_a: String,
        pub field_b: i64,
        pub field_c: bool,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct Dst {
        pub field_a: String,
        pub field_b: f64,
        field_c: bool,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct Unrelated {
        pub other: String,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        pub name: String,
        pub surname: String,
        pub age: i64,
        nope: bool,
    }
}

fn src() -> Src {
    Src {
        field_a: "FieldA".into(),
        field_b: 42,
        field_c: true,
    }
}

fn dst() -> Dst {
    Dst {
        field_a: "DoNotWant".into(),
        field_b: 3.14,
        field_c: false,
    }
}

// ============================================================================
// lazy_struct_copy
// ============================================================================

#[test]
fn copy_matching_fields_only() {
    let mut out = dst().to_value();
    lazy_struct_copy(&src().to_value(), &mut out).unwrap();
    let out = Dst::from_value(out).unwrap();
    assert_eq!(out.field_a, "FieldA");
    assert_eq!(out.field_b, 3.14);
    assert!(!out.field_c, "private destination field must not be written");
}

#[test]
fn copy_through_pointers() {
    let from = Value::pointer_to(src().to_value());
    let mut to = Some(dst()).to_value();
    lazy_struct_copy(&from, &mut to).unwrap();
    let to = Option::<Dst>::from_value(to).unwrap().unwrap();
    assert_eq!(to.field_a, "FieldA");
}

#[test]
fn copy_with_no_common_fields_is_a_no_op() {
    let mut out = Unrelated {
        other: "same".into(),
    }
    .to_value();
    let before = out.clone();
    lazy_struct_copy(&src().to_value(), &mut out).unwrap();
    assert_eq!(out, before);
}

#[test]
fn copy_requires_structs() {
    let mut out = dst().to_value();
    let err = lazy_struct_copy(&Value::int(1), &mut out).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidParameter(_)), "{err:?}");

    let mut not_struct = Value::string("x");
    let err = lazy_struct_copy(&src().to_value(), &mut not_struct).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidParameter(_)), "{err:?}");

    let mut nil = None::<Dst>.to_value();
    let err = lazy_struct_copy(&src().to_value(), &mut nil).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidParameter(_)), "{err:?}");
}

// ============================================================================
// struct_partial_equal
// ============================================================================

#[test]
fn partial_equal_on_shared_field_name() {
    assert!(struct_partial_equal(&src().to_value(), &dst().to_value()));
    assert!(struct_partial_equal(
        &Value::pointer_to(src().to_value()),
        &Value::any(dst().to_value())
    ));
}

#[test]
fn partial_equal_without_shared_names() {
    let other = Unrelated {
        other: "x".into(),
    };
    assert!(!struct_partial_equal(&src().to_value(), &other.to_value()));
}

#[test]
fn partial_equal_ignores_private_fields() {
    let only_private = StructShape::new("Hidden")
        .private_field("field_c", Shape::Bool)
        .into_shape()
        .zero();
    assert!(!struct_partial_equal(&src().to_value(), &only_private));
}

#[test]
fn partial_equal_on_non_structs() {
    assert!(!struct_partial_equal(&Value::int(1), &src().to_value()));
    assert!(!struct_partial_equal(&Value::int(1), &Value::int(1)));
}

// ============================================================================
// filter_struct
// ============================================================================

#[test]
fn filter_projects_remaining_public_fields() {
    let person = Person {
        name: "Foo".into(),
        surname: "Bar".into(),
        age: 42,
        nope: true,
    };
    let out = filter_struct(&Value::pointer_to(person.to_value()), &["name", "surname"]).unwrap();

    let expected = StructShape::new("")
        .field("age", Shape::Int(IntWidth::W64))
        .into_shape()
        .zero();
    assert_eq!(out, expected);
}

#[test]
fn filter_unknown_names_are_ignored() {
    let person = Person {
        name: "Foo".into(),
        surname: "Bar".into(),
        age: 42,
        nope: false,
    };
    let out = filter_struct(&person.to_value(), &["missing"]).unwrap();
    match out {
        Value::Struct(st) => {
            let names: Vec<&str> = st.fields().map(|(f, _)| f.name.as_str()).collect();
            assert_eq!(names, vec!["name", "surname", "age"]);
            assert!(st.fields().all(|(f, _)| f.public));
        }
        other => panic!("expected struct, got {other:?}"),
    }
}

#[test]
fn filter_requires_a_struct() {
    let err = filter_struct(&Value::string("x"), &[]).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidParameter(_)), "{err:?}");
}

// ============================================================================
// Debug rendering
// ============================================================================

#[test]
fn dump_shows_private_fields() {
    let person = Person {
        name: "Foo".into(),
        surname: "Bar".into(),
        age: 42,
        nope: true,
    };
    let text = dump(&person.to_value());
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"name": "Foo", "surname": "Bar", "age": 42, "nope": true})
    );
}
