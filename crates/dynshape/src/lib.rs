//! # dynshape
//!
//! Text-to-value conversion and deep total ordering over values whose shape is only
//! known at runtime.
//!
//! Two independent facilities share a kind classifier:
//!
//! - **Conversion**: parse a string into a slot of any shape (scalar, array, slice,
//!   map, struct, pointer, or a shape with its own text format), writing in place.
//! - **Comparison**: order any two values, of the same shape or not, as -1, 0 or +1.
//!
//! ## Quick start
//!
//! ```rust
//! use dynshape::{compare, convert, Shape, UintWidth, Value};
//! use std::cmp::Ordering;
//!
//! let mut ports = Shape::map(Shape::String, Shape::slice(Shape::Uint(UintWidth::W16))).zero();
//! convert("[http=[80,8080],ssh=[22]]", &mut ports).unwrap();
//! assert_eq!(ports.to_string(), "[http=[80,8080],ssh=[22]]");
//!
//! assert_eq!(compare(&Value::int(5), &Value::string("5")), Ordering::Less);
//! ```
//!
//! ## Text grammar
//!
//! - Scalars: the literal (`true`, `-42`, `3.14`, `1+2i`, any text for strings)
//! - Arrays and slices: `[e1,e2]`, or `e1,e2` at the top level
//! - Maps: `[k1=v1,k2=v2]`
//! - Structs: `{f1,f2}`, filling public fields in declaration order
//! - Elements containing `, = [ ] { }` are quoted: `"a,b"`, with `\"` inside
//!
//! ## Modules
//!
//! - [`kind`]: kind classification and kind order
//! - [`types`]: `Shape` and `Value`, the runtime type layer
//! - [`convert`](mod@convert): text → value
//! - [`compare`](mod@compare): value ordering
//! - [`encode`]: value → text
//! - [`reflect`]: `Reflect` bridge for plain Rust types, `reflect_struct!`
//! - [`structs`]: field copy, partial equality, projection
//! - [`debug`]: JSON rendering of value trees
//! - [`error`]: error types

pub mod compare;
pub mod convert;
pub mod debug;
pub mod encode;
pub mod error;
mod grammar;
pub mod kind;
pub mod reflect;
pub mod structs;
pub mod types;

pub use compare::{compare, compare_values};
pub use convert::{convert, ConvertOptions, Converter, OverflowPolicy};
pub use debug::{dump, to_json};
pub use encode::format_value;
pub use error::{BoxError, ConvertError, Result};
pub use kind::{compare_kind, Kind};
pub use reflect::{compare_reflect, convert_into, Reflect};
pub use structs::{filter_struct, lazy_struct_copy, struct_partial_equal};
pub use types::{
    Complex, CustomValue, FieldShape, IntWidth, MapValue, Opaque, PointerValue, Sequence, Shape,
    StructShape, StructValue, TextUnmarshaler, UintWidth, Value,
};
