//! Kind classification.
//!
//! Every value and every shape belongs to exactly one [`Kind`]. Kinds are ordered by
//! their declaration position; that order is the primary comparison key and the
//! dispatch key for conversion.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Runtime category of a value.
///
/// Integer and unsigned widths collapse into a single kind each; floats and complex
/// numbers keep their precision as separate kinds. `Unsupported` covers functions,
/// channels and unsafe pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Array,
    Slice,
    Map,
    Struct,
    Pointer,
    Interface,
    Unsupported,
}

impl Kind {
    /// Lowercase name, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Struct => "struct",
            Kind::Pointer => "pointer",
            Kind::Interface => "interface",
            Kind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Order two kinds by their position in the enumeration.
pub fn compare_kind(a: Kind, b: Kind) -> Ordering {
    (a as u8).cmp(&(b as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_is_comparison_order() {
        assert_eq!(compare_kind(Kind::Int, Kind::String), Ordering::Less);
        assert_eq!(compare_kind(Kind::Slice, Kind::Array), Ordering::Greater);
        assert_eq!(compare_kind(Kind::Map, Kind::Map), Ordering::Equal);
        assert_eq!(compare_kind(Kind::Bool, Kind::Unsupported), Ordering::Less);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Kind::Complex128).unwrap();
        assert_eq!(json, "\"complex128\"");
    }
}
