//! The owned value model stored in the session namespace.
//!
//! `Value` is the host-facing representation of a Python-surface value: it
//! owns all of its data, can be freely cloned and serialized, and carries
//! enough metadata (type name, module, length, shape) for the environment
//! view to describe it without calling back into the host runtime.

use num_bigint::BigInt;

/// Minimum payload bytes attributed to a big integer.
const BIGINT_MIN_PAYLOAD: u64 = 4;

/// An opaque host object surfaced into the namespace.
///
/// Hosts construct this for values the core has no structural variant for:
/// class instances, extension types, dataframes. The core never inspects the
/// object itself, only this descriptor.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InstanceData {
    /// Module that defines the value's type (e.g. `"pandas.core.frame"`).
    pub module: String,
    /// Bare type name (e.g. `"DataFrame"`).
    pub type_name: String,
    /// Host-computed `repr()` string for display.
    pub repr: String,
    /// Result of the value's length operation, when it supports one.
    pub len: Option<u64>,
    /// Dimensions reported by the value's shape attribute, when present.
    pub shape: Option<Vec<u64>>,
    /// Host-reported byte size, when known.
    pub size_bytes: Option<u64>,
}

/// A runtime value held in the session namespace.
///
/// Structured variants cover the types an interactive session produces most
/// often; everything else arrives as [`Value::Instance`] with a host-supplied
/// descriptor. Unlike an interpreter-internal value, `Value` owns its data
/// as a tree, so clones are deep and reference cycles cannot occur.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// Python's `None` singleton.
    #[serde(alias = "none", alias = "NoneType")]
    None,
    /// Python boolean (`True` or `False`).
    #[serde(alias = "bool")]
    Bool(bool),
    /// Python integer (64-bit signed).
    #[serde(alias = "int")]
    Int(i64),
    /// Python arbitrary-precision integer (larger than i64).
    BigInt(BigInt),
    /// Python float (64-bit IEEE 754).
    #[serde(alias = "float")]
    Float(f64),
    /// Python string (UTF-8).
    #[serde(alias = "str")]
    Str(String),
    /// Python bytes object.
    #[serde(alias = "bytes")]
    Bytes(Vec<u8>),
    /// Python list (mutable sequence).
    #[serde(alias = "list")]
    List(Vec<Self>),
    /// Python tuple (immutable sequence).
    #[serde(alias = "tuple")]
    Tuple(Vec<Self>),
    /// Python set. Element order is the host's insertion order.
    #[serde(alias = "set")]
    Set(Vec<Self>),
    /// Python frozenset.
    #[serde(alias = "frozenset")]
    FrozenSet(Vec<Self>),
    /// Python range with the usual start/stop/step semantics.
    #[serde(alias = "range")]
    Range {
        /// First value produced.
        start: i64,
        /// Exclusive upper (or lower, for negative steps) bound.
        stop: i64,
        /// Increment between values; zero-length range when zero.
        step: i64,
    },
    /// Python dictionary (insertion-ordered mapping).
    #[serde(alias = "dict")]
    Dict(Vec<(Self, Self)>),
    /// Python function.
    #[serde(alias = "function")]
    Function {
        /// Dotted qualified name (e.g. `"Greeter.greet"`).
        qualname: String,
        /// Rendered parameter list including parentheses (e.g. `"(name)"`).
        signature: String,
    },
    /// Opaque host-managed object described by [`InstanceData`].
    Instance(Box<InstanceData>),
}

impl Value {
    /// Convenience constructor for a string value.
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Returns the Python type name for this value (e.g. `"int"`, `"str"`).
    ///
    /// These are the same names returned by Python's `type(x).__name__`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::BigInt(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Set(_) => "set",
            Self::FrozenSet(_) => "frozenset",
            Self::Range { .. } => "range",
            Self::Dict(_) => "dict",
            Self::Function { .. } => "function",
            Self::Instance(data) => &data.type_name,
        }
    }

    /// Returns the module that defines this value's type.
    ///
    /// Structured variants all map to Python built-in types, so everything
    /// except [`Value::Instance`] lives in `builtins`.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::Instance(data) => &data.module,
            _ => "builtins",
        }
    }

    /// Returns the fully qualified type name: `module.TypeName`, shortened
    /// to the bare type name for `builtins`, and the literal `"None"` for
    /// the none value.
    #[must_use]
    pub fn qualified_type_name(&self) -> String {
        match self {
            Self::None => "None".to_owned(),
            other => {
                let module = other.module();
                if module == "builtins" {
                    other.type_name().to_owned()
                } else {
                    format!("{module}.{}", other.type_name())
                }
            }
        }
    }

    /// Returns the result of the value's length operation, when it has one.
    ///
    /// String length counts characters, not bytes, matching Python `len()`.
    #[must_use]
    pub fn len(&self) -> Option<u64> {
        match self {
            Self::Str(s) => Some(s.chars().count() as u64),
            Self::Bytes(b) => Some(b.len() as u64),
            Self::List(items) | Self::Tuple(items) | Self::Set(items) | Self::FrozenSet(items) => {
                Some(items.len() as u64)
            }
            Self::Dict(pairs) => Some(pairs.len() as u64),
            Self::Range { start, stop, step } => Some(range_len(*start, *stop, *step)),
            Self::Instance(data) => data.len,
            _ => None,
        }
    }

    /// Returns true when the value has a length operation and it is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Returns a shallow byte-size estimate for the value.
    ///
    /// This mirrors a `sizeof`-style shallow measure: the in-memory size of
    /// the value itself plus directly owned payload, counting container
    /// elements as one slot each rather than recursing into them. Instance
    /// values report the host-supplied size when one was provided.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        let base = std::mem::size_of::<Self>() as u64;
        let slot = std::mem::size_of::<usize>() as u64;
        match self {
            Self::Str(s) => base + s.len() as u64,
            Self::Bytes(b) => base + b.len() as u64,
            Self::BigInt(i) => base + i.bits().div_ceil(8).max(BIGINT_MIN_PAYLOAD),
            Self::List(items) | Self::Tuple(items) | Self::Set(items) | Self::FrozenSet(items) => {
                base + items.len() as u64 * slot
            }
            Self::Dict(pairs) => base + pairs.len() as u64 * slot * 2,
            Self::Function { qualname, signature } => base + (qualname.len() + signature.len()) as u64,
            Self::Instance(data) => data
                .size_bytes
                .unwrap_or_else(|| base + data.repr.len() as u64),
            _ => base,
        }
    }
}

/// Number of values a `range(start, stop, step)` produces.
///
/// A zero step yields an empty range rather than an error; the namespace is
/// a display surface, not an execution one.
fn range_len(start: i64, stop: i64, step: i64) -> u64 {
    if step == 0 {
        return 0;
    }
    let (span, magnitude) = if step > 0 {
        (i128::from(stop) - i128::from(start), i128::from(step))
    } else {
        (i128::from(start) - i128::from(stop), -i128::from(step))
    };
    if span <= 0 {
        0
    } else {
        ((span + magnitude - 1) / magnitude) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_len_matches_python() {
        assert_eq!(range_len(0, 10, 1), 10);
        assert_eq!(range_len(0, 10, 3), 4);
        assert_eq!(range_len(10, 0, -2), 5);
        assert_eq!(range_len(0, 10, -1), 0);
        assert_eq!(range_len(5, 5, 1), 0);
        assert_eq!(range_len(0, 10, 0), 0);
    }

    #[test]
    fn qualified_name_shortens_builtins() {
        assert_eq!(Value::Int(1).qualified_type_name(), "int");
        assert_eq!(Value::None.qualified_type_name(), "None");
        let df = Value::Instance(Box::new(InstanceData {
            module: "pandas.core.frame".to_owned(),
            type_name: "DataFrame".to_owned(),
            repr: String::new(),
            len: None,
            shape: None,
            size_bytes: None,
        }));
        assert_eq!(df.qualified_type_name(), "pandas.core.frame.DataFrame");
    }

    #[test]
    fn str_length_counts_characters() {
        assert_eq!(Value::str("héllo").len(), Some(5));
    }
}
