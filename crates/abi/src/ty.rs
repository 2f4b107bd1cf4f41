//! The ARC-4 type descriptor and its string grammar.
//!
//! [`AbiType`] is a closed sum over every type the ARC-4 encoding standard
//! defines. Descriptors are plain immutable trees: tuples and arrays own
//! their children outright, and equality is structural.

use crate::{
    structs::{tuple_type_from_fields, StructField},
    Error, Result,
};
use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

/// Maximum value of a 2-byte length or offset field.
pub(crate) const MAX_LEN: usize = u16::MAX as usize;
/// Width of every length and offset field in the wire format.
pub(crate) const LENGTH_SIZE: usize = 2;

const MIN_BIT_SIZE: usize = 8;
const MAX_BIT_SIZE: usize = 512;
const MAX_PRECISION: usize = 160;

static STATIC_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z\d\[\](),]+)\[(0|[1-9]\d*)\]$").expect("invalid static array regex")
});
static UFIXED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ufixed([1-9]\d*)x([1-9]\d*)$").expect("invalid ufixed regex")
});

/// An ARC-4 ABI type descriptor.
///
/// Obtained by parsing a type string ([`AbiType::parse`]) or by resolving a
/// struct schema ([`AbiType::from_struct`](crate::AbiType::from_struct)), and
/// consumed by [`encode`](Self::encode) and [`decode`](Self::decode).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiType {
    /// `uintN`: an N-bit unsigned integer, `8 <= N <= 512`, `N % 8 == 0`.
    Uint(usize),
    /// `ufixedNxM`: an N-bit unsigned fixed-point number with `M` decimal
    /// digits of precision, `1 <= M <= 160`. Encodes exactly like `uintN`;
    /// the precision only affects interpretation.
    Ufixed(usize, usize),
    /// `address`: a 32-byte Algorand account address.
    Address,
    /// `bool`: a single bit, packed with adjacent bools when encoded.
    Bool,
    /// `byte`: a single unsigned byte, alias of `uint8` on the wire.
    Byte,
    /// `string`: dynamic-length UTF-8 text, length-prefixed.
    String,
    /// `(T1,...,Tn)`: an ordered, heterogeneous tuple.
    Tuple(Vec<AbiType>),
    /// `T[N]`: a fixed-length array. The length is part of the type and is
    /// not present on the wire.
    FixedArray(Box<AbiType>, usize),
    /// `T[]`: a dynamic-length array, element-count-prefixed.
    Array(Box<AbiType>),
    /// A named struct with ordered fields. This is a presentation-layer
    /// wrapper: it always encodes exactly like its equivalent tuple, and its
    /// string form is just the struct name, so the field shape cannot be
    /// recovered from the rendered string.
    Struct {
        /// The struct's name.
        name: String,
        /// The struct's fields, in declaration order.
        fields: Vec<StructField>,
    },
}

impl AbiType {
    /// Creates a `uintN` descriptor, validating the bit size.
    pub fn uint(bits: usize) -> Result<Self> {
        if bits < MIN_BIT_SIZE || bits > MAX_BIT_SIZE || bits % 8 != 0 {
            return Err(Error::validation(
                format!("uint{bits}"),
                "bit size must be a multiple of 8 between 8 and 512",
            ));
        }
        Ok(Self::Uint(bits))
    }

    /// Creates a `ufixedNxM` descriptor, validating bit size and precision.
    pub fn ufixed(bits: usize, precision: usize) -> Result<Self> {
        if bits < MIN_BIT_SIZE || bits > MAX_BIT_SIZE || bits % 8 != 0 {
            return Err(Error::validation(
                format!("ufixed{bits}x{precision}"),
                "bit size must be a multiple of 8 between 8 and 512",
            ));
        }
        if precision < 1 || precision > MAX_PRECISION {
            return Err(Error::validation(
                format!("ufixed{bits}x{precision}"),
                "precision must be between 1 and 160",
            ));
        }
        Ok(Self::Ufixed(bits, precision))
    }

    /// Creates a `T[N]` descriptor, validating the length.
    pub fn fixed_array(child: Self, len: usize) -> Result<Self> {
        if len > MAX_LEN {
            return Err(Error::validation(
                format!("{child}[{len}]"),
                "array length does not fit in a u16",
            ));
        }
        Ok(Self::FixedArray(Box::new(child), len))
    }

    /// Parses an ARC-4 type string into a descriptor.
    ///
    /// Accepts exactly the ARC-4 grammar: `uintN`, `ufixedNxM`, `address`,
    /// `bool`, `byte`, `string`, `(T1,...,Tn)`, `T[N]` and `T[]`, nested
    /// arbitrarily. Anything else is a [`Error::Validation`] failure.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(elem) = s.strip_suffix("[]") {
            return Ok(Self::Array(Box::new(Self::parse(elem)?)));
        }
        if s.ends_with(']') {
            let caps = STATIC_ARRAY_RE
                .captures(s)
                .ok_or_else(|| Error::validation(s, "malformed static array"))?;
            let len: usize = caps[2]
                .parse()
                .map_err(|_| Error::validation(s, "array length does not fit in a u16"))?;
            if len > MAX_LEN {
                return Err(Error::validation(s, "array length does not fit in a u16"));
            }
            let child = Self::parse(&caps[1])?;
            return Self::fixed_array(child, len);
        }
        if let Some(digits) = s.strip_prefix("uint") {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::validation(s, "uint bit size must be decimal digits"));
            }
            let bits: usize = digits
                .parse()
                .map_err(|_| Error::validation(s, "uint bit size out of range"))?;
            return Self::uint(bits);
        }
        if s == "byte" {
            return Ok(Self::Byte);
        }
        if s.starts_with("ufixed") {
            let caps =
                UFIXED_RE.captures(s).ok_or_else(|| Error::validation(s, "malformed ufixed"))?;
            let bits: usize =
                caps[1].parse().map_err(|_| Error::validation(s, "ufixed bit size out of range"))?;
            let precision: usize =
                caps[2].parse().map_err(|_| Error::validation(s, "ufixed precision out of range"))?;
            return Self::ufixed(bits, precision);
        }
        if s == "bool" {
            return Ok(Self::Bool);
        }
        if s == "address" {
            return Ok(Self::Address);
        }
        if s == "string" {
            return Ok(Self::String);
        }
        if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
            let children = split_tuple(&s[1..s.len() - 1])?
                .into_iter()
                .map(Self::parse)
                .collect::<Result<Vec<_>>>()?;
            if children.len() > MAX_LEN {
                return Err(Error::validation(s, "tuple has too many children"));
            }
            return Ok(Self::Tuple(children));
        }
        Err(Error::validation(s, "unrecognized ABI type"))
    }

    /// Whether the encoded byte length of this type depends on its value.
    ///
    /// True for `string` and `T[]`, and for any tuple, fixed array or struct
    /// that transitively contains one.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Array(_) => true,
            Self::FixedArray(child, _) => child.is_dynamic(),
            Self::Tuple(children) => children.iter().any(Self::is_dynamic),
            Self::Struct { .. } => self.to_tuple_type().is_dynamic(),
            Self::Uint(_) | Self::Ufixed(..) | Self::Address | Self::Bool | Self::Byte => false,
        }
    }

    /// The fixed encoded byte length of a non-dynamic type.
    ///
    /// Consecutive bools in a tuple share bytes (8 per byte), so
    /// `(bool,bool)` is 1 byte and `bool[9]` is 2. Fails with
    /// [`Error::Validation`] for `string`, `T[]` and anything containing
    /// them.
    pub fn fixed_len(&self) -> Result<usize> {
        match self {
            Self::Uint(bits) | Self::Ufixed(bits, _) => Ok(bits / 8),
            Self::Address => Ok(arc4_common::address::PUBLIC_KEY_LENGTH),
            Self::Bool | Self::Byte => Ok(1),
            Self::FixedArray(child, len) => {
                if matches!(**child, Self::Bool) {
                    Ok(len.div_ceil(8))
                } else {
                    Ok(child.fixed_len()? * len)
                }
            }
            Self::Tuple(children) => {
                let mut size = 0;
                let mut i = 0;
                while i < children.len() {
                    if matches!(children[i], Self::Bool) {
                        let end = bool_run_end(children, i);
                        size += (end - i + 1).div_ceil(8);
                        i = end + 1;
                    } else {
                        size += children[i].fixed_len()?;
                        i += 1;
                    }
                }
                Ok(size)
            }
            Self::Struct { .. } => self.to_tuple_type().fixed_len(),
            Self::String | Self::Array(_) => {
                Err(Error::validation(self, "dynamic types have no fixed length"))
            }
        }
    }

    /// The equivalent tuple descriptor of a struct, with every nested struct
    /// and inline field list lowered recursively. Non-struct descriptors are
    /// returned unchanged.
    pub fn to_tuple_type(&self) -> Self {
        match self {
            Self::Struct { fields, .. } => tuple_type_from_fields(fields),
            other => other.clone(),
        }
    }
}

impl FromStr for AbiType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Ufixed(bits, precision) => write!(f, "ufixed{bits}x{precision}"),
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::Byte => f.write_str("byte"),
            Self::String => f.write_str("string"),
            Self::Tuple(children) => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            Self::FixedArray(child, len) => write!(f, "{child}[{len}]"),
            Self::Array(child) => write!(f, "{child}[]"),
            Self::Struct { name, .. } => f.write_str(name),
        }
    }
}

/// Index of the last `Bool` in the run starting at `start`, capped at 8
/// elements so that each run packs into a single byte.
///
/// The caller guarantees `types[start]` is `Bool`.
pub(crate) fn bool_run_end(types: &[AbiType], start: usize) -> usize {
    let mut end = start;
    while end + 1 < types.len() && end + 1 - start < 8 && matches!(types[end + 1], AbiType::Bool) {
        end += 1;
    }
    end
}

/// Splits the interior of a tuple type string into its top-level
/// comma-separated segments, respecting nested parentheses.
fn split_tuple(content: &str) -> Result<Vec<&str>> {
    if content.is_empty() {
        return Ok(Vec::new());
    }
    if content.starts_with(',') || content.ends_with(',') || content.contains(",,") {
        return Err(Error::validation(content, "malformed tuple separators"));
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in content.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::validation(content, "unbalanced parentheses"))?;
            }
            ',' if depth == 0 => {
                parts.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Error::validation(content, "unbalanced parentheses"));
    }
    parts.push(&content[start..]);
    Ok(parts)
}
