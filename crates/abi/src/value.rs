//! The dynamic value model the codec operates on.

use alloy_primitives::U512;
use arc4_common::Address;

/// A runtime ARC-4 value.
///
/// Values are shape-checked against an [`AbiType`](crate::AbiType) at encode
/// time rather than at construction time, so a freestanding `AbiValue` carries
/// no type: `Uint(5)` can encode as any `uintN` or `ufixedNxM` wide enough to
/// hold it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    /// An unsigned integer, for `uintN` and `ufixedNxM`.
    Uint(U512),
    /// A boolean, for `bool`.
    Bool(bool),
    /// A single byte, for `byte`.
    Byte(u8),
    /// UTF-8 text, for `string`.
    String(String),
    /// An account address, for `address`.
    Address(Address),
    /// A raw byte string, for `byte[N]` and `byte[]`. Decoding a byte array
    /// always produces this variant rather than an `Array` of `Byte`s.
    Bytes(Vec<u8>),
    /// An ordered sequence, for tuples and non-byte arrays.
    Array(Vec<AbiValue>),
    /// Named fields in declaration order, for struct descriptors.
    Struct(Vec<(String, AbiValue)>),
}

impl AbiValue {
    /// A short name for the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint",
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::String(_) => "string",
            Self::Address(_) => "address",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
        }
    }

    /// The contained integer, if this is a `Uint`.
    pub fn as_uint(&self) -> Option<U512> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// The contained boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The contained text, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// The contained address, if this is an `Address`.
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(v) => Some(v),
            _ => None,
        }
    }

    /// The contained raw bytes, if this is a `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// The contained elements, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// The contained fields, if this is a `Struct`.
    pub fn as_struct(&self) -> Option<&[(String, AbiValue)]> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        Self::Uint(U512::from(v))
    }
}

impl From<U512> for AbiValue {
    fn from(v: U512) -> Self {
        Self::Uint(v)
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        Self::Address(v)
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(v: Vec<AbiValue>) -> Self {
        Self::Array(v)
    }
}
