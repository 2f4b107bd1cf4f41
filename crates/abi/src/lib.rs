//! ARC-4 (Algorand ABI) type system and binary value codec.
//!
//! The crate revolves around [`AbiType`], a descriptor parsed from an ARC-4
//! type string or resolved from a struct schema, which encodes and decodes
//! [`AbiValue`]s to the deterministic big-endian wire format. On top of that,
//! [`Method`] and [`ContractSpec`] model contract interfaces with canonical
//! signatures and 4-byte selectors.
//!
//! ```
//! use arc4_abi::{AbiType, AbiValue};
//!
//! let ty: AbiType = "(uint64,string)".parse()?;
//! let value = AbiValue::Array(vec![AbiValue::from(42u64), AbiValue::from("hi")]);
//! let bytes = ty.encode(&value)?;
//! assert_eq!(ty.decode(&bytes)?, value);
//! # Ok::<(), arc4_abi::Error>(())
//! ```

#![warn(missing_docs, unused_crate_dependencies)]

#[cfg(test)]
use proptest as _;

mod decode;
mod encode;
mod error;
mod method;
mod structs;
mod ty;
mod value;

pub use error::{Error, Result};
pub use method::{
    ContractSpec, Method, MethodArg, MethodArgDef, MethodArgType, MethodDef, MethodReturnDef,
    MethodReturnType, ReferenceKind, TransactionKind, SELECTOR_LENGTH,
};
pub use structs::{FieldTypeDef, StructField, StructFieldDef, StructFieldType, StructSchema};
pub use ty::AbiType;
pub use value::AbiValue;

pub use alloy_primitives::U512;
pub use arc4_common::{Address, AddressError};
