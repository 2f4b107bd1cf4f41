//! Shared Algorand primitives used by the ARC-4 codec crates.
//!
//! This crate contains the pieces that sit below the ABI type system: the
//! [`Address`] type with its base32/checksum string form, and helpers for
//! converting big unsigned integers to and from fixed-width big-endian byte
//! sequences.

#![warn(missing_docs, unused_crate_dependencies)]

pub mod address;
pub mod uint;

pub use address::{Address, AddressError};
pub use uint::{u512_from_be_bytes, u512_to_be_bytes};
