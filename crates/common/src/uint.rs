//! Fixed-width big-endian conversions for big unsigned integers.
//!
//! Range checking is left to the caller: these helpers truncate or zero-extend
//! to the requested width, and the ABI layer checks `value < 2^bits` before
//! calling in.

use alloy_primitives::U512;

/// Serializes `value` as exactly `len` big-endian bytes, `len <= 64`.
pub fn u512_to_be_bytes(value: U512, len: usize) -> Vec<u8> {
    debug_assert!(len <= 64);
    value.to_be_bytes::<64>()[64 - len..].to_vec()
}

/// Deserializes up to 64 big-endian bytes into a [`U512`].
pub fn u512_from_be_bytes(bytes: &[u8]) -> U512 {
    debug_assert!(bytes.len() <= 64);
    U512::from_be_slice(bytes)
}
