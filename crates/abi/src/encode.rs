//! Value encoding.
//!
//! ARC-4 encodes every composite as a tuple: a head section holding static
//! values and 2-byte offsets, followed by a tail section holding the encoding
//! of each dynamic child. Offsets are measured from the start of the tuple's
//! own encoding. Consecutive `bool` children share head bytes, 8 bools per
//! byte, most significant bit first.

use crate::{
    structs::lower_struct_value,
    ty::{bool_run_end, LENGTH_SIZE, MAX_LEN},
    AbiType, AbiValue, Error, Result,
};
use alloy_primitives::U512;
use arc4_common::{u512_to_be_bytes, Address};

/// The encoded form of `bool` true outside a packed run.
pub(crate) const BOOL_TRUE: u8 = 0x80;

impl AbiType {
    /// Encodes `value` under this descriptor.
    ///
    /// The value's shape must match the descriptor exactly (element counts,
    /// field names, integer range); any mismatch is an [`Error::Encode`].
    pub fn encode(&self, value: &AbiValue) -> Result<Vec<u8>> {
        encode_value(self, value)
    }
}

fn encode_value(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>> {
    match ty {
        AbiType::Uint(bits) | AbiType::Ufixed(bits, _) => encode_uint(ty, *bits, value),
        AbiType::Address => encode_address(ty, value),
        AbiType::Bool => match value {
            AbiValue::Bool(true) => Ok(vec![BOOL_TRUE]),
            AbiValue::Bool(false) => Ok(vec![0]),
            other => Err(mismatch(ty, other)),
        },
        AbiType::Byte => encode_byte(ty, value),
        AbiType::String => encode_string(ty, value),
        AbiType::Tuple(children) => {
            let AbiValue::Array(values) = value else { return Err(mismatch(ty, value)) };
            encode_tuple(ty, children, values)
        }
        AbiType::FixedArray(child, len) => {
            let items = sequence_items(ty, child, value)?;
            if items.len() != *len {
                return Err(Error::encode(
                    ty,
                    format!("expected {len} elements, got {}", items.len()),
                ));
            }
            let children = vec![(**child).clone(); *len];
            encode_tuple(ty, &children, &items)
        }
        AbiType::Array(child) => {
            let items = sequence_items(ty, child, value)?;
            if items.len() > MAX_LEN {
                return Err(Error::encode(ty, "element count does not fit in a u16"));
            }
            let children = vec![(**child).clone(); items.len()];
            let mut out = (items.len() as u16).to_be_bytes().to_vec();
            out.extend(encode_tuple(ty, &children, &items)?);
            Ok(out)
        }
        AbiType::Struct { name, fields } => {
            let lowered = lower_struct_value(name, fields, value)?;
            let tuple = ty.to_tuple_type();
            let AbiType::Tuple(children) = &tuple else { unreachable!("structs lower to tuples") };
            encode_tuple(&tuple, children, &lowered)
        }
    }
}

/// Encodes the body of a tuple (no count prefix) given its child descriptors
/// and their values. Array bodies reuse this with `len` copies of the element
/// descriptor.
fn encode_tuple(ty: &AbiType, children: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>> {
    if values.len() != children.len() {
        return Err(Error::encode(
            ty,
            format!("expected {} values, got {}", children.len(), values.len()),
        ));
    }

    // First pass: static children encode into the head directly, dynamic
    // children get a 2-byte offset placeholder and encode into the tail.
    let mut heads: Vec<Vec<u8>> = Vec::new();
    let mut tails: Vec<Vec<u8>> = Vec::new();
    let mut dynamic_heads: Vec<bool> = Vec::new();
    let mut i = 0;
    while i < children.len() {
        let child = &children[i];
        if child.is_dynamic() {
            heads.push(vec![0; LENGTH_SIZE]);
            tails.push(encode_value(child, &values[i])?);
            dynamic_heads.push(true);
            i += 1;
        } else if matches!(child, AbiType::Bool) {
            let end = bool_run_end(children, i);
            heads.push(vec![pack_bools(ty, &values[i..=end])?]);
            tails.push(Vec::new());
            dynamic_heads.push(false);
            i = end + 1;
        } else {
            heads.push(encode_value(child, &values[i])?);
            tails.push(Vec::new());
            dynamic_heads.push(false);
            i += 1;
        }
    }

    // Second pass: resolve offsets now that the head length is known. Each
    // dynamic child's offset is the head length plus the combined length of
    // every tail before it.
    let head_len: usize = heads.iter().map(Vec::len).sum();
    let mut tail_len = 0;
    for ((head, tail), is_dynamic) in heads.iter_mut().zip(&tails).zip(&dynamic_heads) {
        if *is_dynamic {
            let offset = head_len + tail_len;
            if offset > MAX_LEN {
                return Err(Error::encode(ty, "encoding exceeds the u16 offset range"));
            }
            head.copy_from_slice(&(offset as u16).to_be_bytes());
        }
        tail_len += tail.len();
    }

    let mut out = Vec::with_capacity(head_len + tail_len);
    for head in &heads {
        out.extend_from_slice(head);
    }
    for tail in &tails {
        out.extend_from_slice(tail);
    }
    Ok(out)
}

/// Packs a run of up to 8 bool values into one byte, most significant bit
/// first.
fn pack_bools(ty: &AbiType, values: &[AbiValue]) -> Result<u8> {
    debug_assert!(values.len() <= 8);
    let mut byte = 0u8;
    for (i, value) in values.iter().enumerate() {
        match value {
            AbiValue::Bool(true) => byte |= 1 << (7 - i),
            AbiValue::Bool(false) => {}
            other => return Err(mismatch(ty, other)),
        }
    }
    Ok(byte)
}

/// The element values of an array. `byte` arrays additionally accept a raw
/// [`AbiValue::Bytes`] value.
fn sequence_items(ty: &AbiType, child: &AbiType, value: &AbiValue) -> Result<Vec<AbiValue>> {
    match value {
        AbiValue::Array(items) => Ok(items.clone()),
        AbiValue::Bytes(bytes) if matches!(child, AbiType::Byte) => {
            Ok(bytes.iter().map(|b| AbiValue::Byte(*b)).collect())
        }
        other => Err(mismatch(ty, other)),
    }
}

fn encode_uint(ty: &AbiType, bits: usize, value: &AbiValue) -> Result<Vec<u8>> {
    let v = match value {
        AbiValue::Uint(v) => *v,
        AbiValue::Byte(b) => U512::from(*b),
        other => return Err(mismatch(ty, other)),
    };
    if v.bit_len() > bits {
        return Err(Error::encode(ty, format!("value does not fit in {bits} bits")));
    }
    Ok(u512_to_be_bytes(v, bits / 8))
}

fn encode_byte(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>> {
    match value {
        AbiValue::Byte(b) => Ok(vec![*b]),
        AbiValue::Uint(v) => {
            if v.bit_len() > 8 {
                return Err(Error::encode(ty, "value does not fit in 8 bits"));
            }
            Ok(vec![v.to::<u8>()])
        }
        other => Err(mismatch(ty, other)),
    }
}

fn encode_address(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>> {
    match value {
        AbiValue::Address(address) => Ok(address.public_key().to_vec()),
        AbiValue::Bytes(bytes) => {
            let address = Address::from_public_key(bytes)
                .map_err(|e| Error::encode(ty, e.to_string()))?;
            Ok(address.public_key().to_vec())
        }
        AbiValue::String(s) => {
            let address: Address = s.parse().map_err(|e: arc4_common::AddressError| {
                Error::encode(ty, e.to_string())
            })?;
            Ok(address.public_key().to_vec())
        }
        other => Err(mismatch(ty, other)),
    }
}

fn encode_string(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>> {
    let bytes = match value {
        AbiValue::String(s) => s.as_bytes(),
        AbiValue::Bytes(b) => b.as_slice(),
        other => return Err(mismatch(ty, other)),
    };
    if bytes.len() > MAX_LEN {
        return Err(Error::encode(ty, "byte length does not fit in a u16"));
    }
    let mut out = (bytes.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(bytes);
    Ok(out)
}

fn mismatch(ty: &AbiType, value: &AbiValue) -> Error {
    Error::encode(ty, format!("incompatible value of kind {}", value.type_name()))
}
