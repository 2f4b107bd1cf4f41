//! Value decoding.
//!
//! Decoding inverts the head/tail layout: static children are read in place,
//! dynamic children contribute a 2-byte offset to a segment list, and once the
//! head is exhausted each segment `[left, right)` is sliced out of the buffer
//! and decoded recursively. Offsets must be in order, within bounds, and (when
//! the tuple has no dynamic children at all) the buffer must be consumed
//! exactly.

use crate::{
    encode::BOOL_TRUE,
    structs::lift_tuple_value,
    ty::{bool_run_end, LENGTH_SIZE},
    AbiType, AbiValue, Error, Result,
};
use arc4_common::{u512_from_be_bytes, Address};

impl AbiType {
    /// Decodes `bytes` under this descriptor.
    ///
    /// The buffer must be exactly one encoded value; trailing or missing
    /// bytes are an [`Error::Decode`].
    pub fn decode(&self, bytes: &[u8]) -> Result<AbiValue> {
        match self {
            Self::Uint(bits) | Self::Ufixed(bits, _) => {
                if bytes.len() != bits / 8 {
                    return Err(wrong_len(self, bits / 8, bytes.len()));
                }
                Ok(AbiValue::Uint(u512_from_be_bytes(bytes)))
            }
            Self::Address => {
                let address = Address::from_public_key(bytes)
                    .map_err(|e| Error::decode(self, e.to_string()))?;
                Ok(AbiValue::Address(address))
            }
            Self::Bool => {
                if bytes.len() != 1 {
                    return Err(wrong_len(self, 1, bytes.len()));
                }
                match bytes[0] {
                    BOOL_TRUE => Ok(AbiValue::Bool(true)),
                    0 => Ok(AbiValue::Bool(false)),
                    other => Err(Error::decode(self, format!("invalid bool byte {other:#04x}"))),
                }
            }
            Self::Byte => {
                if bytes.len() != 1 {
                    return Err(wrong_len(self, 1, bytes.len()));
                }
                Ok(AbiValue::Byte(bytes[0]))
            }
            Self::String => {
                let (declared, body) = split_length_prefix(self, bytes)?;
                if declared != body.len() {
                    return Err(Error::decode(
                        self,
                        format!("length prefix says {declared} bytes, buffer holds {}", body.len()),
                    ));
                }
                let text = std::str::from_utf8(body)
                    .map_err(|_| Error::decode(self, "string is not valid UTF-8"))?;
                Ok(AbiValue::String(text.to_string()))
            }
            Self::Tuple(children) => Ok(AbiValue::Array(decode_tuple(self, children, bytes)?)),
            Self::FixedArray(child, len) => {
                let children = vec![(**child).clone(); *len];
                collect_array(child, decode_tuple(self, &children, bytes)?)
            }
            Self::Array(child) => {
                let (count, body) = split_length_prefix(self, bytes)?;
                let children = vec![(**child).clone(); count];
                collect_array(child, decode_tuple(self, &children, body)?)
            }
            Self::Struct { name, fields } => {
                let tuple = self.to_tuple_type();
                let AbiType::Tuple(children) = &tuple else {
                    unreachable!("structs lower to tuples")
                };
                let values = decode_tuple(&tuple, children, bytes)?;
                lift_tuple_value(name, fields, values)
            }
        }
    }
}

/// Reads the leading 2-byte big-endian count of a length-prefixed type and
/// returns it with the remaining body.
fn split_length_prefix<'a>(ty: &AbiType, bytes: &'a [u8]) -> Result<(usize, &'a [u8])> {
    if bytes.len() < LENGTH_SIZE {
        return Err(Error::decode(ty, "buffer too short for a length prefix"));
    }
    let count = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    Ok((count, &bytes[LENGTH_SIZE..]))
}

/// Wraps decoded array elements: `byte` elements collapse into a raw
/// [`AbiValue::Bytes`], everything else stays an [`AbiValue::Array`].
fn collect_array(child: &AbiType, values: Vec<AbiValue>) -> Result<AbiValue> {
    if !matches!(child, AbiType::Byte) {
        return Ok(AbiValue::Array(values));
    }
    let bytes = values
        .into_iter()
        .map(|value| match value {
            AbiValue::Byte(b) => Ok(b),
            other => Err(Error::decode(child, format!("expected a byte, got {}", other.type_name()))),
        })
        .collect::<Result<Vec<u8>>>()?;
    Ok(AbiValue::Bytes(bytes))
}

fn decode_tuple(ty: &AbiType, children: &[AbiType], bytes: &[u8]) -> Result<Vec<AbiValue>> {
    let partitions = extract_partitions(ty, children, bytes)?;
    children
        .iter()
        .zip(partitions)
        .map(|(child, partition)| child.decode(&partition))
        .collect()
}

/// One head entry during partition extraction: either the child's bytes, read
/// directly out of the head, or an index into the dynamic segment list.
enum Part {
    Bytes(Vec<u8>),
    Segment(usize),
}

/// A dynamic child's tail slice, `[left, right)` into the tuple's buffer.
struct Segment {
    left: usize,
    right: usize,
}

/// Splits a tuple's buffer into one byte partition per child.
///
/// Bool runs are unpacked into synthetic one-byte partitions so that every
/// child decodes uniformly from its own slice.
fn extract_partitions(ty: &AbiType, children: &[AbiType], bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut parts: Vec<Part> = Vec::with_capacity(children.len());
    let mut segments: Vec<Segment> = Vec::new();
    let mut cursor = 0usize;
    let mut i = 0;
    while i < children.len() {
        let child = &children[i];
        if child.is_dynamic() {
            if cursor + LENGTH_SIZE > bytes.len() {
                return Err(Error::decode(ty, "ran out of bytes reading a dynamic offset"));
            }
            let offset = u16::from_be_bytes([bytes[cursor], bytes[cursor + 1]]) as usize;
            if let Some(last) = segments.last_mut() {
                if offset < last.left {
                    return Err(Error::decode(ty, "dynamic offsets are out of order"));
                }
                // The previous dynamic child's tail ends where this one's
                // begins.
                last.right = offset;
            }
            parts.push(Part::Segment(segments.len()));
            segments.push(Segment { left: offset, right: bytes.len() });
            cursor += LENGTH_SIZE;
            i += 1;
        } else if matches!(child, AbiType::Bool) {
            let end = bool_run_end(children, i);
            if cursor >= bytes.len() {
                return Err(Error::decode(ty, "ran out of bytes reading packed bools"));
            }
            let packed = bytes[cursor];
            for bit in 0..=(end - i) {
                let set = packed & (1 << (7 - bit)) != 0;
                parts.push(Part::Bytes(vec![if set { BOOL_TRUE } else { 0 }]));
            }
            cursor += 1;
            i = end + 1;
        } else {
            let size = child.fixed_len()?;
            if cursor + size > bytes.len() {
                return Err(Error::decode(ty, "ran out of bytes reading a static value"));
            }
            parts.push(Part::Bytes(bytes[cursor..cursor + size].to_vec()));
            cursor += size;
            i += 1;
        }
    }

    if segments.is_empty() {
        if cursor != bytes.len() {
            return Err(Error::decode(ty, "buffer was not fully consumed"));
        }
    } else {
        for segment in &segments {
            if segment.left > segment.right || segment.right > bytes.len() {
                return Err(Error::decode(ty, "dynamic offset is out of bounds"));
            }
        }
    }

    Ok(parts
        .into_iter()
        .map(|part| match part {
            Part::Bytes(bytes_part) => bytes_part,
            Part::Segment(idx) => {
                let Segment { left, right } = segments[idx];
                bytes[left..right].to_vec()
            }
        })
        .collect())
}

fn wrong_len(ty: &AbiType, expected: usize, got: usize) -> Error {
    Error::decode(ty, format!("expected {expected} bytes, got {got}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> AbiType {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_short_buffers() {
        ty("uint64").decode(&[0, 0, 0]).unwrap_err();
        ty("address").decode(&[0; 31]).unwrap_err();
        ty("string").decode(&[0]).unwrap_err();
        ty("bool[]").decode(&[]).unwrap_err();
        ty("(uint8,uint8)").decode(&[1]).unwrap_err();
        ty("(uint32,string)").decode(&[0, 0, 0, 42, 0]).unwrap_err();
    }

    #[test]
    fn rejects_trailing_bytes() {
        ty("uint8").decode(&[1, 2]).unwrap_err();
        ty("bool").decode(&[0x80, 0]).unwrap_err();
        ty("(uint8,uint8)").decode(&[1, 2, 3]).unwrap_err();
        ty("()").decode(&[0]).unwrap_err();
    }

    #[test]
    fn rejects_invalid_bool_bytes() {
        ty("bool").decode(&[1]).unwrap_err();
        ty("bool").decode(&[0xff]).unwrap_err();
        assert_eq!(ty("bool").decode(&[0x80]), Ok(AbiValue::Bool(true)));
        assert_eq!(ty("bool").decode(&[0]), Ok(AbiValue::Bool(false)));
    }

    #[test]
    fn rejects_bad_string_prefixes() {
        // Prefix says 5 bytes but only 4 follow.
        ty("string").decode(&[0, 5, 104, 105, 104, 105]).unwrap_err();
        // Prefix says 1 byte but 2 follow.
        ty("string").decode(&[0, 1, 104, 105]).unwrap_err();
        // Invalid UTF-8.
        ty("string").decode(&[0, 2, 0xff, 0xfe]).unwrap_err();
    }

    #[test]
    fn rejects_out_of_order_offsets() {
        // Two dynamic strings whose offsets point backwards.
        ty("(string,string)").decode(&[0, 6, 0, 4, 0, 0, 0, 0]).unwrap_err();
    }

    #[test]
    fn rejects_out_of_bounds_offsets() {
        ty("(string,string)").decode(&[0, 4, 0, 90, 0, 0, 0, 0]).unwrap_err();
        ty("(string)").decode(&[0, 90, 0, 0]).unwrap_err();
    }

    #[test]
    fn empty_tuple_decodes_from_empty_buffer() {
        assert_eq!(ty("()").decode(&[]), Ok(AbiValue::Array(vec![])));
    }

    #[test]
    fn zero_size_trailing_children_round_trip() {
        let empty = || AbiValue::Array(vec![]);
        let cases = [
            ("(uint8,())", AbiValue::Array(vec![AbiValue::from(5u64), empty()])),
            ("()[2]", AbiValue::Array(vec![empty(), empty()])),
            (
                "(byte,uint344,())",
                AbiValue::Array(vec![AbiValue::Byte(7), AbiValue::from(9u64), empty()]),
            ),
            ("(uint8,(),())", AbiValue::Array(vec![AbiValue::from(5u64), empty(), empty()])),
        ];
        for (type_str, value) in cases {
            let t = ty(type_str);
            let bytes = t.encode(&value).unwrap();
            assert_eq!(t.decode(&bytes).unwrap(), value, "round-tripping {type_str}");
        }
    }

    #[test]
    fn byte_arrays_decode_to_raw_bytes() {
        assert_eq!(ty("byte[3]").decode(&[1, 2, 3]), Ok(AbiValue::Bytes(vec![1, 2, 3])));
        assert_eq!(ty("byte[]").decode(&[0, 2, 7, 9]), Ok(AbiValue::Bytes(vec![7, 9])));
        assert_eq!(ty("byte[]").decode(&[0, 0]), Ok(AbiValue::Bytes(vec![])));
    }
}
