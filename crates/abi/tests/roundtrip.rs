//! Property tests over randomly generated descriptors and values.

use arc4_abi::{AbiType, AbiValue, Address, U512};
use proptest::prelude::*;

fn arb_type() -> impl Strategy<Value = AbiType> {
    let leaf = prop_oneof![
        (1usize..=64).prop_map(|words| AbiType::Uint(words * 8)),
        ((1usize..=64), (1usize..=160)).prop_map(|(words, p)| AbiType::Ufixed(words * 8, p)),
        Just(AbiType::Address),
        Just(AbiType::Bool),
        Just(AbiType::Byte),
        Just(AbiType::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(AbiType::Tuple),
            (inner.clone(), 0usize..4)
                .prop_map(|(child, len)| AbiType::FixedArray(Box::new(child), len)),
            inner.prop_map(|child| AbiType::Array(Box::new(child))),
        ]
    })
}

fn arb_value(ty: &AbiType) -> BoxedStrategy<AbiValue> {
    match ty {
        AbiType::Uint(bits) | AbiType::Ufixed(bits, _) => {
            prop::collection::vec(any::<u8>(), bits / 8)
                .prop_map(|bytes| AbiValue::Uint(U512::from_be_slice(&bytes)))
                .boxed()
        }
        AbiType::Address => {
            any::<[u8; 32]>().prop_map(|pk| AbiValue::Address(Address::new(pk))).boxed()
        }
        AbiType::Bool => any::<bool>().prop_map(AbiValue::Bool).boxed(),
        AbiType::Byte => any::<u8>().prop_map(AbiValue::Byte).boxed(),
        AbiType::String => prop::collection::vec(any::<char>(), 0..8)
            .prop_map(|chars| AbiValue::String(chars.into_iter().collect()))
            .boxed(),
        AbiType::Tuple(children) => {
            let elements: Vec<BoxedStrategy<AbiValue>> = children.iter().map(arb_value).collect();
            elements.prop_map(AbiValue::Array).boxed()
        }
        AbiType::FixedArray(child, len) => match **child {
            AbiType::Byte => {
                prop::collection::vec(any::<u8>(), *len).prop_map(AbiValue::Bytes).boxed()
            }
            _ => prop::collection::vec(arb_value(child), *len).prop_map(AbiValue::Array).boxed(),
        },
        AbiType::Array(child) => match **child {
            AbiType::Byte => {
                prop::collection::vec(any::<u8>(), 0..4).prop_map(AbiValue::Bytes).boxed()
            }
            _ => prop::collection::vec(arb_value(child), 0..4).prop_map(AbiValue::Array).boxed(),
        },
        AbiType::Struct { .. } => unreachable!("arb_type never generates structs"),
    }
}

fn arb_pair() -> impl Strategy<Value = (AbiType, AbiValue)> {
    arb_type().prop_flat_map(|ty| {
        let values = arb_value(&ty);
        values.prop_map(move |value| (ty.clone(), value))
    })
}

proptest! {
    #[test]
    fn encode_then_decode_round_trips((ty, value) in arb_pair()) {
        let bytes = ty.encode(&value).unwrap();
        prop_assert_eq!(ty.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn type_strings_round_trip(ty in arb_type()) {
        let rendered = ty.to_string();
        prop_assert_eq!(rendered.parse::<AbiType>().unwrap(), ty);
    }

    #[test]
    fn static_encodings_match_fixed_len((ty, value) in arb_pair()) {
        if !ty.is_dynamic() {
            let bytes = ty.encode(&value).unwrap();
            prop_assert_eq!(bytes.len(), ty.fixed_len().unwrap());
        }
    }

    #[test]
    fn decoding_never_panics(ty in arb_type(), bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = ty.decode(&bytes);
    }
}
