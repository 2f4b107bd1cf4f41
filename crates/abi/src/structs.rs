//! Named struct schemas and their tuple lowering.
//!
//! Structs never appear in the wire format: a struct descriptor encodes
//! exactly like the tuple of its field types, in declaration order. This
//! module resolves a JSON struct schema (the `structs` section of a contract
//! spec) into [`AbiType::Struct`] descriptors and converts values between
//! their named and positional forms.

use crate::{AbiType, AbiValue, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved struct field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructField {
    /// The field's name.
    pub name: String,
    /// The field's type.
    pub ty: StructFieldType,
}

/// The type of a resolved struct field: either a concrete descriptor
/// (possibly itself a struct resolved by name) or an anonymous inline field
/// list, which lowers to a nested tuple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructFieldType {
    /// A concrete type descriptor.
    Type(AbiType),
    /// An anonymous nested field list.
    Fields(Vec<StructField>),
}

/// An unresolved struct field as it appears in a contract spec.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StructFieldDef {
    /// The field's name.
    pub name: String,
    /// The field's type.
    #[serde(rename = "type")]
    pub ty: FieldTypeDef,
}

/// The type of an unresolved field: a string that is either another struct's
/// name or an ARC-4 type string, or an inline field list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldTypeDef {
    /// A struct name or ARC-4 type string. Struct names take precedence:
    /// the string is looked up in the schema first and parsed as a type
    /// string only if no struct has that exact name.
    Name(String),
    /// An anonymous nested field list.
    Fields(Vec<StructFieldDef>),
}

/// A contract's struct definitions, keyed by struct name.
pub type StructSchema = BTreeMap<String, Vec<StructFieldDef>>;

impl AbiType {
    /// Resolves the named struct from `schema` into a descriptor.
    ///
    /// Field type strings are looked up in the schema before being parsed as
    /// ARC-4 type strings, so structs may reference each other. Recursive
    /// definitions have no finite encoding and are rejected.
    pub fn from_struct(name: &str, schema: &StructSchema) -> Result<Self> {
        let mut stack = Vec::new();
        resolve_struct(name, schema, &mut stack)
    }
}

fn resolve_struct(name: &str, schema: &StructSchema, stack: &mut Vec<String>) -> Result<AbiType> {
    if stack.iter().any(|seen| seen == name) {
        return Err(Error::validation(name, "recursive struct definition"));
    }
    let defs = schema
        .get(name)
        .ok_or_else(|| Error::validation(name, "struct is not defined in the schema"))?;
    stack.push(name.to_string());
    let fields = resolve_fields(defs, schema, stack)?;
    stack.pop();
    Ok(AbiType::Struct { name: name.to_string(), fields })
}

fn resolve_fields(
    defs: &[StructFieldDef],
    schema: &StructSchema,
    stack: &mut Vec<String>,
) -> Result<Vec<StructField>> {
    defs.iter()
        .map(|def| {
            let ty = match &def.ty {
                FieldTypeDef::Name(s) => {
                    if schema.contains_key(s) {
                        StructFieldType::Type(resolve_struct(s, schema, stack)?)
                    } else {
                        StructFieldType::Type(AbiType::parse(s)?)
                    }
                }
                FieldTypeDef::Fields(nested) => {
                    StructFieldType::Fields(resolve_fields(nested, schema, stack)?)
                }
            };
            Ok(StructField { name: def.name.clone(), ty })
        })
        .collect()
}

/// Lowers a resolved field list to its equivalent tuple descriptor.
pub(crate) fn tuple_type_from_fields(fields: &[StructField]) -> AbiType {
    AbiType::Tuple(
        fields
            .iter()
            .map(|field| match &field.ty {
                StructFieldType::Type(ty) => ty.to_tuple_type(),
                StructFieldType::Fields(nested) => tuple_type_from_fields(nested),
            })
            .collect(),
    )
}

/// Lowers a struct value into the positional element list of its equivalent
/// tuple. Accepts either a named [`AbiValue::Struct`] (field names must match
/// the schema, in order) or an already-positional [`AbiValue::Array`].
pub(crate) fn lower_struct_value(
    name: &str,
    fields: &[StructField],
    value: &AbiValue,
) -> Result<Vec<AbiValue>> {
    let items: Vec<(Option<&str>, &AbiValue)> = match value {
        AbiValue::Struct(pairs) => {
            pairs.iter().map(|(field, item)| (Some(field.as_str()), item)).collect()
        }
        AbiValue::Array(items) => items.iter().map(|item| (None, item)).collect(),
        other => {
            return Err(Error::encode(
                name,
                format!("expected a struct or array value, got {}", other.type_name()),
            ));
        }
    };
    if items.len() != fields.len() {
        return Err(Error::encode(
            name,
            format!("expected {} fields, got {}", fields.len(), items.len()),
        ));
    }
    fields
        .iter()
        .zip(items)
        .map(|(field, (item_name, item))| {
            if let Some(item_name) = item_name {
                if item_name != field.name {
                    return Err(Error::encode(
                        name,
                        format!("expected field {:?}, got {item_name:?}", field.name),
                    ));
                }
            }
            match &field.ty {
                StructFieldType::Type(AbiType::Struct { name: nested_name, fields: nested }) => {
                    Ok(AbiValue::Array(lower_struct_value(nested_name, nested, item)?))
                }
                StructFieldType::Fields(nested) => {
                    Ok(AbiValue::Array(lower_struct_value(name, nested, item)?))
                }
                StructFieldType::Type(_) => Ok(item.clone()),
            }
        })
        .collect()
}

/// Lifts a decoded positional tuple value back into named struct form.
pub(crate) fn lift_tuple_value(
    name: &str,
    fields: &[StructField],
    values: Vec<AbiValue>,
) -> Result<AbiValue> {
    if values.len() != fields.len() {
        return Err(Error::decode(
            name,
            format!("expected {} fields, got {}", fields.len(), values.len()),
        ));
    }
    let pairs = fields
        .iter()
        .zip(values)
        .map(|(field, value)| {
            let lifted = match &field.ty {
                StructFieldType::Type(AbiType::Struct { name: nested_name, fields: nested }) => {
                    let AbiValue::Array(items) = value else {
                        return Err(Error::decode(name, "expected a tuple value for struct field"));
                    };
                    lift_tuple_value(nested_name, nested, items)?
                }
                StructFieldType::Fields(nested) => {
                    let AbiValue::Array(items) = value else {
                        return Err(Error::decode(name, "expected a tuple value for struct field"));
                    };
                    lift_tuple_value(name, nested, items)?
                }
                StructFieldType::Type(_) => value,
            };
            Ok((field.name.clone(), lifted))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AbiValue::Struct(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> StructSchema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn resolves_flat_struct() {
        let schema = schema(
            r#"{"Point": [{"name": "x", "type": "uint64"}, {"name": "y", "type": "uint64"}]}"#,
        );
        let ty = AbiType::from_struct("Point", &schema).unwrap();
        assert_eq!(ty.to_string(), "Point");
        assert_eq!(ty.to_tuple_type().to_string(), "(uint64,uint64)");
        assert!(!ty.is_dynamic());
        assert_eq!(ty.fixed_len().unwrap(), 16);
    }

    #[test]
    fn resolves_nested_struct_references() {
        let schema = schema(
            r#"{
                "Line": [{"name": "from", "type": "Point"}, {"name": "to", "type": "Point"}],
                "Point": [{"name": "x", "type": "uint64"}, {"name": "y", "type": "uint64"}]
            }"#,
        );
        let ty = AbiType::from_struct("Line", &schema).unwrap();
        assert_eq!(ty.to_tuple_type().to_string(), "((uint64,uint64),(uint64,uint64))");
    }

    #[test]
    fn resolves_inline_field_lists() {
        let schema = schema(
            r#"{"Account": [
                {"name": "balance", "type": "uint64"},
                {"name": "meta", "type": [
                    {"name": "label", "type": "string"},
                    {"name": "frozen", "type": "bool"}
                ]}
            ]}"#,
        );
        let ty = AbiType::from_struct("Account", &schema).unwrap();
        assert_eq!(ty.to_tuple_type().to_string(), "(uint64,(string,bool))");
        assert!(ty.is_dynamic());
    }

    #[test]
    fn rejects_recursive_structs() {
        let mutual = schema(
            r#"{
                "A": [{"name": "b", "type": "B"}],
                "B": [{"name": "a", "type": "A"}]
            }"#,
        );
        AbiType::from_struct("A", &mutual).unwrap_err();

        let direct = schema(r#"{"S": [{"name": "s", "type": "S"}]}"#);
        AbiType::from_struct("S", &direct).unwrap_err();
    }

    #[test]
    fn rejects_unknown_names() {
        let schema = schema(r#"{"A": [{"name": "b", "type": "Missing"}]}"#);
        // "Missing" is neither a struct nor a valid type string.
        AbiType::from_struct("A", &schema).unwrap_err();
        AbiType::from_struct("Nope", &schema).unwrap_err();
    }

    #[test]
    fn lowers_and_lifts_values() {
        let schema = schema(
            r#"{"Point": [{"name": "x", "type": "uint64"}, {"name": "y", "type": "uint64"}]}"#,
        );
        let AbiType::Struct { name, fields } = AbiType::from_struct("Point", &schema).unwrap()
        else {
            panic!("expected struct")
        };
        let value = AbiValue::Struct(vec![
            ("x".to_string(), AbiValue::from(1u64)),
            ("y".to_string(), AbiValue::from(2u64)),
        ]);
        let lowered = lower_struct_value(&name, &fields, &value).unwrap();
        assert_eq!(lowered, vec![AbiValue::from(1u64), AbiValue::from(2u64)]);
        assert_eq!(lift_tuple_value(&name, &fields, lowered).unwrap(), value);
    }

    #[test]
    fn lowering_checks_field_names_and_arity() {
        let schema = schema(
            r#"{"Point": [{"name": "x", "type": "uint64"}, {"name": "y", "type": "uint64"}]}"#,
        );
        let AbiType::Struct { name, fields } = AbiType::from_struct("Point", &schema).unwrap()
        else {
            panic!("expected struct")
        };
        let wrong_name = AbiValue::Struct(vec![
            ("x".to_string(), AbiValue::from(1u64)),
            ("z".to_string(), AbiValue::from(2u64)),
        ]);
        lower_struct_value(&name, &fields, &wrong_name).unwrap_err();
        let short = AbiValue::Struct(vec![("x".to_string(), AbiValue::from(1u64))]);
        lower_struct_value(&name, &fields, &short).unwrap_err();
        // Positional arrays are accepted without names.
        let positional = AbiValue::Array(vec![AbiValue::from(1u64), AbiValue::from(2u64)]);
        assert_eq!(
            lower_struct_value(&name, &fields, &positional).unwrap(),
            vec![AbiValue::from(1u64), AbiValue::from(2u64)]
        );
    }
}
