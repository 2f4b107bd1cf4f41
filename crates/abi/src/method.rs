//! ABI methods, signatures and selectors.
//!
//! A method's canonical signature is `name(argtypes)returntype` with no
//! whitespace. Struct arguments render as their equivalent tuple, transaction
//! and reference arguments as their keyword. The selector is the first 4
//! bytes of the SHA-512/256 digest of the signature.

use crate::{AbiType, Error, Result, StructSchema};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512_256};
use std::fmt;

/// Size of a method selector in bytes.
pub const SELECTOR_LENGTH: usize = 4;

/// The transaction kinds a method argument can require in the group ahead of
/// the application call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Any transaction type.
    Txn,
    /// A payment.
    Pay,
    /// A key registration.
    Keyreg,
    /// An asset configuration.
    Acfg,
    /// An asset transfer.
    Axfer,
    /// An asset freeze.
    Afrz,
    /// An application call.
    Appl,
}

impl TransactionKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Txn => "txn",
            Self::Pay => "pay",
            Self::Keyreg => "keyreg",
            Self::Acfg => "acfg",
            Self::Axfer => "axfer",
            Self::Afrz => "afrz",
            Self::Appl => "appl",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "txn" => Self::Txn,
            "pay" => Self::Pay,
            "keyreg" => Self::Keyreg,
            "acfg" => Self::Acfg,
            "axfer" => Self::Axfer,
            "afrz" => Self::Afrz,
            "appl" => Self::Appl,
            _ => return None,
        })
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The foreign-array reference kinds a method argument can stand for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// An entry of the foreign accounts array.
    Account,
    /// An entry of the foreign applications array.
    Application,
    /// An entry of the foreign assets array.
    Asset,
}

impl ReferenceKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Application => "application",
            Self::Asset => "asset",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "account" => Self::Account,
            "application" => Self::Application,
            "asset" => Self::Asset,
            _ => return None,
        })
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type position of a method argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodArgType {
    /// An ABI-encoded value.
    Value(AbiType),
    /// A transaction placed in the group ahead of the call.
    Transaction(TransactionKind),
    /// An index into one of the foreign arrays, passed as `uint8`.
    Reference(ReferenceKind),
}

impl MethodArgType {
    /// Parses an argument type string: a transaction keyword, a reference
    /// keyword, or an ARC-4 type string.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(kind) = TransactionKind::parse(s) {
            return Ok(Self::Transaction(kind));
        }
        if let Some(kind) = ReferenceKind::parse(s) {
            return Ok(Self::Reference(kind));
        }
        Ok(Self::Value(AbiType::parse(s)?))
    }

    /// Whether this argument carries an ABI-encoded value in the application
    /// arguments (as opposed to a group transaction).
    pub fn is_value(&self) -> bool {
        !matches!(self, Self::Transaction(_))
    }
}

impl fmt::Display for MethodArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Structs must render as their tuple form: the canonical
            // signature never contains struct names.
            Self::Value(ty) => write!(f, "{}", ty.to_tuple_type()),
            Self::Transaction(kind) => write!(f, "{kind}"),
            Self::Reference(kind) => write!(f, "{kind}"),
        }
    }
}

/// A resolved method argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodArg {
    /// The argument's name, if the contract spec declares one.
    pub name: Option<String>,
    /// The argument's docstring, if any.
    pub desc: Option<String>,
    /// The argument's type.
    pub ty: MethodArgType,
}

/// A resolved method return type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodReturnType {
    /// The method returns nothing.
    Void,
    /// The method logs an ABI-encoded return value.
    Value(AbiType),
}

impl fmt::Display for MethodReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Value(ty) => write!(f, "{}", ty.to_tuple_type()),
        }
    }
}

/// A resolved ABI method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    /// The method's name.
    pub name: String,
    /// The method's docstring, if any.
    pub desc: Option<String>,
    /// The method's arguments, in call order.
    pub args: Vec<MethodArg>,
    /// The method's return type.
    pub returns: MethodReturnType,
    /// Whether the method is declared read-only (simulatable without a
    /// transaction).
    pub readonly: bool,
}

impl Method {
    /// The canonical signature, e.g. `add(uint64,uint64)uint128`.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push('(');
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&arg.ty.to_string());
        }
        out.push(')');
        out.push_str(&self.returns.to_string());
        out
    }

    /// The 4-byte method selector: the leading bytes of the SHA-512/256
    /// digest of the canonical signature.
    pub fn selector(&self) -> [u8; SELECTOR_LENGTH] {
        let digest = Sha512_256::digest(self.signature().as_bytes());
        let mut selector = [0u8; SELECTOR_LENGTH];
        selector.copy_from_slice(&digest[..SELECTOR_LENGTH]);
        selector
    }

    /// Resolves a method definition against the contract's struct schema.
    pub fn from_def(def: &MethodDef, structs: &StructSchema) -> Result<Self> {
        let args = def
            .args
            .iter()
            .map(|arg| {
                let ty = match &arg.struct_name {
                    Some(name) => MethodArgType::Value(AbiType::from_struct(name, structs)?),
                    None => MethodArgType::parse(&arg.ty)?,
                };
                Ok(MethodArg { name: arg.name.clone(), desc: arg.desc.clone(), ty })
            })
            .collect::<Result<Vec<_>>>()?;
        let returns = match (&def.returns.struct_name, def.returns.ty.as_str()) {
            (Some(name), _) => MethodReturnType::Value(AbiType::from_struct(name, structs)?),
            (None, "void") => MethodReturnType::Void,
            (None, ty) => MethodReturnType::Value(AbiType::parse(ty)?),
        };
        Ok(Self {
            name: def.name.clone(),
            desc: def.desc.clone(),
            args,
            returns,
            readonly: def.readonly.unwrap_or(false),
        })
    }
}

/// An unresolved method argument as it appears in a contract spec.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MethodArgDef {
    /// The argument's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The argument's docstring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// The argument's type string.
    #[serde(rename = "type")]
    pub ty: String,
    /// The struct this argument decodes to, overriding `type` for
    /// resolution. The wire encoding is unchanged.
    #[serde(default, rename = "struct", skip_serializing_if = "Option::is_none")]
    pub struct_name: Option<String>,
}

/// An unresolved method return type as it appears in a contract spec.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MethodReturnDef {
    /// The return type string, or `"void"`.
    #[serde(rename = "type")]
    pub ty: String,
    /// The struct the return value decodes to.
    #[serde(default, rename = "struct", skip_serializing_if = "Option::is_none")]
    pub struct_name: Option<String>,
    /// The return value's docstring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// An unresolved method as it appears in a contract spec.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MethodDef {
    /// The method's name.
    pub name: String,
    /// The method's docstring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// The method's arguments.
    #[serde(default)]
    pub args: Vec<MethodArgDef>,
    /// The method's return type.
    pub returns: MethodReturnDef,
    /// Whether the method is read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
}

/// A contract interface: its methods plus the struct schema they reference.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractSpec {
    /// The contract's name.
    pub name: String,
    /// The contract's docstring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// The contract's methods.
    pub methods: Vec<MethodDef>,
    /// The contract's struct definitions.
    #[serde(default)]
    pub structs: StructSchema,
}

impl ContractSpec {
    /// Resolves every method definition.
    pub fn methods(&self) -> Result<Vec<Method>> {
        self.methods.iter().map(|def| Method::from_def(def, &self.structs)).collect()
    }

    /// Looks up a method by plain name or by full canonical signature.
    ///
    /// A plain name must match exactly one method; if the name is overloaded
    /// the error lists every candidate signature so the caller can retry with
    /// one of them.
    pub fn method(&self, name_or_signature: &str) -> Result<Method> {
        let methods = self.methods()?;
        if name_or_signature.contains('(') {
            return methods
                .into_iter()
                .find(|m| m.signature() == name_or_signature)
                .ok_or_else(|| {
                    Error::validation(name_or_signature, "no method with this signature")
                });
        }
        let mut matches =
            methods.into_iter().filter(|m| m.name == name_or_signature).collect::<Vec<_>>();
        match matches.len() {
            0 => Err(Error::validation(name_or_signature, "no method with this name")),
            1 => {
                let method = matches.remove(0);
                tracing::trace!(name = %method.name, signature = %method.signature(), "resolved method");
                Ok(method)
            }
            _ => {
                let signatures =
                    matches.iter().map(Method::signature).collect::<Vec<_>>().join(", ");
                Err(Error::validation(
                    name_or_signature,
                    format!("method name is overloaded, use one of: {signatures}"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, arg_types: &[&str], ret: &str) -> Method {
        Method {
            name: name.to_string(),
            desc: None,
            args: arg_types
                .iter()
                .map(|s| MethodArg { name: None, desc: None, ty: MethodArgType::parse(s).unwrap() })
                .collect(),
            returns: if ret == "void" {
                MethodReturnType::Void
            } else {
                MethodReturnType::Value(ret.parse().unwrap())
            },
            readonly: false,
        }
    }

    #[test]
    fn signatures() {
        assert_eq!(
            method("add", &["uint64", "uint64"], "uint128").signature(),
            "add(uint64,uint64)uint128"
        );
        assert_eq!(method("noop", &[], "void").signature(), "noop()void");
        assert_eq!(
            method("deposit", &["pay", "account"], "bool").signature(),
            "deposit(pay,account)bool"
        );
        assert_eq!(
            method("swap", &["(uint64,string)", "axfer"], "void").signature(),
            "swap((uint64,string),axfer)void"
        );
    }

    #[test]
    fn struct_args_sign_as_tuples() {
        let schema: StructSchema = serde_json::from_str(
            r#"{"Point": [{"name": "x", "type": "uint64"}, {"name": "y", "type": "uint64"}]}"#,
        )
        .unwrap();
        let ty = AbiType::from_struct("Point", &schema).unwrap();
        let m = Method {
            name: "move_to".to_string(),
            desc: None,
            args: vec![MethodArg { name: None, desc: None, ty: MethodArgType::Value(ty) }],
            returns: MethodReturnType::Void,
            readonly: false,
        };
        assert_eq!(m.signature(), "move_to((uint64,uint64))void");
    }

    #[test]
    fn known_selector() {
        // Cross-checked against the reference Algorand SDKs.
        assert_eq!(
            method("add", &["uint64", "uint64"], "uint128").selector(),
            [0x8a, 0xa3, 0xb6, 0x1f]
        );
    }

    #[test]
    fn arg_type_keywords() {
        assert_eq!(
            MethodArgType::parse("pay").unwrap(),
            MethodArgType::Transaction(TransactionKind::Pay)
        );
        assert_eq!(
            MethodArgType::parse("asset").unwrap(),
            MethodArgType::Reference(ReferenceKind::Asset)
        );
        assert_eq!(
            MethodArgType::parse("uint64").unwrap(),
            MethodArgType::Value(AbiType::Uint(64))
        );
        MethodArgType::parse("payment").unwrap_err();
        assert!(!MethodArgType::Transaction(TransactionKind::Txn).is_value());
        assert!(MethodArgType::Reference(ReferenceKind::Account).is_value());
    }

    #[test]
    fn contract_spec_lookup() {
        let spec: ContractSpec = serde_json::from_str(
            r#"{
                "name": "Calculator",
                "methods": [
                    {"name": "add", "args": [{"type": "uint64"}, {"type": "uint64"}],
                     "returns": {"type": "uint128"}},
                    {"name": "add", "args": [{"type": "uint32"}],
                     "returns": {"type": "uint64"}},
                    {"name": "reset", "args": [], "returns": {"type": "void"}, "readonly": true}
                ]
            }"#,
        )
        .unwrap();
        let reset = spec.method("reset").unwrap();
        assert_eq!(reset.signature(), "reset()void");
        assert!(reset.readonly);
        // Overloaded name: must use the full signature.
        spec.method("add").unwrap_err();
        let add = spec.method("add(uint64,uint64)uint128").unwrap();
        assert_eq!(add.args.len(), 2);
        spec.method("missing").unwrap_err();
        spec.method("add(string)void").unwrap_err();
    }

    #[test]
    fn contract_spec_with_structs() {
        let spec: ContractSpec = serde_json::from_str(
            r#"{
                "name": "Registry",
                "methods": [
                    {"name": "register",
                     "args": [{"type": "(uint64,uint64)", "struct": "Point"}],
                     "returns": {"type": "bool"}}
                ],
                "structs": {
                    "Point": [{"name": "x", "type": "uint64"}, {"name": "y", "type": "uint64"}]
                }
            }"#,
        )
        .unwrap();
        let m = spec.method("register").unwrap();
        assert_eq!(m.signature(), "register((uint64,uint64))bool");
        let MethodArgType::Value(AbiType::Struct { name, .. }) = &m.args[0].ty else {
            panic!("expected a struct argument")
        };
        assert_eq!(name, "Point");
    }
}
