use std::borrow::Cow;

/// ARC-4 codec result type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the ARC-4 type system and codec.
///
/// One variant per failure class: a malformed type string, a value that does
/// not fit the shape of its descriptor, or a byte buffer that does not decode
/// under its descriptor. Every failure is fatal to the single operation in
/// progress; nothing in this crate retries or returns partial results.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed ARC-4 type string or struct schema.
    #[error("invalid ABI type {ty:?}: {msg}")]
    Validation {
        /// The offending type string or struct name.
        ty: String,
        /// Why it was rejected.
        msg: Cow<'static, str>,
    },
    /// Value does not match the shape implied by its descriptor.
    #[error("cannot encode value as {ty}: {msg}")]
    Encode {
        /// Canonical string of the descriptor being encoded against.
        ty: String,
        /// Why the value was rejected.
        msg: Cow<'static, str>,
    },
    /// Byte buffer does not decode under the descriptor.
    #[error("cannot decode bytes as {ty}: {msg}")]
    Decode {
        /// Canonical string of the descriptor being decoded against.
        ty: String,
        /// Why the bytes were rejected.
        msg: Cow<'static, str>,
    },
}

impl Error {
    pub(crate) fn validation(ty: impl ToString, msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { ty: ty.to_string(), msg: msg.into() }
    }

    pub(crate) fn encode(ty: impl ToString, msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Encode { ty: ty.to_string(), msg: msg.into() }
    }

    pub(crate) fn decode(ty: impl ToString, msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Decode { ty: ty.to_string(), msg: msg.into() }
    }
}
