//! Algorand account addresses.
//!
//! An address is a 32-byte Ed25519 public key. Its human-readable form is the
//! RFC 4648 base32 encoding (no padding) of the public key followed by a
//! 4-byte checksum, where the checksum is the last 4 bytes of the SHA-512/256
//! digest of the public key.

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};
use std::{fmt, str::FromStr};

/// Length of an address in its string form.
pub const ADDRESS_LENGTH: usize = 58;
/// Length of the raw public key underlying an address.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// Length of the checksum suffix appended before base32 encoding.
pub const CHECKSUM_LENGTH: usize = 4;

/// Errors from parsing or constructing an [`Address`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The string form has the wrong number of characters.
    #[error("malformed address: expected {ADDRESS_LENGTH} characters, got {0}")]
    WrongLength(usize),
    /// The string form is not valid unpadded base32.
    #[error("malformed address: not valid base32")]
    InvalidBase32,
    /// The raw key material has the wrong number of bytes.
    #[error("malformed address: expected a {PUBLIC_KEY_LENGTH}-byte public key, got {0} bytes")]
    WrongKeyLength(usize),
    /// The checksum suffix does not match the public key.
    #[error("wrong checksum for address")]
    WrongChecksum,
}

/// An Algorand account address.
///
/// Wraps the 32-byte public key; [`fmt::Display`] and [`FromStr`] convert to
/// and from the 58-character checksummed string form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address {
    public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self { public_key: [0; PUBLIC_KEY_LENGTH] };

    /// Creates an address from a raw public key.
    pub const fn new(public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self { public_key }
    }

    /// Creates an address from a public key byte slice, checking its length.
    pub fn from_public_key(bytes: &[u8]) -> Result<Self, AddressError> {
        let public_key: [u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| AddressError::WrongKeyLength(bytes.len()))?;
        Ok(Self { public_key })
    }

    /// The raw public key of this address.
    pub const fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    /// The 4-byte checksum of this address.
    pub fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
        let digest = Sha512_256::digest(self.public_key);
        let mut checksum = [0u8; CHECKSUM_LENGTH];
        checksum.copy_from_slice(&digest[PUBLIC_KEY_LENGTH - CHECKSUM_LENGTH..]);
        checksum
    }

    /// Returns true if `address` parses as a valid checksummed address string.
    pub fn is_valid(address: &str) -> bool {
        address.parse::<Self>().is_ok()
    }

    /// The escrow address of an application, derived as
    /// `sha512_256("appID" || big_endian_u64(app_id))`.
    pub fn application(app_id: u64) -> Self {
        let mut hasher = Sha512_256::new();
        hasher.update(b"appID");
        hasher.update(app_id.to_be_bytes());
        let digest = hasher.finalize();
        let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
        public_key.copy_from_slice(&digest);
        Self { public_key }
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.public_key
    }
}

impl From<[u8; PUBLIC_KEY_LENGTH]> for Address {
    fn from(public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self { public_key }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = [0u8; PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH];
        raw[..PUBLIC_KEY_LENGTH].copy_from_slice(&self.public_key);
        raw[PUBLIC_KEY_LENGTH..].copy_from_slice(&self.checksum());
        f.write_str(&BASE32_NOPAD.encode(&raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LENGTH {
            return Err(AddressError::WrongLength(s.len()));
        }
        let decoded =
            BASE32_NOPAD.decode(s.as_bytes()).map_err(|_| AddressError::InvalidBase32)?;
        if decoded.len() != PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH {
            return Err(AddressError::InvalidBase32);
        }
        let address = Self::from_public_key(&decoded[..PUBLIC_KEY_LENGTH])?;
        if decoded[PUBLIC_KEY_LENGTH..] != address.checksum() {
            return Err(AddressError::WrongChecksum);
        }
        Ok(address)
    }
}
