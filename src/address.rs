//! Fixed 32-byte account and object addresses
//!
//! Addresses (and object identifiers, which share the representation)
//! occupy exactly 32 bytes on the wire, and have a canonical textual
//! form consisting of `0x` followed by 64 lowercase hex digits, with
//! leading zeros preserved. Parsing is more lenient than printing: the
//! `0x` prefix is optional, case is ignored, and literals shorter than
//! 64 digits are interpreted as if left-padded with zeros, so the
//! short-form spellings that appear inside type names (`0x2`) parse to
//! the same value as their full-width equivalents.

use std::fmt::{self, Debug, Display, Formatter, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// A 32-byte address value.
///
/// Internally a thin wrapper around `[u8; 32]`; all conversions to and
/// from text go through the canonical hex form.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Address([u8; Address::LENGTH]);

impl Address {
    /// Byte-width of every address.
    pub const LENGTH: usize = 32;

    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; Self::LENGTH]);

    /// Constructs an [`Address`] from a 32-byte array.
    #[inline(always)]
    #[must_use]
    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Attempts to construct an [`Address`] by copying a byte-slice whose
    /// length is presumptively 32.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::WrongWidth`] if `bytes.len() != 32`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        match <[u8; Self::LENGTH]>::try_from(bytes) {
            Ok(arr) => Ok(Self(arr)),
            Err(_) => Err(AddressError::WrongWidth {
                actual: bytes.len(),
            }),
        }
    }

    /// Parses an address from a hex literal.
    ///
    /// Accepts an optional `0x`/`0X` prefix, mixed case, and up to 64
    /// digits; shorter literals are left-padded with zeros.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NonHex`] on the first character outside
    /// `[0-9a-fA-F]`, or [`AddressError::TooLong`] for literals with
    /// more than 64 digits.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sedum::address::Address;
    /// let a = Address::from_hex("0x2").unwrap();
    /// let b = Address::from_hex(
    ///     "0x0000000000000000000000000000000000000000000000000000000000000002",
    /// )
    /// .unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn from_hex(literal: &str) -> Result<Self, AddressError> {
        let digits = literal
            .strip_prefix("0x")
            .or_else(|| literal.strip_prefix("0X"))
            .unwrap_or(literal);
        if digits.len() > Self::LENGTH * 2 {
            return Err(AddressError::TooLong {
                digits: digits.len(),
            });
        }
        let mut bytes = [0u8; Self::LENGTH];
        // Walk nibbles right-to-left so short literals land in the low bytes.
        let mut nibble_ix = 0usize;
        for c in digits.chars().rev() {
            let val = match c.to_digit(16) {
                Some(v) => v as u8,
                None => return Err(AddressError::NonHex { found: c }),
            };
            let byte = Self::LENGTH - 1 - nibble_ix / 2;
            if nibble_ix % 2 == 0 {
                bytes[byte] = val;
            } else {
                bytes[byte] |= val << 4;
            }
            nibble_ix += 1;
        }
        Ok(Self(bytes))
    }

    /// Returns the raw bytes of this address.
    #[inline(always)]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Unwraps the byte array held within this address.
    #[inline(always)]
    #[must_use]
    pub const fn into_bytes(self) -> [u8; Self::LENGTH] {
        self.0
    }

    /// Formats this address in its canonical form: `0x` followed by 64
    /// lowercase hex digits with leading zeros preserved.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::with_capacity(2 + Self::LENGTH * 2);
        out.push_str("0x");
        for byte in &self.0 {
            match write!(&mut out, "{byte:02x}") {
                Ok(()) => (),
                Err(_) => unreachable!("write to String should never fail"),
            }
        }
        out
    }

    /// Formats this address in short form, with leading zeros stripped,
    /// as used inside canonical type names.
    #[must_use]
    pub fn to_short_string(&self) -> String {
        crate::typename::canonicalize(&self.to_canonical_string())
    }
}

impl From<[u8; Address::LENGTH]> for Address {
    fn from(bytes: [u8; Address::LENGTH]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_canonical_string())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let literal = String::deserialize(deserializer)?;
        Self::from_hex(&literal).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonical_form_is_full_width() {
        let addr = Address::from_hex("0x2").unwrap();
        assert_eq!(
            addr.to_canonical_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
        assert_eq!(addr.to_short_string(), "0x2");
    }

    #[test]
    fn parse_is_case_and_prefix_insensitive() {
        let bare = Address::from_hex("DEADBEEF").unwrap();
        let prefixed = Address::from_hex("0xdeadbeef").unwrap();
        assert_eq!(bare, prefixed);
        assert!(prefixed.to_canonical_string().ends_with("deadbeef"));
    }

    #[test]
    fn parse_rejects_bad_literals() {
        assert_eq!(
            Address::from_hex("0xzz"),
            Err(AddressError::NonHex { found: 'z' })
        );
        let too_long = "1".repeat(65);
        assert_eq!(
            Address::from_hex(&too_long),
            Err(AddressError::TooLong { digits: 65 })
        );
    }

    #[test]
    fn odd_digit_counts_left_pad() {
        let addr = Address::from_hex("0x123").unwrap();
        assert!(addr.to_canonical_string().ends_with("0123"));
    }

    #[test]
    fn byte_roundtrip() {
        let addr = Address::new([0x01; 32]);
        assert_eq!(Address::from_bytes(addr.as_bytes()), Ok(addr));
        assert_eq!(
            Address::from_bytes(&[0u8; 31]),
            Err(AddressError::WrongWidth { actual: 31 })
        );
    }
}
