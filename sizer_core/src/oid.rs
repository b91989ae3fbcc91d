//! Object identifiers.

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Object ID size in bytes (SHA-1 width).
pub const OID_SIZE: usize = 20;

/// A 20-byte object identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid([u8; OID_SIZE]);

impl Oid {
    /// Create an Oid from raw bytes.
    pub fn from_bytes(bytes: [u8; OID_SIZE]) -> Self {
        Oid(bytes)
    }

    /// Create an Oid from a slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; OID_SIZE] = bytes.try_into().map_err(|_| {
            Error::invalid_oid(format!(
                "Expected {} bytes, got {}",
                OID_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Oid(bytes))
    }

    /// Create an Oid from a hex string (40 hex characters).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != OID_SIZE * 2 {
            return Err(Error::invalid_oid(format!(
                "Expected {} hex characters, got {}",
                OID_SIZE * 2,
                hex_str.len()
            )));
        }

        let mut oid = [0u8; OID_SIZE];
        hex::decode_to_slice(hex_str, &mut oid)
            .map_err(|e| Error::invalid_oid(format!("Invalid hex: {}", e)))?;
        Ok(Oid(oid))
    }

    /// Convert to lowercase hex string (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; OID_SIZE] {
        &self.0
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Oid::from_hex(s)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.to_hex())
    }
}

impl Serialize for Oid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
