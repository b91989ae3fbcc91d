//! Object types and store response headers.
//!
//! Every request on a store channel is answered by a single header line:
//!
//! ```text
//! <hex-oid> SP <type> SP <decimal-size> LF
//! <hex-oid> SP missing LF
//! ```
//!
//! On the payload channel a found object's header is followed by exactly
//! `<decimal-size>` payload bytes and one LF.

use crate::count::Count;
use crate::error::{Error, Result};
use crate::oid::Oid;
use std::fmt;

/// Object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// A blob (file content).
    Blob,
    /// A tree (directory listing).
    Tree,
    /// A commit.
    Commit,
    /// An annotated tag.
    Tag,
    /// Sentinel for an object the store does not have.
    Missing,
}

impl ObjectType {
    /// Get the string name of this object type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
            ObjectType::Missing => "missing",
        }
    }

    /// Parse from the store's type name.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            "missing" => Ok(ObjectType::Missing),
            _ => Err(Error::protocol(format!("Unknown object type: {:?}", s))),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed response header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchResponse {
    /// The object exists.
    Found {
        oid: Oid,
        object_type: ObjectType,
        size: Count,
    },
    /// The store has no such object.
    Missing { oid: Oid },
}

impl BatchResponse {
    /// Parse a header line. A single trailing LF is tolerated.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let mut words = line.split(' ');

        let oid_word = words.next().unwrap_or("");
        let oid = Oid::from_hex(oid_word)
            .map_err(|e| Error::protocol(format!("Bad object ID in {:?}: {}", line, e)))?;

        let type_word = words
            .next()
            .ok_or_else(|| Error::protocol(format!("Missing object type in {:?}", line)))?;
        let object_type = ObjectType::parse(type_word)?;

        if object_type == ObjectType::Missing {
            if words.next().is_some() {
                return Err(Error::protocol(format!("Trailing data in {:?}", line)));
            }
            return Ok(BatchResponse::Missing { oid });
        }

        let size_word = words
            .next()
            .ok_or_else(|| Error::protocol(format!("Missing object size in {:?}", line)))?;
        let size: u64 = size_word
            .parse()
            .map_err(|e| Error::protocol(format!("Bad object size {:?}: {}", size_word, e)))?;

        if words.next().is_some() {
            return Err(Error::protocol(format!("Trailing data in {:?}", line)));
        }

        Ok(BatchResponse::Found {
            oid,
            object_type,
            size: Count::new(size),
        })
    }

    /// The object ID the store echoed back.
    pub fn oid(&self) -> Oid {
        match self {
            BatchResponse::Found { oid, .. } | BatchResponse::Missing { oid } => *oid,
        }
    }
}
