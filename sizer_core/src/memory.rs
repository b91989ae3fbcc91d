//! In-memory object store.
//!
//! Objects are addressed by the first 20 bytes of a BLAKE3 digest over
//! their type, size and payload, so identical content always shares an ID.
//! Every query is counted, which lets callers observe cache behaviour.

use crate::count::Count;
use crate::error::{Error, Result};
use crate::object::ObjectType;
use crate::oid::{OID_SIZE, Oid};
use crate::store::ObjectStore;
use crate::tree::{Tree, TreeEntry, encode_tree};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StoredObject {
    object_type: ObjectType,
    size: Count,
    payload: Vec<u8>,
}

/// A store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: HashMap<Oid, StoredObject>,
    header_requests: usize,
    tree_requests: usize,
    tree_reads: HashMap<Oid, usize>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the ID `payload` would be stored under.
    pub fn content_oid(object_type: ObjectType, payload: &[u8]) -> Oid {
        let mut hasher = blake3::Hasher::new();
        hasher.update(object_type.as_str().as_bytes());
        hasher.update(b" ");
        hasher.update(payload.len().to_string().as_bytes());
        hasher.update(&[0]);
        hasher.update(payload);
        let digest = hasher.finalize();

        let mut oid = [0u8; OID_SIZE];
        oid.copy_from_slice(&digest.as_bytes()[..OID_SIZE]);
        Oid::from_bytes(oid)
    }

    /// Store an object under an explicit ID. The declared `size` need not
    /// match the payload; only tree payloads are ever read back.
    pub fn insert(&mut self, oid: Oid, object_type: ObjectType, size: Count, payload: Vec<u8>) {
        self.objects.insert(
            oid,
            StoredObject {
                object_type,
                size,
                payload,
            },
        );
    }

    /// Store a blob and return its ID.
    pub fn add_blob(&mut self, content: &[u8]) -> Oid {
        let oid = Self::content_oid(ObjectType::Blob, content);
        self.insert(
            oid,
            ObjectType::Blob,
            Count::from(content.len()),
            content.to_vec(),
        );
        oid
    }

    /// Store a tree built from `entries` and return its ID.
    pub fn add_tree(&mut self, entries: &[TreeEntry<'_>]) -> Oid {
        self.add_raw_tree(encode_tree(entries))
    }

    /// Store an arbitrary (possibly malformed) tree payload.
    pub fn add_raw_tree(&mut self, payload: Vec<u8>) -> Oid {
        let oid = Self::content_oid(ObjectType::Tree, &payload);
        let size = Count::from(payload.len());
        self.insert(oid, ObjectType::Tree, size, payload);
        oid
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Header queries answered so far.
    pub fn header_requests(&self) -> usize {
        self.header_requests
    }

    /// Tree payload queries answered so far.
    pub fn tree_requests(&self) -> usize {
        self.tree_requests
    }

    /// How many times the payload of `oid` has been requested.
    pub fn tree_reads(&self, oid: &Oid) -> usize {
        self.tree_reads.get(oid).copied().unwrap_or(0)
    }

    /// Total queries of either kind.
    pub fn requests(&self) -> usize {
        self.header_requests + self.tree_requests
    }
}

impl ObjectStore for MemoryStore {
    fn read_header(&mut self, oid: &Oid) -> Result<(ObjectType, Count)> {
        self.header_requests += 1;
        let object = self
            .objects
            .get(oid)
            .ok_or_else(|| Error::object_not_found(oid))?;
        Ok((object.object_type, object.size))
    }

    fn read_tree(&mut self, oid: &Oid) -> Result<Tree> {
        self.tree_requests += 1;
        *self.tree_reads.entry(*oid).or_insert(0) += 1;
        let object = self
            .objects
            .get(oid)
            .ok_or_else(|| Error::object_not_found(oid))?;
        if object.object_type != ObjectType::Tree {
            return Err(Error::type_mismatch(
                oid,
                "tree",
                object.object_type.as_str(),
            ));
        }
        Ok(Tree::from_bytes(object.payload.clone()))
    }
}
