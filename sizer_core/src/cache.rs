//! Memoized size computation over the object graph.
//!
//! Trees are sized without recursion. [`SizeCache::tree_size`] pushes the
//! requested tree onto a [`WorkStack`] and then repeatedly looks at the top
//! of the stack:
//!
//! - if that tree has been sized in the meantime (it is shared with some
//!   other lineage), it is dropped;
//! - otherwise its entries are scanned. Any subtree whose size is not yet
//!   known is pushed on top, and the tree stays where it is to be retried
//!   once those children are done. If every subtree is known, the tree's
//!   record is finished, memoized and dropped.
//!
//! Each tree record is therefore computed exactly once, children before
//! parents, and stack usage is bounded by the heap rather than the native
//! call stack.

use crate::count::Count;
use crate::error::{Error, Result};
use crate::object::ObjectType;
use crate::oid::Oid;
use crate::size::{BlobSize, ObjectSize, TreeSize};
use crate::store::ObjectStore;
use crate::todo::WorkStack;
use crate::tree::EntryKind;
use std::collections::HashMap;

/// Outcome of one attempt at sizing a tree.
enum Attempt {
    /// Every subtree was known; here is the finished record.
    Done(TreeSize),
    /// Some subtrees were unknown and have been queued.
    Pending,
}

/// Sizes of the blobs and trees looked up so far, plus the machinery to
/// compute new ones.
///
/// The tables only grow: the store is assumed not to change while the cache
/// is alive. One cache must not be shared between concurrent queries; use a
/// separate cache (and store) per thread instead.
#[derive(Debug)]
pub struct SizeCache<S> {
    store: S,

    // The (recursive) sizes of trees computed so far.
    tree_sizes: HashMap<Oid, TreeSize>,

    // The sizes of blobs looked up so far.
    blob_sizes: HashMap<Oid, BlobSize>,

    // Trees whose sizes are being computed. Bounded by the number of
    // unknown subtrees along a single lineage, not by the graph size.
    todo: WorkStack,
}

impl<S: ObjectStore> SizeCache<S> {
    /// Create an empty cache over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            tree_sizes: HashMap::new(),
            blob_sizes: HashMap::new(),
            todo: WorkStack::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Number of memoized tree records.
    pub fn tree_sizes_len(&self) -> usize {
        self.tree_sizes.len()
    }

    /// Number of memoized blob sizes.
    pub fn blob_sizes_len(&self) -> usize {
        self.blob_sizes.len()
    }

    /// Number of trees left on the work stack. Zero between queries.
    pub fn pending(&self) -> usize {
        self.todo.len()
    }

    /// Size any blob or tree.
    ///
    /// Commits and tags are rejected with [`Error::UnexpectedType`].
    pub fn object_size(&mut self, oid: &Oid) -> Result<ObjectSize> {
        let (object_type, size) = self.store.read_header(oid)?;

        match object_type {
            ObjectType::Blob => {
                let size = BlobSize(size);
                self.blob_sizes.insert(*oid, size);
                Ok(ObjectSize::Blob { size })
            }
            ObjectType::Tree => Ok(ObjectSize::Tree(self.tree_size(oid)?)),
            ObjectType::Commit | ObjectType::Tag => {
                Err(Error::unexpected_type(oid, object_type.as_str()))
            }
            ObjectType::Missing => Err(Error::object_not_found(oid)),
        }
    }

    /// Size of a blob, from the cache or a single header query.
    pub fn blob_size(&mut self, oid: &Oid) -> Result<BlobSize> {
        if let Some(&size) = self.blob_sizes.get(oid) {
            return Ok(size);
        }

        let (object_type, size) = self.store.read_header(oid)?;
        if object_type != ObjectType::Blob {
            return Err(Error::type_mismatch(oid, "blob", object_type.as_str()));
        }

        let size = BlobSize(size);
        self.blob_sizes.insert(*oid, size);
        Ok(size)
    }

    /// Recursive size of a tree.
    ///
    /// # Panics
    ///
    /// Panics if the traversal finishes without having sized `oid`, which
    /// would mean the algorithm itself is broken.
    pub fn tree_size(&mut self, oid: &Oid) -> Result<TreeSize> {
        if let Some(&size) = self.tree_sizes.get(oid) {
            return Ok(size);
        }

        self.todo.push(*oid);
        if let Err(err) = self.fill() {
            self.todo.clear();
            return Err(err);
        }

        match self.tree_sizes.get(oid) {
            Some(&size) => Ok(size),
            None => {
                self.todo.dump();
                panic!("work stack drained without sizing tree {}", oid);
            }
        }
    }

    /// Compute the sizes of every tree on the work stack.
    fn fill(&mut self) -> Result<()> {
        while let Some(oid) = self.todo.peek() {
            // Already sized via another path since it was queued.
            if self.tree_sizes.contains_key(&oid) {
                self.todo.drop_top();
                continue;
            }

            match self.queue_tree(&oid)? {
                Attempt::Done(size) => {
                    tracing::debug!(%oid, %size, "sized tree");
                    self.tree_sizes.insert(oid, size);
                    self.todo.drop_top();
                }
                Attempt::Pending => {
                    // Its unknown subtrees are now above it on the stack.
                }
            }
        }
        Ok(())
    }

    /// Size `oid` if all of its subtrees are already known; otherwise queue
    /// the unknown ones. Blobs are always resolved on the spot.
    fn queue_tree(&mut self, oid: &Oid) -> Result<Attempt> {
        let tree = self.store.read_tree(oid)?;

        let mut complete = true;
        let mut entry_count = Count::ZERO;
        let mut size = TreeSize::new();

        for entry in tree.entries() {
            let entry = entry?;
            entry_count = entry_count.increment();

            match entry.kind() {
                EntryKind::Tree => match self.tree_sizes.get(&entry.oid) {
                    Some(subtree) => size.add_descendant(entry.name, subtree),
                    None => {
                        complete = false;
                        self.todo.push(entry.oid);
                    }
                },
                EntryKind::Submodule => {
                    if complete {
                        size.add_submodule(entry.name);
                    }
                }
                EntryKind::Symlink => {
                    if complete {
                        size.add_link(entry.name);
                    }
                }
                EntryKind::Blob => {
                    let blob = self.blob_size(&entry.oid)?;
                    size.add_blob(entry.name, blob);
                }
            }
        }

        if !complete {
            return Ok(Attempt::Pending);
        }
        Ok(Attempt::Done(size.finish(entry_count)))
    }
}
