//! # Sizer Core
//!
//! Structural size statistics for the object graph of a content-addressed
//! store such as a git repository.
//!
//! This library walks trees and reports, for each one, how deep it nests, how
//! long its paths get, and how many trees, blobs, links and submodules it
//! contains, along with the total blob bytes. It is meant to flag
//! pathological repositories before they hurt the tools that use them.
//!
//! ## Features
//!
//! - Talks to an external store over a line-oriented batch protocol
//! - Iterative traversal: no recursion, however deep the trees nest
//! - Every tree is sized once, no matter how many parents share it
//! - Saturating counters that never wrap around
//! - In-memory store for tests and experiments
//!
//! ## Example
//!
//! ```no_run
//! use sizer_core::{Oid, Repository, SizeCache, StoreConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Start the store processes for a repository
//! let repo = Repository::open(StoreConfig::new("./my-repo"))?;
//! let mut cache = SizeCache::new(repo);
//!
//! // Size a tree by its object ID
//! let oid = Oid::from_hex("4b825dc642cb6eb9a060e54bf8d69288fbee4904")?;
//! let size = cache.tree_size(&oid)?;
//! println!("{}", size);
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod count;
mod error;
mod memory;
mod object;
mod oid;
mod repo;
mod size;
mod store;
mod todo;
mod tree;

pub use cache::SizeCache;
pub use config::{GIT_ENV, StoreConfig};
pub use count::Count;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use object::{BatchResponse, ObjectType};
pub use oid::{OID_SIZE, Oid};
pub use repo::Repository;
pub use size::{BlobSize, ObjectSize, TreeSize};
pub use store::{BatchChannel, ObjectStore};
pub use todo::WorkStack;
pub use tree::{EntryKind, FileMode, Tree, TreeEntries, TreeEntry, encode_tree, file_modes};
