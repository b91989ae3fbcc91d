//! Size records for blobs and trees.

use crate::count::Count;
use crate::object::ObjectType;
use serde::Serialize;
use std::fmt;

/// The size of a blob, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BlobSize(pub Count);

impl fmt::Display for BlobSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob_size={}", self.0)
    }
}

/// Recursive statistics for one tree.
///
/// Depth and path length are maxima over every lineage below the tree.
/// Everything else is a saturating sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TreeSize {
    /// The maximum depth of items starting at this tree (including the
    /// tree itself).
    pub max_depth: Count,

    /// The maximum length of any path relative to this tree.
    pub max_path_length: Count,

    /// The total number of trees, including this one.
    pub tree_count: Count,

    /// The maximum number of entries in any single tree.
    pub max_tree_entries: Count,

    /// The total number of blobs.
    pub blob_count: Count,

    /// The total size of all blobs.
    pub blob_size: Count,

    /// The total number of symbolic links.
    pub link_count: Count,

    /// The total number of submodules referenced.
    pub submodule_count: Count,
}

impl Default for TreeSize {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSize {
    /// An empty, unfinished record that counts only the tree itself.
    pub fn new() -> Self {
        Self {
            max_depth: Count::ZERO,
            max_path_length: Count::ZERO,
            tree_count: Count::new(1),
            max_tree_entries: Count::ZERO,
            blob_count: Count::ZERO,
            blob_size: Count::ZERO,
            link_count: Count::ZERO,
            submodule_count: Count::ZERO,
        }
    }

    fn record_depth(&mut self, depth: Count) {
        self.max_depth = self.max_depth.max(depth);
    }

    fn record_path_length(&mut self, length: Count) {
        self.max_path_length = self.max_path_length.max(length);
    }

    fn record_leaf(&mut self, name: &[u8]) {
        self.record_depth(Count::new(1));
        self.record_path_length(Count::from(name.len()));
    }

    /// Record a blob of the given size as a direct entry.
    pub fn add_blob(&mut self, name: &[u8], size: BlobSize) {
        self.record_leaf(name);
        self.blob_count = self.blob_count.increment();
        self.blob_size += size.0;
    }

    /// Record a symbolic link as a direct entry.
    pub fn add_link(&mut self, name: &[u8]) {
        self.record_leaf(name);
        self.link_count = self.link_count.increment();
    }

    /// Record a submodule as a direct entry.
    pub fn add_submodule(&mut self, name: &[u8]) {
        self.record_leaf(name);
        self.submodule_count = self.submodule_count.increment();
    }

    /// Fold a finished subtree record in under `name`.
    pub fn add_descendant(&mut self, name: &[u8], child: &TreeSize) {
        self.record_depth(child.max_depth);
        let name_len = Count::from(name.len());
        if child.max_path_length > Count::ZERO {
            self.record_path_length(name_len.increment() + child.max_path_length);
        } else {
            // An empty subtree contributes no separator.
            self.record_path_length(name_len);
        }
        self.tree_count += child.tree_count;
        self.max_tree_entries = self.max_tree_entries.max(child.max_tree_entries);
        self.blob_count += child.blob_count;
        self.blob_size += child.blob_size;
        self.link_count += child.link_count;
        self.submodule_count += child.submodule_count;
    }

    /// Account for the tree's own level once all `entry_count` direct
    /// entries have been folded in. Call exactly once.
    pub fn finish(mut self, entry_count: Count) -> Self {
        self.max_depth = self.max_depth.increment();
        self.max_tree_entries = self.max_tree_entries.max(entry_count);
        self
    }
}

impl fmt::Display for TreeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_depth={}, max_path_length={}, tree_count={}, max_tree_entries={}, blob_count={}, blob_size={}, link_count={}, submodule_count={}",
            self.max_depth,
            self.max_path_length,
            self.tree_count,
            self.max_tree_entries,
            self.blob_count,
            self.blob_size,
            self.link_count,
            self.submodule_count,
        )
    }
}

/// The size of an object, by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectSize {
    Blob { size: BlobSize },
    Tree(TreeSize),
}

impl ObjectSize {
    /// The type of object this size describes.
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectSize::Blob { .. } => ObjectType::Blob,
            ObjectSize::Tree(_) => ObjectType::Tree,
        }
    }
}

impl fmt::Display for ObjectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectSize::Blob { size } => fmt::Display::fmt(size, f),
            ObjectSize::Tree(size) => fmt::Display::fmt(size, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(n: u64) -> BlobSize {
        BlobSize(Count::new(n))
    }

    #[test]
    fn test_empty_tree_depth_is_one() {
        let size = TreeSize::new().finish(Count::ZERO);
        assert_eq!(size.max_depth, Count::new(1));
        assert_eq!(size.max_path_length, Count::ZERO);
        assert_eq!(size.tree_count, Count::new(1));
        assert_eq!(size.max_tree_entries, Count::ZERO);
    }

    #[test]
    fn test_leaf_only_tree_depth_is_two() {
        let mut size = TreeSize::new();
        size.add_blob(b"x", blob(3));
        size.add_link(b"link");
        size.add_submodule(b"sub");
        let size = size.finish(Count::new(3));

        assert_eq!(size.max_depth, Count::new(2));
        assert_eq!(size.max_path_length, Count::new(4));
        assert_eq!(size.blob_count, Count::new(1));
        assert_eq!(size.blob_size, Count::new(3));
        assert_eq!(size.link_count, Count::new(1));
        assert_eq!(size.submodule_count, Count::new(1));
        assert_eq!(size.max_tree_entries, Count::new(3));
    }

    #[test]
    fn test_single_blob_path_length() {
        let mut size = TreeSize::new();
        size.add_blob(b"x", blob(0));
        assert_eq!(size.finish(Count::new(1)).max_path_length, Count::new(1));
    }

    #[test]
    fn test_subtree_path_length_adds_separator() {
        let mut child = TreeSize::new();
        child.add_blob(b"abc", blob(1));
        let child = child.finish(Count::new(1));
        assert_eq!(child.max_path_length, Count::new(3));

        let mut parent = TreeSize::new();
        parent.add_descendant(b"a", &child);
        let parent = parent.finish(Count::new(1));
        assert_eq!(parent.max_path_length, Count::new(5));
        assert_eq!(parent.max_depth, Count::new(3));
    }

    #[test]
    fn test_empty_subtree_adds_no_separator() {
        let empty = TreeSize::new().finish(Count::ZERO);

        let mut parent = TreeSize::new();
        parent.add_blob(b"f", blob(10));
        parent.add_descendant(b"d", &empty);
        let parent = parent.finish(Count::new(2));

        assert_eq!(parent.blob_count, Count::new(1));
        assert_eq!(parent.blob_size, Count::new(10));
        assert_eq!(parent.tree_count, Count::new(2));
        assert_eq!(parent.max_depth, Count::new(2));
        assert_eq!(parent.max_path_length, Count::new(1));
    }

    #[test]
    fn test_child_depth_plus_one() {
        let mut child = TreeSize::new().finish(Count::ZERO);
        child.max_depth = Count::new(7);

        let mut parent = TreeSize::new();
        parent.add_descendant(b"c", &child);
        assert_eq!(parent.finish(Count::new(1)).max_depth, Count::new(8));
    }

    #[test]
    fn test_max_tree_entries_takes_widest() {
        let mut child = TreeSize::new().finish(Count::new(50));
        child.max_path_length = Count::new(1);

        let mut parent = TreeSize::new();
        parent.add_descendant(b"c", &child);
        assert_eq!(
            parent.finish(Count::new(2)).max_tree_entries,
            Count::new(50)
        );
    }

    #[test]
    fn test_blob_size_saturates() {
        let mut size = TreeSize::new();
        size.add_blob(b"a", blob(u64::MAX - 1));
        size.add_blob(b"b", blob(5));
        assert_eq!(size.blob_size, Count::MAX);
        assert_eq!(size.blob_count, Count::new(2));
    }

    #[test]
    fn test_descendant_sums_saturate() {
        let mut child = TreeSize::new().finish(Count::ZERO);
        child.tree_count = Count::MAX;
        child.blob_size = Count::MAX;
        child.max_depth = Count::MAX;
        child.max_path_length = Count::MAX;

        let mut parent = TreeSize::new();
        parent.add_descendant(b"big", &child);
        let parent = parent.finish(Count::new(1));

        assert_eq!(parent.tree_count, Count::MAX);
        assert_eq!(parent.blob_size, Count::MAX);
        assert_eq!(parent.max_depth, Count::MAX);
        assert_eq!(parent.max_path_length, Count::MAX);
    }

    #[test]
    fn test_display() {
        let size = TreeSize::new().finish(Count::ZERO);
        assert_eq!(
            size.to_string(),
            "max_depth=1, max_path_length=0, tree_count=1, max_tree_entries=0, blob_count=0, blob_size=0, link_count=0, submodule_count=0"
        );
        assert_eq!(blob(12).to_string(), "blob_size=12");
    }

    #[test]
    fn test_object_size_json() {
        let json = serde_json::to_value(ObjectSize::Blob { size: blob(9) }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "blob", "size": 9}));

        let tree = ObjectSize::Tree(TreeSize::new().finish(Count::ZERO));
        assert_eq!(tree.object_type(), ObjectType::Tree);
        let json = serde_json::to_value(tree).unwrap();
        assert_eq!(json["type"], "tree");
        assert_eq!(json["max_depth"], 1);
    }

    // Property-based tests
    use proptest::prelude::*;

    fn arb_tree_size() -> impl Strategy<Value = TreeSize> {
        prop::array::uniform8(0u64..1_000_000).prop_map(|v| TreeSize {
            max_depth: Count::new(v[0] + 1),
            max_path_length: Count::new(v[1]),
            tree_count: Count::new(v[2] + 1),
            max_tree_entries: Count::new(v[3]),
            blob_count: Count::new(v[4]),
            blob_size: Count::new(v[5]),
            link_count: Count::new(v[6]),
            submodule_count: Count::new(v[7]),
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Counts of a parent are the sums over its children, plus itself for trees
        #[test]
        fn prop_count_conservation(children in prop::collection::vec(arb_tree_size(), 0..10)) {
            let mut parent = TreeSize::new();
            for (i, child) in children.iter().enumerate() {
                parent.add_descendant(format!("d{}", i).as_bytes(), child);
            }
            let parent = parent.finish(Count::from(children.len()));

            let sum = |f: fn(&TreeSize) -> Count| {
                children.iter().fold(Count::ZERO, |acc, c| acc + f(c))
            };
            prop_assert_eq!(parent.tree_count, sum(|c| c.tree_count).increment());
            prop_assert_eq!(parent.blob_count, sum(|c| c.blob_count));
            prop_assert_eq!(parent.blob_size, sum(|c| c.blob_size));
            prop_assert_eq!(parent.link_count, sum(|c| c.link_count));
            prop_assert_eq!(parent.submodule_count, sum(|c| c.submodule_count));

            let deepest = children.iter().map(|c| c.max_depth).max().unwrap_or(Count::ZERO);
            prop_assert_eq!(parent.max_depth, deepest.increment());
        }

        /// Merging never lowers any field
        #[test]
        fn prop_merge_monotonic(a in arb_tree_size(), b in arb_tree_size()) {
            let mut merged = a;
            merged.add_descendant(b"n", &b);
            prop_assert!(merged.max_depth >= a.max_depth);
            prop_assert!(merged.max_path_length >= a.max_path_length);
            prop_assert!(merged.tree_count >= a.tree_count);
            prop_assert!(merged.max_tree_entries >= a.max_tree_entries);
            prop_assert!(merged.blob_size >= a.blob_size);
        }
    }
}
