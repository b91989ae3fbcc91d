//! Tree payload decoding.
//!
//! A tree payload is a concatenation of entries with no separator:
//!
//! ```text
//! <octal-mode> SP <name> NUL <20-byte oid>
//! ```
//!
//! Decoding is a forward-only scan. [`TreeEntries`] borrows the payload and
//! yields one entry at a time; it is fused after the first error.

use crate::error::{Error, Result};
use crate::oid::{OID_SIZE, Oid};

/// File mode (packed type and permission bits).
pub type FileMode = u32;

/// Common file modes.
pub mod file_modes {
    use super::FileMode;

    /// Mask selecting the type bits of a mode.
    pub const TYPE_MASK: FileMode = 0o170000;

    /// Regular file (non-executable).
    pub const REGULAR: FileMode = 0o100644;

    /// Executable file.
    pub const EXECUTABLE: FileMode = 0o100755;

    /// Subtree.
    pub const DIRECTORY: FileMode = 0o040000;

    /// Symbolic link.
    pub const SYMLINK: FileMode = 0o120000;

    /// Submodule (commit in a foreign store).
    pub const SUBMODULE: FileMode = 0o160000;
}

/// Classification of a tree entry, derived from its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A subtree.
    Tree,
    /// A submodule reference.
    Submodule,
    /// A symbolic link.
    Symlink,
    /// Anything else: regular and executable files.
    Blob,
}

impl EntryKind {
    /// Classify a mode by its type bits.
    pub fn from_mode(mode: FileMode) -> Self {
        match mode & file_modes::TYPE_MASK {
            file_modes::DIRECTORY => EntryKind::Tree,
            file_modes::SUBMODULE => EntryKind::Submodule,
            file_modes::SYMLINK => EntryKind::Symlink,
            _ => EntryKind::Blob,
        }
    }
}

/// An entry in a tree, borrowing its name from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry<'a> {
    /// Entry name (raw bytes, no NUL).
    pub name: &'a [u8],
    /// Packed file mode.
    pub mode: FileMode,
    /// Object the entry refers to.
    pub oid: Oid,
}

impl TreeEntry<'_> {
    /// Classify this entry.
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_mode(self.mode)
    }

    /// Append the encoded entry to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(format!("{:o}", self.mode).as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.name);
        buf.push(0);
        buf.extend_from_slice(self.oid.as_bytes());
    }
}

/// Encode a list of tree entries, in the order given.
pub fn encode_tree(entries: &[TreeEntry<'_>]) -> Vec<u8> {
    let mut buf = Vec::new();
    for entry in entries {
        entry.encode(&mut buf);
    }
    buf
}

/// The raw payload of a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    data: Vec<u8>,
}

impl Tree {
    /// Wrap a raw tree payload.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get the raw payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Start a fresh scan over the entries.
    pub fn entries(&self) -> TreeEntries<'_> {
        TreeEntries {
            data: &self.data,
            failed: false,
        }
    }
}

/// Iterator over the entries of a [`Tree`].
#[derive(Debug, Clone)]
pub struct TreeEntries<'a> {
    // The as-yet-unread part of the payload.
    data: &'a [u8],
    failed: bool,
}

impl<'a> TreeEntries<'a> {
    fn next_entry(&mut self) -> Result<TreeEntry<'a>> {
        let data = self.data;

        let sp_at = data
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::invalid_tree_entry("Failed to find SP after mode"))?;
        let mode = parse_octal_mode(&data[..sp_at])?;

        let rest = &data[sp_at + 1..];
        let nul_at = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::invalid_tree_entry("Failed to find NUL after name"))?;
        let name = &rest[..nul_at];

        let rest = &rest[nul_at + 1..];
        if rest.len() < OID_SIZE {
            return Err(Error::invalid_tree_entry(format!(
                "Tree entry ends unexpectedly: {} of {} object ID bytes",
                rest.len(),
                OID_SIZE
            )));
        }
        let oid = Oid::from_slice(&rest[..OID_SIZE])?;

        self.data = &rest[OID_SIZE..];
        Ok(TreeEntry { name, mode, oid })
    }
}

impl<'a> Iterator for TreeEntries<'a> {
    type Item = Result<TreeEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.data.is_empty() {
            return None;
        }
        let entry = self.next_entry();
        if entry.is_err() {
            self.failed = true;
        }
        Some(entry)
    }
}

impl std::iter::FusedIterator for TreeEntries<'_> {}

/// Parse ASCII octal mode digits.
fn parse_octal_mode(bytes: &[u8]) -> Result<FileMode> {
    // Seven octal digits still fit in a u32.
    if bytes.is_empty() || bytes.len() > 7 {
        return Err(Error::invalid_tree_entry(format!(
            "Invalid mode length: {} bytes",
            bytes.len()
        )));
    }

    let mut mode: FileMode = 0;
    for &b in bytes {
        let digit = b.wrapping_sub(b'0');
        if digit > 7 {
            return Err(Error::invalid_tree_entry(format!(
                "Invalid mode {:?}",
                String::from_utf8_lossy(bytes)
            )));
        }
        mode = (mode << 3) | FileMode::from(digit);
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(mode: &str, name: &str, oid: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        out.extend_from_slice(oid);
        out
    }

    #[test]
    fn test_decode_single_entry() {
        let tree = Tree::from_bytes(make_entry("100644", "file.txt", &[0x11; 20]));
        let entries: Vec<_> = tree.entries().collect::<Result<_>>().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, b"file.txt");
        assert_eq!(entries[0].mode, file_modes::REGULAR);
        assert_eq!(entries[0].oid, Oid::from_bytes([0x11; 20]));
        assert_eq!(entries[0].kind(), EntryKind::Blob);
    }

    #[test]
    fn test_decode_preserves_order() {
        let mut data = make_entry("40000", "zdir", &[1; 20]);
        data.extend(make_entry("120000", "link", &[2; 20]));
        data.extend(make_entry("160000", "sub", &[3; 20]));
        data.extend(make_entry("100755", "run.sh", &[4; 20]));
        let tree = Tree::from_bytes(data);

        let kinds: Vec<_> = tree.entries().map(|e| e.unwrap().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Tree,
                EntryKind::Symlink,
                EntryKind::Submodule,
                EntryKind::Blob
            ]
        );
    }

    #[test]
    fn test_empty_tree() {
        let tree = Tree::from_bytes(Vec::new());
        assert_eq!(tree.entries().count(), 0);
    }

    #[test]
    fn test_classify_non_canonical_modes() {
        assert_eq!(EntryKind::from_mode(0o100664), EntryKind::Blob);
        assert_eq!(EntryKind::from_mode(0o040755), EntryKind::Tree);
        assert_eq!(EntryKind::from_mode(0), EntryKind::Blob);
    }

    #[test]
    fn test_missing_space() {
        let tree = Tree::from_bytes(b"100644".to_vec());
        let mut entries = tree.entries();
        assert!(matches!(
            entries.next(),
            Some(Err(Error::InvalidTreeEntry { .. }))
        ));
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_missing_nul() {
        let tree = Tree::from_bytes(b"100644 name-without-terminator".to_vec());
        assert!(tree.entries().next().unwrap().is_err());
    }

    #[test]
    fn test_truncated_oid() {
        let mut data = make_entry("100644", "a", &[9; 20]);
        data.extend(make_entry("100644", "b", &[9; 12]));
        let tree = Tree::from_bytes(data);

        let mut entries = tree.entries();
        assert!(entries.next().unwrap().is_ok());
        assert!(matches!(
            entries.next(),
            Some(Err(Error::InvalidTreeEntry { .. }))
        ));
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_non_octal_mode() {
        let tree = Tree::from_bytes(make_entry("100844", "a", &[0; 20]));
        assert!(tree.entries().next().unwrap().is_err());

        let tree = Tree::from_bytes(make_entry("", "a", &[0; 20]));
        assert!(tree.entries().next().unwrap().is_err());
    }

    #[test]
    fn test_encode_matches_store_format() {
        let oid = Oid::from_bytes([5; 20]);
        let encoded = encode_tree(&[TreeEntry {
            name: b"dir",
            mode: file_modes::DIRECTORY,
            oid,
        }]);
        assert_eq!(encoded, make_entry("40000", "dir", &[5; 20]));
    }

    #[test]
    fn test_entries_restartable_from_tree() {
        let tree = Tree::from_bytes(make_entry("100644", "x", &[1; 20]));
        assert_eq!(tree.entries().count(), 1);
        assert_eq!(tree.entries().count(), 1);
    }

    // Property-based tests
    use proptest::prelude::*;

    fn arb_entry() -> impl Strategy<Value = (FileMode, Vec<u8>, [u8; 20])> {
        (
            prop::sample::select(vec![
                file_modes::REGULAR,
                file_modes::EXECUTABLE,
                file_modes::DIRECTORY,
                file_modes::SYMLINK,
                file_modes::SUBMODULE,
            ]),
            prop::collection::vec(1u8..=255, 1..64),
            prop::array::uniform20(any::<u8>()),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Decoding yields exactly the entries that were encoded, in order
        #[test]
        fn prop_decode_encoded_entries(raw in prop::collection::vec(arb_entry(), 0..20)) {
            let entries: Vec<TreeEntry<'_>> = raw
                .iter()
                .map(|(mode, name, oid)| TreeEntry {
                    name,
                    mode: *mode,
                    oid: Oid::from_bytes(*oid),
                })
                .collect();
            let tree = Tree::from_bytes(encode_tree(&entries));
            let decoded: Vec<_> = tree.entries().collect::<Result<_>>()?;
            prop_assert_eq!(decoded, entries);
        }

        /// Chopping bytes off the end of a non-empty payload is always detected
        #[test]
        fn prop_truncation_detected(
            raw in prop::collection::vec(arb_entry(), 1..5),
            cut in 1usize..21,
        ) {
            let entries: Vec<TreeEntry<'_>> = raw
                .iter()
                .map(|(mode, name, oid)| TreeEntry {
                    name,
                    mode: *mode,
                    oid: Oid::from_bytes(*oid),
                })
                .collect();
            let mut data = encode_tree(&entries);
            data.truncate(data.len() - cut);
            let tree = Tree::from_bytes(data);
            prop_assert!(tree.entries().any(|e| e.is_err()));
        }
    }
}
