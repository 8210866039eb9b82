//! The foreign filesystem handle a mount-point delegates to (§3, §4.6).
//!
//! The concrete FAT32 handle used behind real mount-points is explicitly
//! out of scope (§1); this module specifies the trait a mount-point node
//! drives and a small in-memory double good enough to exercise the
//! mount/unmount round-trip end to end.

use super::{Descriptor, NodeRef};
use crate::error::{Error, Result};

/// A filesystem handle opened on some foreign transport and attached at a
/// mount-point. Only the operations a mount-point node forwards (§4.6) are
/// part of the contract; everything else is the base node's default
/// behaviour.
pub trait ForeignFs {
    fn root(&self) -> Option<NodeRef>;
    fn next(&self, current: &NodeRef) -> Option<NodeRef>;
    fn create(&self, descriptors: Vec<Descriptor>) -> Result<()>;
    fn remove(&self, child: &NodeRef) -> Result<()>;

    fn data_length(&self) -> Result<u64> {
        Err(Error::Invalid)
    }

    fn read_data(&self, _offset: u64, _buf: &mut [u8]) -> Result<usize> {
        Err(Error::Invalid)
    }

    fn write_data(&self, _offset: u64, _buf: &[u8]) -> Result<usize> {
        Err(Error::Invalid)
    }
}

/// An in-memory foreign handle: just another VFS subtree, standing in for
/// whatever real filesystem (FAT32, say) formatted a block device. Good
/// enough to test the mount/unmount contract without a concrete driver.
pub struct MemoryForeignFs {
    root: NodeRef,
}

impl MemoryForeignFs {
    pub fn new() -> Self {
        MemoryForeignFs { root: super::new_directory("/", 0, super::Access::READ_WRITE) }
    }
}

impl Default for MemoryForeignFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ForeignFs for MemoryForeignFs {
    fn root(&self) -> Option<NodeRef> {
        super::head(&self.root)
    }

    fn next(&self, current: &NodeRef) -> Option<NodeRef> {
        super::fetch(&self.root, current)
    }

    fn create(&self, descriptors: Vec<Descriptor>) -> Result<()> {
        super::create(&self.root, descriptors)
    }

    fn remove(&self, child: &NodeRef) -> Result<()> {
        super::remove(&self.root, child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{Descriptor, head, name_of, new_mount};

    // ============ Mount round-trip ============

    #[test]
    fn mount_write_then_list_shows_entry() {
        let foreign = MemoryForeignFs::new();
        let mount = new_mount("mnt", 0, Box::new(foreign));

        super::super::create(
            &mount,
            vec![Descriptor::Name("f".into()), Descriptor::Data(b"hi".to_vec())],
        )
        .unwrap();

        let entry = head(&mount).unwrap();
        assert_eq!(name_of(&entry), "f");
    }

    #[test]
    fn mount_remove_leaves_directory_empty() {
        let foreign = MemoryForeignFs::new();
        let mount = new_mount("mnt", 0, Box::new(foreign));
        super::super::create(&mount, vec![Descriptor::Name("f".into())]).unwrap();
        let entry = head(&mount).unwrap();

        super::super::remove(&mount, &entry).unwrap();
        assert!(head(&mount).is_none());
    }

    #[test]
    fn mount_data_field_is_invalid_like_base_node() {
        let foreign = MemoryForeignFs::new();
        let mount = new_mount("mnt", 0, Box::new(foreign));
        assert_eq!(
            super::super::length(&mount, super::super::Field::Data).unwrap_err(),
            Error::Invalid
        );
    }
}
