//! The VFS handle: root ownership plus the coarse mutex that serialises
//! concurrent cursor-producing operations (§4.7).

use std::rc::{Rc, Weak};
use std::sync::Mutex;

use tracing::debug;

use super::{Access, NodeRef, new_directory};
use crate::error::{Error, Result};

/// Interior state guarded by the handle's coarse lock.
pub struct VfsHandleInner {
    lock: Mutex<()>,
    root: NodeRef,
}

/// Multiplexes access to one VFS tree. Cheap to clone (an `Rc` around the
/// shared inner state); every clone shares the same root and lock.
#[derive(Clone)]
pub struct VfsHandle {
    inner: Rc<VfsHandleInner>,
}

impl VfsHandle {
    /// Build a fresh handle with an empty root directory.
    pub fn new() -> Self {
        let root = new_directory("/", 0, Access::READ_WRITE);
        let inner = Rc::new(VfsHandleInner { lock: Mutex::new(()), root });
        super::enter(&inner.root, Rc::downgrade(&inner), None);
        VfsHandle { inner }
    }

    /// A cursor to the root directory. Acquires and releases the coarse
    /// lock for the duration of the call (§4.7). A poisoned lock (a prior
    /// panic while held) surfaces as `Error::Busy` rather than being
    /// silently recovered from.
    pub fn root(&self) -> Result<NodeRef> {
        let _guard = self.lock_checked()?;
        Ok(self.inner.root.clone())
    }

    /// No-op for the in-memory core; mount-points forward `sync` to their
    /// foreign handles independently when asked.
    pub fn sync(&self) -> Result<()> {
        let _guard = self.lock_checked()?;
        Ok(())
    }

    fn lock_checked(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        match self.inner.lock.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => {
                debug!("VFS handle lock poisoned");
                Err(Error::Busy)
            }
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<VfsHandleInner> {
        Rc::downgrade(&self.inner)
    }
}

impl Default for VfsHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{Descriptor, create, head, name_of};

    #[test]
    fn root_is_stable_across_calls() {
        let handle = VfsHandle::new();
        let a = handle.root().unwrap();
        let b = handle.root().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn sync_is_always_ok() {
        let handle = VfsHandle::new();
        assert_eq!(handle.sync(), Ok(()));
    }

    #[test]
    fn root_directory_accepts_children() {
        let handle = VfsHandle::new();
        let root = handle.root().unwrap();
        create(&root, vec![Descriptor::Name("bin".into())]).unwrap();
        let child = head(&root).unwrap();
        assert_eq!(name_of(&child), "bin");
    }
}
