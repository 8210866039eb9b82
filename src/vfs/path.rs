//! Path joining and node resolution helpers used by the evaluator, the
//! shell's `cd`/`ls`/etc., and the terminal proxy's redirection wiring.

use super::{Access, Descriptor, NodeRef, create, fetch, head, name_of};
use crate::error::{Error, Result};

/// Join `base` (an absolute path) with `path`, resolving `.` and `..`
/// components. If `path` is itself absolute, `base` is ignored (§8).
pub fn join(base: &str, path: &str) -> String {
    let mut components: Vec<&str> = if path.starts_with('/') {
        Vec::new()
    } else {
        base.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment {
            "." => {}
            ".." => {
                components.pop();
            }
            other => components.push(other),
        }
    }

    format!("/{}", components.join("/"))
}

/// Final path component, e.g. `extract_name("/a/b/c") == "c"`.
pub fn extract_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("")
}

/// Resolve an absolute path to its node, walking from `root` one directory
/// enumeration at a time (first-match-by-name within a container, §3).
pub fn open_node(root: &NodeRef, path: &str) -> Result<NodeRef> {
    let mut current = root.clone();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let mut cursor = head(&current);
        let mut found = None;
        while let Some(node) = cursor {
            if name_of(&node) == segment {
                found = Some(node);
                break;
            }
            cursor = fetch(&current, &node);
        }
        current = found.ok_or(Error::Entry)?;
    }
    Ok(current)
}

/// Resolve the parent directory of `path`, returning it alongside the
/// final component's name. Used by commands that need to `create`/`remove`
/// an entry by name within its parent.
pub fn open_base_node<'a>(root: &NodeRef, path: &'a str) -> Result<(NodeRef, &'a str)> {
    let name = extract_name(path);
    let parent_path = &path[..path.len() - name.len()];
    let parent = open_node(root, parent_path)?;
    Ok((parent, name))
}

/// Open (or create) a data-buffer node at `path` for reading redirection
/// input (`<`). Fails `Entry` if the path does not exist.
pub fn open_source(root: &NodeRef, path: &str) -> Result<NodeRef> {
    open_node(root, path)
}

/// Open (or create) a data-buffer node at `path` for writing redirection
/// output (`>`/`>>`). Creates the node if absent; truncates existing
/// content unless `append` is set (the caller tracks the starting offset).
pub fn open_sink(root: &NodeRef, path: &str, append: bool) -> Result<NodeRef> {
    match open_node(root, path) {
        Ok(node) => {
            if !append {
                let mut data = node.borrow_mut();
                if let super::NodeKind::DataBuffer { length, .. } = &mut data.kind {
                    *length = 0;
                }
            }
            Ok(node)
        }
        Err(Error::Entry) => {
            let (parent, name) = open_base_node(root, path)?;
            create(
                &parent,
                vec![Descriptor::Name(name.to_string()), Descriptor::Data(Vec::new())],
            )?;
            open_node(root, path)
        }
        Err(other) => Err(other),
    }
}

/// Build the descriptor vector for creating a fresh directory at `name`
/// with default timestamp/access — shared by `mkdir` and the initializer.
pub fn directory_descriptors(name: &str) -> Vec<Descriptor> {
    vec![Descriptor::Name(name.to_string()), Descriptor::Access(Access::READ_WRITE)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::VfsHandle;

    // ============ Path join ============

    #[test]
    fn join_relative_appends() {
        assert_eq!(join("/a/b", "c"), "/a/b/c");
    }

    #[test]
    fn join_absolute_replaces() {
        assert_eq!(join("/a/b", "/c"), "/c");
    }

    #[test]
    fn join_dotdot_pops_last_segment() {
        assert_eq!(join("/a/b", ".."), "/a");
    }

    #[test]
    fn join_root_with_dotdot_stays_root() {
        assert_eq!(join("/", ".."), "/");
    }

    #[test]
    fn extract_name_takes_final_segment() {
        assert_eq!(extract_name("/a/b/c"), "c");
        assert_eq!(extract_name("/a/"), "a");
    }

    // ============ Node resolution ============

    #[test]
    fn open_node_walks_nested_directories() {
        let handle = VfsHandle::new();
        let root = handle.root().unwrap();
        create(&root, directory_descriptors("a")).unwrap();
        let a = open_node(&root, "/a").unwrap();
        create(&a, directory_descriptors("b")).unwrap();

        let b = open_node(&root, "/a/b").unwrap();
        assert_eq!(name_of(&b), "b");
    }

    #[test]
    fn open_node_missing_is_entry_error() {
        let handle = VfsHandle::new();
        let root = handle.root().unwrap();
        assert_eq!(open_node(&root, "/missing").unwrap_err(), Error::Entry);
    }

    #[test]
    fn open_sink_creates_then_reuses_node() {
        let handle = VfsHandle::new();
        let root = handle.root().unwrap();
        let node = open_sink(&root, "/out", false).unwrap();
        super::super::write(&node, super::super::Field::Data, 0, b"hi").unwrap();

        let again = open_sink(&root, "/out", true).unwrap();
        assert_eq!(super::super::length(&again, super::super::Field::Data).unwrap(), 2);
    }
}
