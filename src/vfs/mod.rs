//! The VFS node tree: a uniform field-oriented protocol over directories,
//! data buffers, device-parameter nodes, and mount-points.
//!
//! Nodes are modelled as a tagged union rather than a trait-object
//! hierarchy: one [`NodeData`] struct per node, carrying a [`NodeKind`] enum
//! that owns each variant's state. Dispatch is a `match` in the free
//! functions below (`create`, `read`, `write`, ...) instead of virtual
//! calls. Parent and host-handle links are weak: a node's children own it,
//! it never owns its parent or its handle.

pub mod foreign;
pub mod handle;
pub mod interface;
pub mod path;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::{Error, Result};
use foreign::ForeignFs;
use interface::Interface;

pub use handle::VfsHandle;

/// Strong reference to a node. Children are owned downward (a directory
/// owns its children's only strong references); parent/handle links back
/// up are weak.
pub type NodeRef = Rc<RefCell<NodeData>>;
pub type WeakNodeRef = Weak<RefCell<NodeData>>;

/// Field kinds addressable on every node operation (§3). `Object` only
/// appears in `create` descriptors, never in a `read`/`write`/`length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Access,
    Id,
    Time,
    Data,
}

/// Read/write access bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access(u8);

impl Access {
    pub const NONE: Access = Access(0);
    pub const READ: Access = Access(0b01);
    pub const WRITE: Access = Access(0b10);
    pub const READ_WRITE: Access = Access(0b11);

    pub fn contains(self, bit: Access) -> bool {
        self.0 & bit.0 == bit.0
    }
}

impl std::ops::BitOr for Access {
    type Output = Access;
    fn bitor(self, rhs: Access) -> Access {
        Access(self.0 | rhs.0)
    }
}

impl std::ops::Sub for Access {
    type Output = Access;
    fn sub(self, rhs: Access) -> Access {
        Access(self.0 & !rhs.0)
    }
}

/// One entry of the descriptor vector passed to `create` (§4.6). `Object`
/// carries an already-built node to attach verbatim.
pub enum Descriptor {
    Name(String),
    Time(i64),
    Access(Access),
    Data(Vec<u8>),
    Object(NodeRef),
}

/// Common attributes every node carries regardless of variant.
pub struct NodeData {
    pub name: String,
    pub timestamp: i64,
    pub access: Access,
    pub parent: Option<WeakNodeRef>,
    pub handle: Option<Weak<handle::VfsHandleInner>>,
    pub kind: NodeKind,
}

/// The tagged union of concrete node variants.
pub enum NodeKind {
    Directory { children: Vec<NodeRef> },
    DataBuffer { bytes: Vec<u8>, length: usize },
    Device { children: Vec<NodeRef> },
    Parameter { interface: Rc<dyn Interface>, kind: u32 },
    Mount { foreign: Box<dyn ForeignFs> },
}

const INITIAL_CAPACITY: usize = 16;

fn grown_capacity(end: usize) -> usize {
    let mut cap = INITIAL_CAPACITY;
    while cap < end {
        cap *= 2;
    }
    cap
}

/// Build a detached directory node (no parent, no handle).
pub fn new_directory(name: impl Into<String>, timestamp: i64, access: Access) -> NodeRef {
    Rc::new(RefCell::new(NodeData {
        name: name.into(),
        timestamp,
        access,
        parent: None,
        handle: None,
        kind: NodeKind::Directory { children: Vec::new() },
    }))
}

/// Build a detached data-buffer node seeded with `initial` bytes.
pub fn new_data_buffer(
    name: impl Into<String>,
    timestamp: i64,
    access: Access,
    initial: Vec<u8>,
) -> NodeRef {
    let length = initial.len();
    let mut bytes = initial;
    bytes.resize(grown_capacity(length).max(bytes.len()), 0);
    Rc::new(RefCell::new(NodeData {
        name: name.into(),
        timestamp,
        access,
        parent: None,
        handle: None,
        kind: NodeKind::DataBuffer { bytes, length },
    }))
}

/// Build a detached mount-point node delegating to `foreign`.
pub fn new_mount(name: impl Into<String>, timestamp: i64, foreign: Box<dyn ForeignFs>) -> NodeRef {
    Rc::new(RefCell::new(NodeData {
        name: name.into(),
        timestamp,
        access: Access::READ_WRITE,
        parent: None,
        handle: None,
        kind: NodeKind::Mount { foreign },
    }))
}

/// Build a detached device-parameter container exposing one leaf child per
/// `(name, kind)` pair, each reading/writing through `interface`.
pub fn new_device(
    name: impl Into<String>,
    timestamp: i64,
    interface: Rc<dyn Interface>,
    params: &[(&str, u32)],
) -> NodeRef {
    let children = params
        .iter()
        .map(|(pname, kind)| {
            Rc::new(RefCell::new(NodeData {
                name: (*pname).to_string(),
                timestamp,
                access: Access::READ_WRITE,
                parent: None,
                handle: None,
                kind: NodeKind::Parameter { interface: interface.clone(), kind: *kind },
            }))
        })
        .collect();
    Rc::new(RefCell::new(NodeData {
        name: name.into(),
        timestamp,
        access: Access::READ_WRITE,
        parent: None,
        handle: None,
        kind: NodeKind::Device { children },
    }))
}

/// Attach `node` under `parent`, wiring the weak back-pointers (§9:
/// "looked up from the handle's ownership tree, never owned").
pub fn enter(node: &NodeRef, vfs_handle: Weak<handle::VfsHandleInner>, parent: Option<&NodeRef>) {
    let mut data = node.borrow_mut();
    data.handle = Some(vfs_handle);
    data.parent = parent.map(Rc::downgrade);
}

/// Detach `node` from its parent/handle, clearing the weak back-pointers.
pub fn leave(node: &NodeRef) {
    let mut data = node.borrow_mut();
    data.handle = None;
    data.parent = None;
}

fn children_mut(kind: &mut NodeKind) -> Option<&mut Vec<NodeRef>> {
    match kind {
        NodeKind::Directory { children } | NodeKind::Device { children } => Some(children),
        _ => None,
    }
}

fn children(kind: &NodeKind) -> Option<&Vec<NodeRef>> {
    match kind {
        NodeKind::Directory { children } | NodeKind::Device { children } => Some(children),
        _ => None,
    }
}

/// First child of a directory/device node, or the foreign root for a
/// mount-point (§4.6 "mount-point head/create/remove").
pub fn head(container: &NodeRef) -> Option<NodeRef> {
    let data = container.borrow();
    match &data.kind {
        NodeKind::Mount { foreign } => foreign.root(),
        _ => children(&data.kind)?.first().cloned(),
    }
}

/// Sibling following `current` within `container`'s children.
pub fn fetch(container: &NodeRef, current: &NodeRef) -> Option<NodeRef> {
    let data = container.borrow();
    match &data.kind {
        NodeKind::Mount { foreign } => foreign.next(current),
        _ => {
            let kids = children(&data.kind)?;
            let idx = kids.iter().position(|n| Rc::ptr_eq(n, current))?;
            kids.get(idx + 1).cloned()
        }
    }
}

/// Create a child of `container` per the descriptor vector (§4.6).
pub fn create(container: &NodeRef, descriptors: Vec<Descriptor>) -> Result<()> {
    {
        let data = container.borrow();
        if let NodeKind::Mount { foreign } = &data.kind {
            return foreign.create(descriptors);
        }
        if children(&data.kind).is_none() {
            return Err(Error::Invalid);
        }
    }

    let mut object = None;
    let mut name = None;
    let mut timestamp = 0i64;
    let mut access = Access::READ_WRITE;
    let mut contents: Option<Vec<u8>> = None;
    let mut has_creation_field = false;

    for descriptor in descriptors {
        match descriptor {
            Descriptor::Object(node) => object = Some(node),
            Descriptor::Name(n) => {
                name = Some(n);
                has_creation_field = true;
            }
            Descriptor::Time(t) => {
                timestamp = t;
                has_creation_field = true;
            }
            Descriptor::Access(a) => {
                access = a;
                has_creation_field = true;
            }
            Descriptor::Data(bytes) => {
                contents = Some(bytes);
                has_creation_field = true;
            }
        }
    }

    if object.is_some() && has_creation_field {
        return Err(Error::Invalid);
    }

    let child = if let Some(object) = object {
        object
    } else {
        let name = name.ok_or(Error::Invalid)?;
        match contents {
            Some(bytes) => new_data_buffer(name, timestamp, access, bytes),
            None => new_directory(name, timestamp, access),
        }
    };

    let handle_weak = container.borrow().handle.clone().unwrap_or_else(Weak::new);
    enter_recursive(&child, handle_weak, Some(container));

    let mut data = container.borrow_mut();
    children_mut(&mut data.kind).ok_or(Error::Invalid)?.push(child);
    Ok(())
}

/// Remove `child` from `container`, tearing it down recursively (§4.6).
pub fn remove(container: &NodeRef, child: &NodeRef) -> Result<()> {
    {
        let data = container.borrow();
        if let NodeKind::Mount { foreign } = &data.kind {
            return foreign.remove(child);
        }
    }

    teardown(child);

    let mut data = container.borrow_mut();
    let kids = children_mut(&mut data.kind).ok_or(Error::Invalid)?;
    let idx = kids.iter().position(|n| Rc::ptr_eq(n, child)).ok_or(Error::Entry)?;
    kids.remove(idx);
    Ok(())
}

/// Like [`enter`], but also wires every existing descendant (used when a
/// pre-built subtree, e.g. a device node's parameter children, is attached
/// as a whole via `Descriptor::Object`).
fn enter_recursive(node: &NodeRef, vfs_handle: Weak<handle::VfsHandleInner>, parent: Option<&NodeRef>) {
    enter(node, vfs_handle.clone(), parent);
    let grandchildren: Vec<NodeRef> = children(&node.borrow().kind).cloned().unwrap_or_default();
    for grandchild in &grandchildren {
        enter_recursive(grandchild, vfs_handle.clone(), Some(node));
    }
}

fn teardown(node: &NodeRef) {
    let child_list: Vec<NodeRef> = {
        let data = node.borrow();
        children(&data.kind).cloned().unwrap_or_default()
    };
    for grandchild in &child_list {
        teardown(grandchild);
    }
    if let Some(kids) = children_mut(&mut node.borrow_mut().kind) {
        kids.clear();
    }
    leave(node);
}

/// Length of `field` on `node`.
pub fn length(node: &NodeRef, field: Field) -> Result<u64> {
    let data = node.borrow();
    match field {
        Field::Name => Ok(data.name.len() as u64),
        Field::Access => Ok(1),
        Field::Id => Ok(std::mem::size_of::<usize>() as u64),
        Field::Time => Ok(8),
        Field::Data => match &data.kind {
            NodeKind::DataBuffer { length, .. } => Ok(*length as u64),
            NodeKind::Parameter { .. } => Ok(0),
            NodeKind::Mount { foreign } => foreign.data_length(),
            NodeKind::Directory { .. } | NodeKind::Device { .. } => Err(Error::Invalid),
        },
    }
}

/// Read `field` at `offset` into `buf`, returning bytes read.
pub fn read(node: &NodeRef, field: Field, offset: u64, buf: &mut [u8]) -> Result<usize> {
    match field {
        Field::Name => {
            let data = node.borrow();
            read_bytes(data.name.as_bytes(), offset, buf)
        }
        Field::Time => {
            let data = node.borrow();
            read_bytes(&data.timestamp.to_le_bytes(), offset, buf)
        }
        Field::Access => {
            let data = node.borrow();
            let bits = if data.access.contains(Access::READ_WRITE) {
                0b11u8
            } else if data.access.contains(Access::WRITE) {
                0b10
            } else if data.access.contains(Access::READ) {
                0b01
            } else {
                0
            };
            read_bytes(&[bits], offset, buf)
        }
        Field::Id => {
            let id = Rc::as_ptr(node) as usize;
            read_bytes(&id.to_le_bytes(), offset, buf)
        }
        Field::Data => read_data(node, offset, buf),
    }
}

fn read_bytes(source: &[u8], offset: u64, buf: &mut [u8]) -> Result<usize> {
    let offset = offset as usize;
    if offset >= source.len() {
        return Ok(0);
    }
    let available = &source[offset..];
    let n = available.len().min(buf.len());
    buf[..n].copy_from_slice(&available[..n]);
    Ok(n)
}

fn read_data(node: &NodeRef, offset: u64, buf: &mut [u8]) -> Result<usize> {
    let data = node.borrow();
    match &data.kind {
        NodeKind::DataBuffer { bytes, length } => read_bytes(&bytes[..*length], offset, buf),
        NodeKind::Parameter { interface, kind } => {
            if offset != 0 {
                return Err(Error::Empty);
            }
            let value = interface.get_parameter(*kind)?;
            let serialized = format!("{value}\r\n");
            if serialized.len() > buf.len() {
                return Err(Error::Full);
            }
            buf[..serialized.len()].copy_from_slice(serialized.as_bytes());
            Ok(serialized.len())
        }
        NodeKind::Mount { foreign } => foreign.read_data(offset, buf),
        NodeKind::Directory { .. } | NodeKind::Device { .. } => Err(Error::Invalid),
    }
}

/// `strtol`-style partial parse: skip leading whitespace and an optional
/// sign, read a `0x`/`0X`-prefixed hex run or a decimal run of digits, and
/// stop at the first character that doesn't fit — trailing garbage (a
/// newline from `echo`, a stray word) is left unconsumed rather than
/// failing the whole parse. Returns the parsed value and the number of
/// bytes of `text` consumed, or `None` if no digits were found at all.
fn parse_leading_int(text: &str) -> Option<(i64, usize)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let radix = if bytes[i..].starts_with(b"0x") || bytes[i..].starts_with(b"0X") {
        i += 2;
        16
    } else {
        10
    };

    let value_start = i;
    while i < bytes.len() && (bytes[i] as char).is_digit(radix) {
        i += 1;
    }
    if i == value_start {
        return None;
    }

    let magnitude = i64::from_str_radix(&text[value_start..i], radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    Some((value, i))
}

/// Write `buf` to `field` at `offset`, returning bytes written.
pub fn write(node: &NodeRef, field: Field, offset: u64, buf: &[u8]) -> Result<usize> {
    match field {
        Field::Name => {
            let mut data = node.borrow_mut();
            data.name = String::from_utf8_lossy(buf).into_owned();
            Ok(buf.len())
        }
        Field::Data => write_data(node, offset, buf),
        Field::Time | Field::Access | Field::Id => Err(Error::Invalid),
    }
}

fn write_data(node: &NodeRef, offset: u64, buf: &[u8]) -> Result<usize> {
    let mut data = node.borrow_mut();
    match &mut data.kind {
        NodeKind::DataBuffer { bytes, length } => {
            let offset = offset as usize;
            let end = offset + buf.len();
            if end > bytes.len() {
                let new_cap = grown_capacity(end);
                bytes.resize(new_cap, 0);
            }
            bytes[offset..end].copy_from_slice(buf);
            if end > *length {
                *length = end;
            }
            Ok(buf.len())
        }
        NodeKind::Parameter { interface, kind } => {
            let text = std::str::from_utf8(buf).unwrap_or("");
            match parse_leading_int(text) {
                Some((value, consumed)) => {
                    interface.set_parameter(*kind, value)?;
                    Ok(consumed)
                }
                // Nonsensical data is silently accepted so that output of
                // echo-like scripts never fails a write.
                None => Ok(0),
            }
        }
        NodeKind::Mount { foreign } => foreign.write_data(offset, buf),
        NodeKind::Directory { .. } | NodeKind::Device { .. } => Err(Error::Invalid),
    }
}

/// `true` if `node` is a directory-like container (directory, device, or
/// mount-point root).
pub fn is_container(node: &NodeRef) -> bool {
    matches!(
        node.borrow().kind,
        NodeKind::Directory { .. } | NodeKind::Device { .. } | NodeKind::Mount { .. }
    )
}

pub fn name_of(node: &NodeRef) -> String {
    node.borrow().name.clone()
}
