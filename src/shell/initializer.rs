//! Populates `/bin` and `/dev`, seeds default environment variables, and
//! owns the built-in runners for the lifetime of the shell session (§4.11).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::info;

use super::builtins;
use super::clock::Clock;
use super::context::{Runner, Runners, ShellContext};
use crate::environment::Environment;
use crate::error::Result;
use crate::vfs::interface::{Interface, MockInterface};
use crate::vfs::{new_device, path, Descriptor, NodeRef, VfsHandle};

const EXEC_MAGIC: [u8; 4] = [0x7F, b'B', b'I', b'N'];

/// Parameter kinds exposed by `/dev/serial0`, named after the generic
/// interface parameter set (`rx_available`, `tx_available`, `rate`, ...).
const SERIAL0_PARAMS: &[(&str, u32)] = &[("rx_available", 0), ("tx_available", 1), ("rate", 2)];

pub struct Initializer {
    pub ctx: ShellContext,
    bin: NodeRef,
    registrations: Vec<NodeRef>,
}

impl Initializer {
    pub fn new(vfs: VfsHandle, clock: Rc<dyn Clock>) -> Result<Self> {
        let root = vfs.root()?;
        crate::vfs::create(&root, path::directory_descriptors("bin"))?;
        crate::vfs::create(&root, path::directory_descriptors("dev"))?;
        let bin = path::open_node(&root, "/bin")?;
        let dev = path::open_node(&root, "/dev")?;

        let serial_interface: Rc<dyn Interface> = Rc::new(MockInterface::new());
        let serial0 = new_device("serial0", 0, serial_interface, SERIAL0_PARAMS);
        crate::vfs::create(&dev, vec![Descriptor::Object(serial0)])?;

        let env = Rc::new(RefCell::new(Environment::new()));
        {
            let mut e = env.borrow_mut();
            e.get_or_insert("PATH").set(b"/bin");
            e.get_or_insert("PWD").set(b"/");
            e.get_or_insert("DEBUG").set(b"0");
            e.get_or_insert("ECHO").set(b"1");
            e.get_or_insert("SHELL").set(b"sh");
            e.get_or_insert("?").set(b"Ok");
        }

        let runners = Runners::new();
        let ctx = ShellContext {
            vfs,
            env,
            clock,
            runners: Rc::new(runners),
            terminate: Arc::new(AtomicBool::new(false)),
        };

        let mut registrations = Vec::new();
        for &(name, run) in builtins::REGISTRY {
            let key = ctx.runners.register(Runner { name, run });
            let mut content = EXEC_MAGIC.to_vec();
            content.extend_from_slice(&(key as u64).to_le_bytes());
            crate::vfs::create(&bin, vec![Descriptor::Name(name.to_string()), Descriptor::Data(content)])?;
            registrations.push(path::open_node(&bin, name)?);
        }

        info!(count = registrations.len(), "initializer registered built-ins");
        Ok(Initializer { ctx, bin, registrations })
    }
}

impl Drop for Initializer {
    fn drop(&mut self) {
        for node in self.registrations.drain(..) {
            let _ = crate::vfs::remove(&self.bin, &node);
        }
        info!("initializer tore down built-ins");
    }
}
