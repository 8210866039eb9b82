//! `mount DEVICE DIR` — attach a foreign filesystem found on `DEVICE` at
//! `DIR` (§6). Concrete FAT32 is out of scope (§1); this drives the same
//! [`MemoryForeignFs`] double the VFS layer tests its mount contract with.

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::foreign::MemoryForeignFs;
use crate::vfs::{new_mount, path, Descriptor};

const USAGE: &str = "Usage: mount DEVICE DIR\r\n  DEVICE      device node to mount\r\n  DIR         directory to mount it at";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let (device, dir) = match args {
        [device, dir] => (device, dir),
        _ => return Err(Error::Invalid),
    };

    let root = ctx.vfs.root()?;
    let device_resolved = resolve(ctx, device);
    if let Err(err) = path::open_node(&root, &device_resolved) {
        diagnostic_error(term, "mount", device, err);
        return Err(err);
    }

    let dir_resolved = resolve(ctx, dir);
    if path::open_node(&root, &dir_resolved).is_ok() {
        diagnostic_error(term, "mount", dir, Error::Exist);
        return Err(Error::Exist);
    }

    let (parent, name) = path::open_base_node(&root, &dir_resolved)?;
    let mount = new_mount(name, ctx.clock.now_micros(), Box::new(MemoryForeignFs::new()));
    crate::vfs::create(&parent, vec![Descriptor::Object(mount)])?;
    Ok(())
}
