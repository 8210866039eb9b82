//! `cd ENTRY` — change `PWD`, checking existence and Read access (§6).

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Field};

const USAGE: &str = "Usage: cd ENTRY\r\n  ENTRY       directory to make current";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let entry = args.first().ok_or(Error::Invalid)?;
    let target = resolve(ctx, entry);
    let root = ctx.vfs.root()?;

    let node = match path::open_node(&root, &target) {
        Ok(node) => node,
        Err(err) => {
            diagnostic_error(term, "cd", entry, err);
            return Err(err);
        }
    };

    if !crate::vfs::is_container(&node) {
        diagnostic_error(term, "cd", entry, Error::Invalid);
        return Err(Error::Invalid);
    }

    let mut access_byte = [0u8; 1];
    crate::vfs::read(&node, Field::Access, 0, &mut access_byte)?;
    if access_byte[0] & 0b01 == 0 {
        diagnostic_error(term, "cd", entry, Error::Access);
        return Err(Error::Access);
    }

    ctx.env.borrow_mut().get_or_insert("PWD").set(target.as_bytes());
    Ok(())
}
