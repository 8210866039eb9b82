//! `mkdir ENTRY` — create a directory; fails if it already exists (§6).

use super::common::{diagnostic, diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Access};

const USAGE: &str = "Usage: mkdir ENTRY\r\n  ENTRY       directory to create";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let entry = args.first().ok_or(Error::Invalid)?;
    let target = resolve(ctx, entry);
    let root = ctx.vfs.root()?;

    if path::open_node(&root, &target).is_ok() {
        diagnostic_error(term, "mkdir", entry, Error::Exist);
        return Err(Error::Exist);
    }

    let (parent, name) = match path::open_base_node(&root, &target) {
        Ok(pair) => pair,
        Err(err) => {
            diagnostic_error(term, "mkdir", entry, err);
            return Err(err);
        }
    };
    if !parent.borrow().access.contains(Access::WRITE) {
        diagnostic(term, "mkdir", entry, "directory creation failed");
        return Err(Error::Access);
    }
    crate::vfs::create(&parent, path::directory_descriptors(name))?;
    Ok(())
}
