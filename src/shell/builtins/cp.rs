//! `cp SRC DST` — copy byte content; destination must not pre-exist (§6).

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Descriptor, Field};

const USAGE: &str = "Usage: cp SRC DST\r\n  SRC         source file\r\n  DST         destination path";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let (src, dst) = match args {
        [src, dst] => (src, dst),
        _ => return Err(Error::Invalid),
    };

    let root = ctx.vfs.root()?;
    let src_resolved = resolve(ctx, src);
    let src_node = match path::open_node(&root, &src_resolved) {
        Ok(node) => node,
        Err(err) => {
            diagnostic_error(term, "cp", src, err);
            return Err(err);
        }
    };

    let dst_resolved = resolve(ctx, dst);
    if path::open_node(&root, &dst_resolved).is_ok() {
        diagnostic_error(term, "cp", dst, Error::Exist);
        return Err(Error::Exist);
    }

    let length = crate::vfs::length(&src_node, Field::Data)? as usize;
    let mut contents = vec![0u8; length];
    crate::vfs::read(&src_node, Field::Data, 0, &mut contents)?;

    let (parent, name) = path::open_base_node(&root, &dst_resolved)?;
    crate::vfs::create(&parent, vec![Descriptor::Name(name.to_string()), Descriptor::Data(contents)])?;
    Ok(())
}
