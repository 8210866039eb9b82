//! `cat FILES...` — stream contents to the terminal (§6).

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::SharedTerminal;
use crate::vfs::{path, Field};

const USAGE: &str = "Usage: cat FILES...\r\n  FILES       files to stream";
const CHUNK: usize = 256;

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().write(usage.as_bytes());
        return Ok(());
    }
    if args.is_empty() {
        return Err(Error::Invalid);
    }
    let root = ctx.vfs.root()?;
    for file in args {
        let resolved = resolve(ctx, file);
        let node = match path::open_node(&root, &resolved) {
            Ok(node) => node,
            Err(err) => {
                diagnostic_error(term, "cat", file, err);
                return Err(err);
            }
        };
        let mut offset = 0u64;
        loop {
            if ctx.should_terminate() {
                return Err(Error::Timeout);
            }
            let mut buf = [0u8; CHUNK];
            let n = crate::vfs::read(&node, Field::Data, offset, &mut buf)?;
            if n == 0 {
                break;
            }
            term.borrow_mut().write(&buf[..n]);
            offset += n as u64;
        }
    }
    Ok(())
}
