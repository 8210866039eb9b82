//! `hexdump FILES...` — stream contents as 16-byte hex rows (§6).

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Field};

const USAGE: &str = "Usage: hexdump FILES...\r\n  FILES       files to dump";
const ROW: usize = 16;

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
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
                diagnostic_error(term, "hexdump", file, err);
                return Err(err);
            }
        };
        let mut offset = 0u64;
        loop {
            if ctx.should_terminate() {
                return Err(Error::Timeout);
            }
            let mut buf = [0u8; ROW];
            let n = crate::vfs::read(&node, Field::Data, offset, &mut buf)?;
            if n == 0 {
                break;
            }
            let row: Vec<String> = buf[..n].iter().map(|b| format!("{b:02x}")).collect();
            let mut t = term.borrow_mut();
            t.insert_str(&format!("{offset:08x}  {}", row.join(" ")));
            t.insert_eol();
            drop(t);
            offset += n as u64;
        }
    }
    Ok(())
}
