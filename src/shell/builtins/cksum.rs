//! `cksum FILES...` — CRC-32 of each file's contents (§6), the standard
//! IEEE variant (polynomial `0xEDB88320` reflected, init and final XOR of
//! `0xFFFFFFFF`) that `crc32fast` implements, streamed in fixed chunks so
//! large files never need to be buffered whole.

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Field};

const USAGE: &str = "Usage: cksum FILES...\r\n  FILES       files to checksum";
const CHUNK: usize = 256;

fn crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    if args.is_empty() {
        return Err(Error::Invalid);
    }
    let root = ctx.vfs.root()?;
    let mut last = Ok(());
    for file in args {
        let resolved = resolve(ctx, file);
        let node = match path::open_node(&root, &resolved) {
            Ok(node) => node,
            Err(err) => {
                diagnostic_error(term, "cksum", file, err);
                last = Err(err);
                continue;
            }
        };

        let mut hasher = crc32fast::Hasher::new();
        let mut offset = 0u64;
        loop {
            let mut buf = [0u8; CHUNK];
            let n = crate::vfs::read(&node, Field::Data, offset, &mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            offset += n as u64;
        }

        let checksum = hasher.finalize();
        let mut t = term.borrow_mut();
        t.insert_str(&format!("{checksum:08X}  {file}"));
        t.insert_eol();
    }
    last
}
