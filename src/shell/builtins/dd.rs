//! `dd --if FILE --of FILE [--bs N] [--count N] [--seek N] [--skip N]` —
//! block-granular copy with offset controls (§6).

use super::common::{diagnostic_error, resolve};
use crate::argparser::{self, check_help, Descriptor};
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Field};

const USAGE: &str = "Usage: dd --if FILE --of FILE [--bs N] [--count N] [--seek N] [--skip N]\r\n  --if        input file\r\n  --of        output file\r\n  --bs        block size in bytes (default 512)\r\n  --count     number of blocks to copy (default: until input exhausted)\r\n  --seek      blocks to skip at start of output\r\n  --skip      blocks to skip at start of input";

#[derive(Default)]
struct Args {
    input: Option<String>,
    output: Option<String>,
    block_size: Option<usize>,
    count: Option<u64>,
    seek: u64,
    skip: u64,
}

fn parse_usize(v: Option<&str>) -> Option<usize> {
    v.and_then(|v| v.parse().ok())
}

fn parse_u64(v: Option<&str>) -> u64 {
    v.and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn descriptors() -> Vec<Descriptor<Args>> {
    vec![
        Descriptor { name: Some("--if"), metavar: Some("FILE"), info: "input file", count: 1, setter: |a, v| a.input = v.map(str::to_string) },
        Descriptor { name: Some("--of"), metavar: Some("FILE"), info: "output file", count: 1, setter: |a, v| a.output = v.map(str::to_string) },
        Descriptor { name: Some("--bs"), metavar: Some("N"), info: "block size in bytes", count: 1, setter: |a, v| a.block_size = parse_usize(v) },
        Descriptor { name: Some("--count"), metavar: Some("N"), info: "number of blocks to copy", count: 1, setter: |a, v| a.count = parse_usize(v).map(|n| n as u64) },
        Descriptor { name: Some("--seek"), metavar: Some("N"), info: "blocks to skip at start of output", count: 1, setter: |a, v| a.seek = parse_u64(v) },
        Descriptor { name: Some("--skip"), metavar: Some("N"), info: "blocks to skip at start of input", count: 1, setter: |a, v| a.skip = parse_u64(v) },
    ]
}

pub fn run(ctx: &ShellContext, term: &SharedTerminal, raw_args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(raw_args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let args: Vec<String> = raw_args.to_vec();
    let parsed = argparser::parse(&args, &descriptors());

    let input = parsed.input.as_deref().ok_or(Error::Invalid)?;
    let output = parsed.output.as_deref().ok_or(Error::Invalid)?;
    let block_size = parsed.block_size.unwrap_or(512).max(1);

    let root = ctx.vfs.root()?;
    let in_resolved = resolve(ctx, input);
    let in_node = match path::open_node(&root, &in_resolved) {
        Ok(node) => node,
        Err(err) => {
            diagnostic_error(term, "dd", input, err);
            return Err(err);
        }
    };
    let out_resolved = resolve(ctx, output);
    let out_node = match path::open_sink(&root, &out_resolved, true) {
        Ok(node) => node,
        Err(err) => {
            diagnostic_error(term, "dd", output, err);
            return Err(err);
        }
    };

    let mut in_offset = parsed.skip * block_size as u64;
    let mut out_offset = parsed.seek * block_size as u64;
    let mut blocks_copied = 0u64;
    let mut buf = vec![0u8; block_size];

    loop {
        if ctx.should_terminate() {
            return Err(Error::Timeout);
        }
        if let Some(count) = parsed.count {
            if blocks_copied >= count {
                break;
            }
        }
        let n = crate::vfs::read(&in_node, Field::Data, in_offset, &mut buf)?;
        if n == 0 {
            break;
        }
        crate::vfs::write(&out_node, Field::Data, out_offset, &buf[..n])?;
        in_offset += n as u64;
        out_offset += n as u64;
        blocks_copied += 1;
    }
    Ok(())
}
