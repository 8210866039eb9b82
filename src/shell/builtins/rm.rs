//! `rm [-r] ENTRIES...` — remove data nodes; `-r` allows directory removal
//! (§6, §8 scenario 4: a directory without `-r` is reported, not removed).

use super::common::{diagnostic, diagnostic_error, resolve};
use crate::argparser::{self, check_help, Descriptor};
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::path;

const USAGE: &str = "Usage: rm [-r] ENTRIES...\r\n  -r          allow removing directories\r\n  ENTRIES     entries to remove";

#[derive(Default)]
struct Args {
    recursive: bool,
    targets: Vec<String>,
}

fn descriptors() -> Vec<Descriptor<Args>> {
    vec![
        Descriptor {
            name: Some("-r"),
            metavar: None,
            info: "allow removing directories",
            count: 0,
            setter: |a, _| a.recursive = true,
        },
        Descriptor {
            name: None,
            metavar: Some("ENTRY"),
            info: "entry to remove",
            count: 1,
            setter: |a, v| {
                if let Some(v) = v {
                    a.targets.push(v.to_string());
                }
            },
        },
    ]
}

fn remove_one(ctx: &ShellContext, term: &SharedTerminal, args: &Args, target: &str) -> Result<()> {
    let root = ctx.vfs.root()?;
    let resolved = resolve(ctx, target);
    let node = match path::open_node(&root, &resolved) {
        Ok(node) => node,
        Err(err) => {
            diagnostic_error(term, "rm", target, err);
            return Err(err);
        }
    };

    if crate::vfs::is_container(&node) && !args.recursive {
        diagnostic(term, "rm", target, "directory node ignored");
        return Err(Error::Invalid);
    }

    let (parent, _) = path::open_base_node(&root, &resolved)?;
    crate::vfs::remove(&parent, &node)?;
    Ok(())
}

pub fn run(ctx: &ShellContext, term: &SharedTerminal, raw_args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(raw_args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let args: Vec<String> = raw_args.to_vec();
    let parsed = argparser::parse(&args, &descriptors());
    if parsed.targets.is_empty() {
        return Err(Error::Invalid);
    }
    let mut last = Ok(());
    for target in &parsed.targets {
        if let Err(err) = remove_one(ctx, term, &parsed, target) {
            last = Err(err);
        }
    }
    last
}
