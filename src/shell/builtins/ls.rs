//! `ls [-l] [-i] [-h] [PATHS...]` — list directory children (§6).

use super::common::{diagnostic_error, resolve};
use crate::argparser::{self, check_help, Descriptor};
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Field};

const USAGE: &str = "Usage: ls [OPTION]... [PATHS]\r\n  -l          long form\r\n  -i          show identifier in hex\r\n  -h          human-readable sizes";

#[derive(Default)]
struct Args {
    long: bool,
    ids: bool,
    human: bool,
    targets: Vec<String>,
}

fn descriptors() -> Vec<Descriptor<Args>> {
    vec![
        Descriptor { name: Some("-l"), metavar: None, info: "long form", count: 0, setter: |a, _| a.long = true },
        Descriptor {
            name: Some("-i"),
            metavar: None,
            info: "show identifier in hex",
            count: 0,
            setter: |a, _| a.ids = true,
        },
        Descriptor {
            name: Some("-h"),
            metavar: None,
            info: "human-readable sizes",
            count: 0,
            setter: |a, _| a.human = true,
        },
        Descriptor {
            name: None,
            metavar: Some("PATH"),
            info: "directory to list",
            count: 1,
            setter: |a, v| {
                if let Some(v) = v {
                    a.targets.push(v.to_string());
                }
            },
        },
    ]
}

fn human_size(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n}{}", UNITS[0])
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}

fn list_one(ctx: &ShellContext, term: &SharedTerminal, args: &Args, target: &str) -> Result<()> {
    let root = ctx.vfs.root()?;
    let resolved = resolve(ctx, target);
    let dir = match path::open_node(&root, &resolved) {
        Ok(node) => node,
        Err(err) => {
            diagnostic_error(term, "ls", target, err);
            return Err(err);
        }
    };

    let mut cursor = crate::vfs::head(&dir);
    while let Some(child) = cursor {
        let name = crate::vfs::name_of(&child);
        let mut line = String::new();
        if args.ids {
            let mut id_bytes = [0u8; 8];
            crate::vfs::read(&child, Field::Id, 0, &mut id_bytes).unwrap_or(0);
            let id = u64::from_le_bytes(id_bytes);
            line.push_str(&format!("{id:08x}  "));
        }
        if args.long {
            let size = crate::vfs::length(&child, Field::Data).unwrap_or(0);
            let size_str = if args.human { human_size(size) } else { size.to_string() };
            line.push_str(&format!("{size_str:>8}  "));
        }
        line.push_str(&name);
        let mut t = term.borrow_mut();
        t.insert_str(&line);
        t.insert_eol();
        drop(t);
        cursor = crate::vfs::fetch(&dir, &child);
    }
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
        return list_one(ctx, term, &parsed, ".");
    }
    let mut last = Ok(());
    for target in &parsed.targets {
        if let Err(err) = list_one(ctx, term, &parsed, target) {
            last = Err(err);
        }
    }
    last
}
