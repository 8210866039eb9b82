//! `chmod MODE ENTRIES...` — apply a symbolic mode string of alternating
//! `+`/`-` sections naming `r`/`w` bits (§6).

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Access};

const USAGE: &str = "Usage: chmod MODE ENTRIES...\r\n  MODE        e.g. +r, -w, +rw\r\n  ENTRIES     entries to modify";

fn apply_mode(mode: &str, current: Access) -> Result<Access> {
    let mut access = current;
    let mut sign = None;
    for ch in mode.chars() {
        match ch {
            '+' => sign = Some(true),
            '-' => sign = Some(false),
            'r' => match sign {
                Some(true) => access = access | Access::READ,
                Some(false) => access = access - Access::READ,
                None => return Err(Error::Invalid),
            },
            'w' => match sign {
                Some(true) => access = access | Access::WRITE,
                Some(false) => access = access - Access::WRITE,
                None => return Err(Error::Invalid),
            },
            _ => return Err(Error::Invalid),
        }
    }
    Ok(access)
}

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let (mode, entries) = match args {
        [mode, rest @ ..] if !rest.is_empty() => (mode, rest),
        _ => return Err(Error::Invalid),
    };

    let root = ctx.vfs.root()?;
    let mut last = Ok(());
    for entry in entries {
        let resolved = resolve(ctx, entry);
        let node = match path::open_node(&root, &resolved) {
            Ok(node) => node,
            Err(err) => {
                diagnostic_error(term, "chmod", entry, err);
                last = Err(err);
                continue;
            }
        };
        let next = match apply_mode(mode, node.borrow().access) {
            Ok(access) => access,
            Err(err) => {
                diagnostic_error(term, "chmod", entry, err);
                last = Err(err);
                continue;
            }
        };
        node.borrow_mut().access = next;
    }
    last
}
