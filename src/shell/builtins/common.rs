//! Shared helpers every built-in leans on: the `<cmd>: <operand>: <reason>`
//! diagnostic line and resolving an operand path against `PWD` (§4.12, §7).

use crate::error::Error;
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::path;

pub fn diagnostic(term: &SharedTerminal, cmd: &str, operand: &str, reason: &str) {
    let mut t = term.borrow_mut();
    t.insert_str(&format!("{cmd}: {operand}: {reason}"));
    t.insert_eol();
}

pub fn diagnostic_error(term: &SharedTerminal, cmd: &str, operand: &str, err: Error) {
    diagnostic(term, cmd, operand, err.name());
}

/// Resolve `operand` against the shell's current `PWD`, as every built-in
/// that takes a path argument does.
pub fn resolve(ctx: &ShellContext, operand: &str) -> String {
    path::join(&ctx.pwd(), operand)
}
