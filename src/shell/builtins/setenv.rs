//! `setenv NAME VALUE` — assign an environment variable (§6).

use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};

const USAGE: &str = "Usage: setenv NAME VALUE\r\n  NAME        variable to set\r\n  VALUE       value to assign";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let (name, value) = match args {
        [name, value] => (name, value),
        _ => return Err(Error::Invalid),
    };
    ctx.env.borrow_mut().get_or_insert(name).set(value.as_bytes());
    Ok(())
}
