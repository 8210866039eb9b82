//! `exit` — raise the Terminate signal to the parent shell (§6).

use crate::argparser::check_help;
use crate::error::Result;
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};

const USAGE: &str = "Usage: exit\r\n  (no arguments)";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    ctx.terminate.store(true, std::sync::atomic::Ordering::SeqCst);
    Ok(())
}
