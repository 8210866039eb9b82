//! `time CMD...` — run a command through the evaluator and print elapsed
//! microseconds (§6).

use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::shell::evaluator;
use crate::terminal::{SharedTerminal, TerminalExt};

const USAGE: &str = "Usage: time CMD...\r\n  CMD         command to time";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    if args.is_empty() {
        return Err(Error::Invalid);
    }

    let start = ctx.clock.now_micros();
    let result = evaluator::run(ctx, term, args);
    let elapsed = ctx.clock.now_micros() - start;

    let mut t = term.borrow_mut();
    t.insert_str(&format!("{elapsed}us"));
    t.insert_eol();
    drop(t);
    result
}
