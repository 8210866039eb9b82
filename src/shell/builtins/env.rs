//! `env` — list every environment variable, one `NAME=VALUE` per line (§6).

use crate::argparser::check_help;
use crate::error::Result;
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};

const USAGE: &str = "Usage: env\r\n  (no arguments)";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let mut lines = Vec::new();
    ctx.env.borrow().iterate(|name, value| {
        lines.push(format!("{name}={value}"));
    });
    let mut t = term.borrow_mut();
    for line in lines {
        t.insert_str(&line);
        t.insert_eol();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::shell::clock::MockClock;
    use crate::shell::context::Runners;
    use crate::terminal::MockTerminal;
    use crate::vfs::VfsHandle;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn lists_variables_in_insertion_order() {
        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().get_or_insert("PWD").set(b"/");
        env.borrow_mut().get_or_insert("SHELL").set(b"sh");
        let ctx = ShellContext {
            vfs: VfsHandle::new(),
            env,
            clock: Rc::new(MockClock::new(0)),
            runners: Rc::new(Runners::new()),
            terminate: Arc::new(AtomicBool::new(false)),
        };
        let concrete = Rc::new(RefCell::new(MockTerminal::new(b"")));
        let term: SharedTerminal = concrete.clone();
        run(&ctx, &term, &[]).unwrap();
        assert_eq!(concrete.borrow().output(), b"PWD=/\r\nSHELL=sh\r\n");
    }
}
