//! `echo ARGS...` — space-separated + EOL (§6).

use crate::argparser::check_help;
use crate::error::Result;
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};

const USAGE: &str = "Usage: echo [OPTION]... [ARGS]\r\n  --help      show this message";

pub fn run(_ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let mut t = term.borrow_mut();
    t.insert_str(&args.join(" "));
    t.insert_eol();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::context::{Runners, ShellContext};
    use crate::shell::clock::MockClock;
    use crate::terminal::MockTerminal;
    use crate::environment::Environment;
    use crate::vfs::VfsHandle;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn ctx() -> ShellContext {
        ShellContext {
            vfs: VfsHandle::new(),
            env: Rc::new(RefCell::new(Environment::new())),
            clock: Rc::new(MockClock::new(0)),
            runners: Rc::new(Runners::new()),
            terminate: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn joins_args_with_single_space_and_eol() {
        let concrete = Rc::new(RefCell::new(MockTerminal::new(b"")));
        let term: SharedTerminal = concrete.clone();
        run(&ctx(), &term, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(concrete.borrow().output(), b"a b\r\n");
    }
}
