//! `getenv NAME` — print one environment variable's value (§6).

use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::terminal::{SharedTerminal, TerminalExt};

const USAGE: &str = "Usage: getenv NAME\r\n  NAME        variable to read";

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let name = args.first().ok_or(Error::Invalid)?;
    let env = ctx.env.borrow();
    let value = match env.get(name) {
        Some(var) => var.value_str(),
        None => return Err(Error::Entry),
    };
    let mut t = term.borrow_mut();
    t.insert_str(&value);
    t.insert_eol();
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

    fn ctx() -> ShellContext {
        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().get_or_insert("PWD").set(b"/");
        ShellContext {
            vfs: VfsHandle::new(),
            env,
            clock: Rc::new(MockClock::new(0)),
            runners: Rc::new(Runners::new()),
            terminate: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn prints_existing_value() {
        let concrete = Rc::new(RefCell::new(MockTerminal::new(b"")));
        let term: SharedTerminal = concrete.clone();
        run(&ctx(), &term, &["PWD".to_string()]).unwrap();
        assert_eq!(concrete.borrow().output(), b"/\r\n");
    }

    #[test]
    fn missing_variable_is_entry_error() {
        let term: SharedTerminal = Rc::new(RefCell::new(MockTerminal::new(b"")));
        assert_eq!(run(&ctx(), &term, &["NOPE".to_string()]).unwrap_err(), Error::Entry);
    }
}
