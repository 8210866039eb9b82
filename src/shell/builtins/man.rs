//! `man` — alias for `ls /bin` (§6).

use super::ls;
use crate::error::Result;
use crate::shell::context::ShellContext;
use crate::terminal::SharedTerminal;

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    let mut forwarded = vec!["/bin".to_string()];
    forwarded.extend(args.iter().cloned());
    ls::run(ctx, term, &forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::shell::clock::MockClock;
    use crate::shell::context::Runners;
    use crate::terminal::MockTerminal;
    use crate::vfs::{Descriptor, VfsHandle};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn lists_the_bin_directory() {
        let vfs = VfsHandle::new();
        let root = vfs.root().unwrap();
        crate::vfs::create(&root, vec![Descriptor::Name("bin".into())]).unwrap();
        let bin = crate::vfs::path::open_node(&root, "/bin").unwrap();
        crate::vfs::create(&bin, vec![Descriptor::Name("echo".into()), Descriptor::Data(Vec::new())]).unwrap();

        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().get_or_insert("PWD").set(b"/");
        let ctx = ShellContext {
            vfs,
            env,
            clock: Rc::new(MockClock::new(0)),
            runners: Rc::new(Runners::new()),
            terminate: Arc::new(AtomicBool::new(false)),
        };
        let concrete = Rc::new(RefCell::new(MockTerminal::new(b"")));
        let term: SharedTerminal = concrete.clone();
        run(&ctx, &term, &[]).unwrap();
        assert_eq!(concrete.borrow().output(), b"echo\r\n");
    }
}
