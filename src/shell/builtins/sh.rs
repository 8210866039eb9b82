//! `sh [SCRIPT]` — run a script of shell commands line by line (§6).
//!
//! Only `SCRIPT` files written in this shell's own grammar are supported:
//! a script beginning with the text-script marker (`#!`) is refused, the
//! same way the evaluator refuses it for ordinary command resolution.

use super::common::{diagnostic_error, resolve};
use crate::argparser::check_help;
use crate::error::{Error, Result};
use crate::shell::context::ShellContext;
use crate::shell::{evaluator, tokenizer};
use crate::terminal::{SharedTerminal, TerminalExt};
use crate::vfs::{path, Field};

const USAGE: &str = "Usage: sh SCRIPT\r\n  SCRIPT      file of commands to run, one per line";
const TEXT_MAGIC: [u8; 2] = [b'#', b'!'];

pub fn run(ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
    if let Some(usage) = check_help(args, USAGE) {
        term.borrow_mut().insert_str(&usage);
        return Ok(());
    }
    let script = args.first().ok_or(Error::Invalid)?;
    let root = ctx.vfs.root()?;
    let resolved = resolve(ctx, script);
    let node = match path::open_node(&root, &resolved) {
        Ok(node) => node,
        Err(err) => {
            diagnostic_error(term, "sh", script, err);
            return Err(err);
        }
    };

    let length = crate::vfs::length(&node, Field::Data)? as usize;
    let mut contents = vec![0u8; length];
    crate::vfs::read(&node, Field::Data, 0, &mut contents)?;

    if contents.len() >= 2 && contents[..2] == TEXT_MAGIC {
        diagnostic_error(term, "sh", script, Error::Invalid);
        return Err(Error::Invalid);
    }

    let text = String::from_utf8_lossy(&contents);
    for line in text.lines() {
        if ctx.should_terminate() {
            return Err(Error::Timeout);
        }
        if line.trim_start().starts_with('#') {
            continue;
        }
        let tokens = match tokenizer::tokenize(line) {
            Ok(tokens) => tokens,
            Err(Error::Empty) => continue,
            Err(err) => return Err(err),
        };
        evaluator::run(ctx, term, &tokens)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::shell::clock::MockClock;
    use crate::shell::context::{Runner, Runners};
    use crate::terminal::MockTerminal;
    use crate::vfs::{Descriptor, VfsHandle};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    const EXEC_MAGIC: [u8; 4] = [0x7F, b'B', b'I', b'N'];

    fn probe_run(_ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
        term.borrow_mut().write(args.join(",").as_bytes());
        term.borrow_mut().insert_eol();
        Ok(())
    }

    fn ctx_with_script(script: &[u8]) -> ShellContext {
        let vfs = VfsHandle::new();
        let root = vfs.root().unwrap();
        crate::vfs::create(&root, vec![Descriptor::Name("bin".into())]).unwrap();
        let bin = path::open_node(&root, "/bin").unwrap();

        let runners = Runners::new();
        let key = runners.register(Runner { name: "probe", run: probe_run });
        let mut content = EXEC_MAGIC.to_vec();
        content.extend_from_slice(&(key as u64).to_le_bytes());
        crate::vfs::create(&bin, vec![Descriptor::Name("probe".into()), Descriptor::Data(content)]).unwrap();

        crate::vfs::create(&root, vec![Descriptor::Name("script".into()), Descriptor::Data(script.to_vec())]).unwrap();

        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().get_or_insert("PATH").set(b"/bin");
        env.borrow_mut().get_or_insert("PWD").set(b"/");
        ShellContext {
            vfs,
            env,
            clock: Rc::new(MockClock::new(0)),
            runners: Rc::new(runners),
            terminate: Arc::new(AtomicBool::new(false)),
        }
    }

    #[test]
    fn runs_each_line_and_skips_comments() {
        let ctx = ctx_with_script(b"# comment\nprobe a b\n\nprobe c\n");
        let concrete = Rc::new(RefCell::new(MockTerminal::new(b"")));
        let term: SharedTerminal = concrete.clone();
        run(&ctx, &term, &["script".to_string()]).unwrap();
        assert_eq!(concrete.borrow().output(), b"a,b\r\nc\r\n");
    }

    #[test]
    fn text_script_marker_is_refused() {
        let ctx = ctx_with_script(b"#!not this shell\n");
        let term: SharedTerminal = Rc::new(RefCell::new(MockTerminal::new(b"")));
        assert_eq!(run(&ctx, &term, &["script".to_string()]).unwrap_err(), Error::Invalid);
    }

    #[test]
    fn missing_script_is_entry_error() {
        let ctx = ctx_with_script(b"");
        let term: SharedTerminal = Rc::new(RefCell::new(MockTerminal::new(b"")));
        assert_eq!(run(&ctx, &term, &["missing".to_string()]).unwrap_err(), Error::Entry);
    }
}
