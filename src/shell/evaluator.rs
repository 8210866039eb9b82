//! Command resolution and dispatch (§4.9). `run` turns `args[0]` plus
//! `args[1..]` into a resolved built-in invocation, wiring a terminal proxy
//! over any `<`/`>`/`>>` redirection before calling the runner.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::context::ShellContext;
use crate::error::{Error, Result};
use crate::terminal::{Listener, SharedTerminal, Terminal, TerminalProxy};
use crate::vfs::{path, Field};

const EXEC_MAGIC: [u8; 4] = [0x7F, b'B', b'I', b'N'];
const TEXT_MAGIC: [u8; 2] = [b'#', b'!'];

/// Scan `args` (the command's arguments, command name already stripped)
/// for redirection operators. The "significant" slice fed to the command
/// is everything before the first redirection token; input/output paths
/// are independently resolved over the whole tail so `cmd < a > b` works.
fn scan_redirection(args: &[String]) -> (Vec<String>, Option<String>, Option<String>, bool) {
    let mut first_redirect = args.len();
    for (i, token) in args.iter().enumerate() {
        if matches!(token.as_str(), "<" | ">" | ">>") && i + 1 < args.len() {
            first_redirect = first_redirect.min(i);
        }
    }
    let significant = args[..first_redirect].to_vec();

    let mut input = None;
    let mut output = None;
    let mut append = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "<" if i + 1 < args.len() => {
                input = Some(args[i + 1].clone());
                i += 2;
            }
            ">" if i + 1 < args.len() => {
                output = Some(args[i + 1].clone());
                append = false;
                i += 2;
            }
            ">>" if i + 1 < args.len() => {
                output = Some(args[i + 1].clone());
                append = true;
                i += 2;
            }
            _ => i += 1,
        }
    }
    (significant, input, output, append)
}

fn resolve_command(ctx: &ShellContext, name: &str) -> Result<crate::vfs::NodeRef> {
    let root = ctx.vfs.root()?;
    if name.starts_with('/') {
        return path::open_node(&root, name);
    }
    let via_path = path::join(&ctx.path(), name);
    if let Ok(node) = path::open_node(&root, &via_path) {
        return Ok(node);
    }
    let via_pwd = path::join(&ctx.pwd(), name);
    path::open_node(&root, &via_pwd)
}

/// Resolve, wire redirection, and run `args[0]` with `args[1..]`.
pub fn run(ctx: &ShellContext, parent: &SharedTerminal, args: &[String]) -> Result<()> {
    let name = args.first().ok_or(Error::Invalid)?;
    let (significant, input_path, output_path, append) = scan_redirection(&args[1..]);

    let node = resolve_command(ctx, name).inspect_err(|_| {
        warn!(command = %name, "command resolution failed");
    })?;
    debug!(command = %name, "resolved command node");

    let mut header = [0u8; 4];
    let read = crate::vfs::read(&node, Field::Data, 0, &mut header)?;
    if read >= 2 && header[..2] == TEXT_MAGIC {
        return Err(Error::Invalid);
    }
    if read < header.len() || header != EXEC_MAGIC {
        return Err(Error::Invalid);
    }
    let mut key_bytes = [0u8; 8];
    crate::vfs::read(&node, Field::Data, 4, &mut key_bytes)?;
    let key = usize::from_le_bytes(key_bytes);
    let runner = ctx.runners.get(key).ok_or(Error::Invalid)?;

    let root = ctx.vfs.root()?;
    let input_node = match &input_path {
        Some(p) => Some(path::open_source(&root, &path::join(&ctx.pwd(), p))?),
        None => None,
    };
    let output_node = match &output_path {
        Some(p) => Some(path::open_sink(&root, &path::join(&ctx.pwd(), p), append)?),
        None => None,
    };

    let proxy = TerminalProxy::new(parent.clone(), input_node, output_node, append, ctx.terminate.clone());
    let proxy_cell = Rc::new(RefCell::new(proxy));
    let proxy_term: SharedTerminal = proxy_cell.clone();

    // Subscribe the proxy itself to the parent terminal so a Ctrl-C raised
    // while this command runs is delivered straight into `ctx.terminate`
    // (§4.9 step 4); the guard unsubscribes on every exit path, including `?`.
    let listener: Weak<dyn Listener> = Rc::downgrade(&proxy_cell);
    parent.borrow_mut().subscribe(listener.clone());
    let _unsubscribe = UnsubscribeOnDrop { parent, listener };

    (runner.run)(ctx, &proxy_term, &significant)
}

/// Unsubscribes `listener` from `parent` when dropped, guaranteeing the
/// proxy never outlives its subscription even if the runner returns early.
struct UnsubscribeOnDrop<'a> {
    parent: &'a SharedTerminal,
    listener: Weak<dyn Listener>,
}

impl Drop for UnsubscribeOnDrop<'_> {
    fn drop(&mut self) {
        self.parent.borrow_mut().unsubscribe(&self.listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::shell::clock::MockClock;
    use crate::shell::context::{Runner, Runners};
    use crate::terminal::MockTerminal;
    use crate::vfs::{Descriptor, VfsHandle};
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn echo_args_run(_ctx: &ShellContext, term: &SharedTerminal, args: &[String]) -> Result<()> {
        term.borrow_mut().write(args.join(",").as_bytes());
        Ok(())
    }

    fn make_context() -> (ShellContext, Rc<RefCell<MockTerminal>>, SharedTerminal) {
        let vfs = VfsHandle::new();
        let root = vfs.root().unwrap();
        crate::vfs::create(&root, vec![Descriptor::Name("bin".into())]).unwrap();
        let bin = path::open_node(&root, "/bin").unwrap();

        let runners = Runners::new();
        let key = runners.register(Runner { name: "probe", run: echo_args_run });
        let mut content = EXEC_MAGIC.to_vec();
        content.extend_from_slice(&(key as u64).to_le_bytes());
        crate::vfs::create(&bin, vec![Descriptor::Name("probe".into()), Descriptor::Data(content)]).unwrap();

        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().get_or_insert("PATH").set(b"/bin");
        env.borrow_mut().get_or_insert("PWD").set(b"/");

        let ctx = ShellContext {
            vfs,
            env,
            clock: Rc::new(MockClock::new(0)),
            runners: Rc::new(runners),
            terminate: Arc::new(AtomicBool::new(false)),
        };
        let concrete = Rc::new(RefCell::new(MockTerminal::new(b"")));
        let term: SharedTerminal = concrete.clone();
        (ctx, concrete, term)
    }

    // ============ Resolution ============

    #[test]
    fn resolves_command_via_path_and_invokes_it() {
        let (ctx, concrete, term) = make_context();
        run(&ctx, &term, &["probe".to_string(), "a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(concrete.borrow().output(), b"a,b");
    }

    #[test]
    fn unknown_command_is_entry_error() {
        let (ctx, _concrete, term) = make_context();
        assert_eq!(run(&ctx, &term, &["nope".to_string()]).unwrap_err(), Error::Entry);
    }

    // ============ Cancellation subscription ============

    #[test]
    fn run_subscribes_the_proxy_and_unsubscribes_once_done() {
        let (ctx, concrete, term) = make_context();
        assert_eq!(concrete.borrow().subscriber_count(), 0);
        run(&ctx, &term, &["probe".to_string()]).unwrap();
        assert_eq!(concrete.borrow().subscriber_count(), 0);
    }

    fn terminate_checking_run(ctx: &ShellContext, _term: &SharedTerminal, _args: &[String]) -> Result<()> {
        if ctx.should_terminate() {
            return Err(Error::Error);
        }
        Ok(())
    }

    #[test]
    fn ctrl_c_raised_to_parent_reaches_ctx_terminate_before_the_runner_returns() {
        let vfs = VfsHandle::new();
        let root = vfs.root().unwrap();
        crate::vfs::create(&root, vec![Descriptor::Name("bin".into())]).unwrap();
        let bin = path::open_node(&root, "/bin").unwrap();
        let runners = Runners::new();
        let key = runners.register(Runner { name: "slow", run: terminate_checking_run });
        let mut content = EXEC_MAGIC.to_vec();
        content.extend_from_slice(&(key as u64).to_le_bytes());
        crate::vfs::create(&bin, vec![Descriptor::Name("slow".into()), Descriptor::Data(content)]).unwrap();

        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().get_or_insert("PATH").set(b"/bin");
        env.borrow_mut().get_or_insert("PWD").set(b"/");
        let ctx = ShellContext {
            vfs,
            env,
            clock: Rc::new(MockClock::new(0)),
            runners: Rc::new(runners),
            terminate: Arc::new(AtomicBool::new(false)),
        };
        let concrete = Rc::new(RefCell::new(MockTerminal::new(b"")));
        let term: SharedTerminal = concrete.clone();

        // A Ctrl-C arriving on the parent's subscriber chain while "slow" is
        // in flight should already be visible to the next poll, regardless
        // of whether the byte ever reaches the REPL's own line editor.
        ctx.terminate.store(true, std::sync::atomic::Ordering::SeqCst);
        let result = run(&ctx, &term, &["slow".to_string()]);
        assert_eq!(result.unwrap_err(), Error::Error);
    }

    // ============ Redirection scanning ============

    #[test]
    fn scan_redirection_splits_significant_slice_before_first_operator() {
        let args = vec!["a".to_string(), "<".to_string(), "in".to_string(), "b".to_string()];
        let (significant, input, output, append) = scan_redirection(&args);
        assert_eq!(significant, vec!["a".to_string()]);
        assert_eq!(input, Some("in".to_string()));
        assert_eq!(output, None);
        assert!(!append);
    }

    #[test]
    fn scan_redirection_detects_append_operator() {
        let args = vec![">>".to_string(), "out".to_string()];
        let (_, _, output, append) = scan_redirection(&args);
        assert_eq!(output, Some("out".to_string()));
        assert!(append);
    }
}
