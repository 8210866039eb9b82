//! The shell's read-eval-print loop (§4.10): drains a terminal's input a
//! byte at a time through the line editor, tokenises completed lines, and
//! dispatches them through the evaluator.

use tracing::{info, warn};

use super::context::ShellContext;
use super::tokenizer;
use crate::error::Error;
use crate::line::{LineParser, Status as LineStatus};
use crate::terminal::{SharedTerminal, Terminal, TerminalExt};

/// Mirrors §3's shell session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Executing,
    Stopped,
}

/// Owns the line editor and session state for one interactive shell. Reads
/// come from whatever drives `feed_byte` — real stdin in `serve`, or a
/// fixed byte sequence in tests.
pub struct Repl {
    ctx: ShellContext,
    term: SharedTerminal,
    line: LineParser,
    state: State,
    scripted: bool,
}

impl Repl {
    pub fn new(ctx: ShellContext, term: SharedTerminal, scripted: bool) -> Self {
        Repl { ctx, term, line: LineParser::new(true), state: State::Idle, scripted }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Print the `${PWD}> ` prompt, suppressed in scripted mode.
    pub fn print_prompt(&self) {
        if self.scripted {
            return;
        }
        self.term.borrow_mut().write(format!("{}> ", self.ctx.pwd()).as_bytes());
    }

    /// Feed one byte from the input source into the line editor, running a
    /// command when a line completes. Returns `true` if the session should
    /// keep running.
    pub fn feed_byte(&mut self, byte: u8) -> bool {
        if self.state == State::Stopped {
            return false;
        }
        let mut term = self.term.borrow_mut();
        let status = self.line.feed(byte, &mut *term);
        drop(term);

        match status {
            LineStatus::Consumed | LineStatus::Discarded => true,
            LineStatus::Terminated => {
                // Raise the same flag a subscriber-chain Ctrl-C would (§5):
                // idle or not, anything still polling `should_terminate`
                // must see it, not just this REPL's own state machine.
                self.ctx.terminate.store(true, std::sync::atomic::Ordering::SeqCst);
                self.state = State::Stopped;
                false
            }
            LineStatus::Completed => {
                let line = String::from_utf8_lossy(self.line.contents()).into_owned();
                self.line.clear();
                self.run_line(&line);
                if self.state != State::Stopped {
                    self.print_prompt();
                }
                self.state != State::Stopped
            }
        }
    }

    fn run_line(&mut self, line: &str) {
        if line.trim_start().starts_with('#') {
            return;
        }
        let tokens = match tokenizer::tokenize(line) {
            Ok(tokens) => tokens,
            Err(Error::Empty) => return,
            Err(err) => {
                warn!(%err, "tokenization failed");
                self.ctx.env.borrow_mut().get_or_insert("?").set(err.name().as_bytes());
                return;
            }
        };

        self.state = State::Executing;
        // A Ctrl-C from a previous line must not leak in and instantly
        // cancel a command that hasn't had a chance to run yet.
        self.ctx.clear_terminate();
        let result = super::evaluator::run(&self.ctx, &self.term, &tokens);
        if self.state == State::Executing {
            self.state = State::Idle;
        }

        let kind = match &result {
            Ok(()) => Error::Ok,
            Err(err) => *err,
        };
        self.ctx.env.borrow_mut().get_or_insert("?").set(kind.name().as_bytes());

        if let Err(err) = result {
            info!(%err, command = tokens.first().map(String::as_str).unwrap_or(""), "command failed");
            let mut t = self.term.borrow_mut();
            t.insert_str(&format!("sh: command failed, error code {}", err.name()));
            t.insert_eol();
        }
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
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    const EXEC_MAGIC: [u8; 4] = [0x7F, b'B', b'I', b'N'];

    fn ok_run(_ctx: &ShellContext, _term: &SharedTerminal, _args: &[String]) -> crate::error::Result<()> {
        Ok(())
    }

    fn fail_run(_ctx: &ShellContext, _term: &SharedTerminal, _args: &[String]) -> crate::error::Result<()> {
        Err(Error::Device)
    }

    fn make_repl(run: super::super::context::RunFn, name: &str) -> (Repl, Rc<RefCell<MockTerminal>>) {
        let vfs = VfsHandle::new();
        let root = vfs.root().unwrap();
        crate::vfs::create(&root, vec![Descriptor::Name("bin".into())]).unwrap();
        let bin = crate::vfs::path::open_node(&root, "/bin").unwrap();

        let runners = Runners::new();
        let key = runners.register(Runner { name: "cmd", run });
        let mut content = EXEC_MAGIC.to_vec();
        content.extend_from_slice(&(key as u64).to_le_bytes());
        crate::vfs::create(&bin, vec![Descriptor::Name(name.into()), Descriptor::Data(content)]).unwrap();

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
        (Repl::new(ctx, term, true), concrete)
    }

    fn feed_all(repl: &mut Repl, bytes: &[u8]) {
        for &b in bytes {
            repl.feed_byte(b);
        }
    }

    // ============ Line completion dispatch ============

    #[test]
    fn completed_line_runs_the_named_command() {
        let (mut repl, _term) = make_repl(ok_run, "cmd");
        feed_all(&mut repl, b"cmd\r\n");
        assert_eq!(repl.ctx.env.borrow().get("?").unwrap().value_str(), "Ok");
    }

    #[test]
    fn comment_line_is_skipped() {
        let (mut repl, term) = make_repl(ok_run, "cmd");
        feed_all(&mut repl, b"# not a command\r\n");
        assert_eq!(term.borrow().output(), b"");
    }

    #[test]
    fn failing_command_prints_diagnostic_and_updates_status() {
        let (mut repl, term) = make_repl(fail_run, "cmd");
        feed_all(&mut repl, b"cmd\r\n");
        assert_eq!(repl.ctx.env.borrow().get("?").unwrap().value_str(), "Device");
        assert!(term.borrow().output().ends_with(b"sh: command failed, error code Device\r\n"));
    }

    // ============ Ctrl-C ============

    #[test]
    fn ctrl_c_stops_the_session() {
        let (mut repl, _term) = make_repl(ok_run, "cmd");
        let keep_going = repl.feed_byte(0x03);
        assert!(!keep_going);
        assert_eq!(repl.state(), State::Stopped);
    }
}
