//! Shared state every built-in inherits from its parent shell (§4.12):
//! environment, VFS handle, clock, and the cooperative-cancellation flag.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::clock::Clock;
use crate::environment::Environment;
use crate::error::Result;
use crate::terminal::SharedTerminal;
use crate::vfs::VfsHandle;

/// A built-in's entry point: given the shared context, the (possibly
/// redirected) terminal, and its significant argument slice, run to
/// completion and report the domain result (§4.12, §7).
pub type RunFn = fn(&ShellContext, &SharedTerminal, &[String]) -> Result<()>;

/// One row of the built-in registry (§4.11): the name under `/bin` and the
/// function that implements it.
#[derive(Clone, Copy)]
pub struct Runner {
    pub name: &'static str,
    pub run: RunFn,
}

/// The set of runners an [`super::initializer::Initializer`] has registered,
/// keyed by a slab handle — the safe stand-in for the original's raw
/// "pointer-sized opaque handle" (§3, §4.11).
#[derive(Default)]
pub struct Runners {
    slab: RefCell<slab::Slab<Runner>>,
}

impl Runners {
    pub fn new() -> Self {
        Runners::default()
    }

    pub fn register(&self, runner: Runner) -> usize {
        self.slab.borrow_mut().insert(runner)
    }

    pub fn get(&self, key: usize) -> Option<Runner> {
        self.slab.borrow().get(key).copied()
    }
}

/// Inherited by every built-in (§4.12: "It inherits `env`, `fs`, `time`, and
/// `tty` from the parent" — `tty` is passed separately as the evaluator's
/// terminal proxy, not stored here).
///
/// `terminate` is the one field that must survive a move to another OS
/// thread: a terminal's own input-reader thread sets it directly the moment
/// it sees a Ctrl-C byte (§5 "the shell reads input on a serial callback"),
/// independently of whatever the main shell thread is doing, so it is an
/// `Arc<AtomicBool>` rather than the `Rc<Cell<_>>` used elsewhere in this
/// struct. Everything else stays single-threaded and `Rc`-based.
#[derive(Clone)]
pub struct ShellContext {
    pub vfs: VfsHandle,
    pub env: Rc<RefCell<Environment>>,
    pub clock: Rc<dyn Clock>,
    pub runners: Rc<Runners>,
    pub terminate: Arc<AtomicBool>,
}

impl ShellContext {
    pub fn pwd(&self) -> String {
        self.env.borrow().get("PWD").map(|v| v.value_str()).unwrap_or_else(|| "/".to_string())
    }

    pub fn path(&self) -> String {
        self.env.borrow().get("PATH").map(|v| v.value_str()).unwrap_or_else(|| "/bin".to_string())
    }

    /// Polled by cooperative long-running commands between blocks (§9).
    pub fn should_terminate(&self) -> bool {
        self.terminate.load(Ordering::SeqCst)
    }

    /// Reset before running a new command line so a prior Ctrl-C does not
    /// leak into the next one (§4.10).
    pub fn clear_terminate(&self) {
        self.terminate.store(false, Ordering::SeqCst);
    }
}
