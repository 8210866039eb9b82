//! Terminal proxy: substitutes VFS node I/O for the underlying terminal
//! when `<`/`>`/`>>` redirection is in play (§4.8).

use std::cell::RefCell;
use std::rc::Weak;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Format, Listener, SharedTerminal, Terminal, TerminalEvent};
use crate::error::Error;
use crate::vfs::{self, Field, NodeRef};

/// Wraps another terminal for the duration of one command invocation, and is
/// itself the [`Listener`] the evaluator subscribes to the parent terminal
/// (§4.9 step 4): a Ctrl-C delivered to the parent while this command is
/// running reaches the proxy's `on_event` and raises the shared `terminate`
/// flag the command is expected to poll.
pub struct TerminalProxy {
    parent: SharedTerminal,
    input_node: Option<NodeRef>,
    input_offset: u64,
    output_node: Option<NodeRef>,
    output_offset: u64,
    listener: Option<Weak<dyn Listener>>,
    terminate: Arc<AtomicBool>,
    width: usize,
    fill: u8,
    format: Format,
}

impl TerminalProxy {
    pub fn new(
        parent: SharedTerminal,
        input_node: Option<NodeRef>,
        output_node: Option<NodeRef>,
        append: bool,
        terminate: Arc<AtomicBool>,
    ) -> Self {
        let output_offset = if append {
            output_node.as_ref().map(|n| vfs::length(n, Field::Data).unwrap_or(0)).unwrap_or(0)
        } else {
            0
        };
        TerminalProxy {
            parent,
            input_node,
            input_offset: 0,
            output_node,
            output_offset,
            listener: None,
            terminate,
            width: 0,
            fill: b' ',
            format: Format::Decimal,
        }
    }
}

impl Listener for TerminalProxy {
    fn on_event(&self, event: TerminalEvent) -> Error {
        if let TerminalEvent::Terminate = event {
            self.terminate.store(true, Ordering::SeqCst);
        }
        Error::Ok
    }
}

/// Lets `Rc<RefCell<TerminalProxy>>` itself be coerced to `Rc<dyn Listener>`
/// so the same allocation serves both as the command's [`Terminal`] and as
/// the subscriber the evaluator registers with the parent.
impl Listener for RefCell<TerminalProxy> {
    fn on_event(&self, event: TerminalEvent) -> Error {
        self.borrow().on_event(event)
    }
}

impl Terminal for TerminalProxy {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        match &self.input_node {
            Some(node) => {
                let n = vfs::read(node, Field::Data, self.input_offset, buf).unwrap_or(0);
                self.input_offset += n as u64;
                n
            }
            None => self.parent.borrow_mut().read(buf),
        }
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        match &self.output_node {
            Some(node) => {
                let n = vfs::write(node, Field::Data, self.output_offset, buf).unwrap_or(0);
                self.output_offset += n as u64;
                n
            }
            None => self.parent.borrow_mut().write(buf),
        }
    }

    fn subscribe(&mut self, listener: Weak<dyn Listener>) {
        self.listener = Some(listener);
    }

    fn unsubscribe(&mut self, listener: &Weak<dyn Listener>) {
        if let Some(existing) = &self.listener {
            if Weak::ptr_eq(existing, listener) {
                self.listener = None;
            }
        }
    }

    fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    fn set_fill(&mut self, fill: u8) {
        self.fill = fill;
    }

    fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    fn width(&self) -> usize {
        self.width
    }

    fn fill(&self) -> u8 {
        self.fill
    }

    fn format(&self) -> Format {
        self.format
    }
}
