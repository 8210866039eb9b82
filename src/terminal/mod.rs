//! Byte-oriented terminal abstraction with formatted insertion and an
//! input-event subscriber list (§4.1).

pub mod mock;
pub mod proxy;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub use mock::MockTerminal;
pub use proxy::TerminalProxy;

use crate::error::Error;

/// Numeric insertion radix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Decimal,
    Hex,
}

/// Event delivered to subscribers. `SerialInput` carries how many new bytes
/// are available to drain; `Terminate` is Ctrl-C propagation (§5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    SerialInput { length: usize },
    Terminate,
}

/// A script subscribed to a terminal's input events. Dispatch is
/// synchronous (§9: "subscribers must do bounded work").
pub trait Listener {
    fn on_event(&self, event: TerminalEvent) -> Error;
}

/// Byte-level sink/source plus formatted insertion (§4.1). Implementations:
/// [`MockTerminal`] (tests) and [`TerminalProxy`] (§4.8). A concrete serial
/// implementation over a real byte interface is explicitly out of scope (§1).
pub trait Terminal {
    /// Non-blocking; returns 0 when no bytes are currently available.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Writes all of `buf`, looping internally if the sink is partial.
    fn write(&mut self, buf: &[u8]) -> usize;

    fn subscribe(&mut self, listener: Weak<dyn Listener>);
    fn unsubscribe(&mut self, listener: &Weak<dyn Listener>);

    fn set_width(&mut self, width: usize);
    fn set_fill(&mut self, fill: u8);
    fn set_format(&mut self, format: Format);

    fn width(&self) -> usize;
    fn fill(&self) -> u8;
    fn format(&self) -> Format;
}

pub const EOL: &[u8] = b"\r\n";

/// Formatted-insertion helpers layered on top of the raw `Terminal` trait
/// (§4.1's "inserting an integer/EOL/string").
pub trait TerminalExt: Terminal {
    fn insert_eol(&mut self) {
        self.write(EOL);
    }

    fn insert_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    fn insert_int(&mut self, value: i64) {
        let body = match self.format() {
            Format::Decimal => format!("{value}"),
            Format::Hex => format!("{value:X}"),
        };
        let width = self.width();
        let fill = self.fill() as char;
        if body.len() < width {
            let padding: String = std::iter::repeat(fill).take(width - body.len()).collect();
            self.write(padding.as_bytes());
        }
        self.write(body.as_bytes());
    }
}

impl<T: Terminal + ?Sized> TerminalExt for T {}

/// Broadcast `event` to every still-live subscriber in `subscribers`,
/// preserving arrival order and silently dropping listeners that no longer
/// exist (§5 "Ordering").
pub fn notify(subscribers: &[Weak<dyn Listener>], event: TerminalEvent) {
    for weak in subscribers {
        if let Some(listener) = weak.upgrade() {
            let _ = listener.on_event(event);
        }
    }
}

/// Convenience: a shared, mutable handle to any `Terminal` implementation.
pub type SharedTerminal = Rc<RefCell<dyn Terminal>>;

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingListener {
        events: RefCell<Vec<TerminalEvent>>,
    }

    impl Listener for RecordingListener {
        fn on_event(&self, event: TerminalEvent) -> Error {
            self.events.borrow_mut().push(event);
            Error::Ok
        }
    }

    #[test]
    fn insert_int_pads_with_fill_to_width() {
        let mut term = MockTerminal::new(b"");
        term.set_width(4);
        term.set_fill(b'0');
        term.set_format(Format::Decimal);
        term.insert_int(7);
        assert_eq!(term.output(), b"0007");
    }

    #[test]
    fn insert_int_hex_uses_uppercase_digits() {
        let mut term = MockTerminal::new(b"");
        term.set_format(Format::Hex);
        term.insert_int(255);
        assert_eq!(term.output(), b"FF");
    }

    #[test]
    fn insert_eol_writes_cr_lf() {
        let mut term = MockTerminal::new(b"");
        term.insert_eol();
        assert_eq!(term.output(), b"\r\n");
    }

    #[test]
    fn notify_skips_dropped_listeners_without_panicking() {
        let listener = Rc::new(RecordingListener { events: RefCell::new(Vec::new()) });
        let weak: Weak<dyn Listener> = Rc::downgrade(&listener);
        drop(listener);
        notify(&[weak], TerminalEvent::Terminate);
    }

    #[test]
    fn notify_delivers_in_arrival_order() {
        let listener = Rc::new(RecordingListener { events: RefCell::new(Vec::new()) });
        let weak: Weak<dyn Listener> = Rc::downgrade(&listener);
        notify(&[weak], TerminalEvent::SerialInput { length: 3 });
        let weak2: Weak<dyn Listener> = Rc::downgrade(&listener);
        notify(&[weak2], TerminalEvent::Terminate);
        assert_eq!(
            *listener.events.borrow(),
            vec![TerminalEvent::SerialInput { length: 3 }, TerminalEvent::Terminate]
        );
    }
}
