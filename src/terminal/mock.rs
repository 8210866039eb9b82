//! A deterministic terminal double: reads come from a pre-loaded byte
//! queue, writes append to a captured log a test can inspect verbatim.

use std::collections::VecDeque;
use std::rc::Weak;

use super::{Format, Listener, Terminal, TerminalEvent, notify};

pub struct MockTerminal {
    input: VecDeque<u8>,
    output: Vec<u8>,
    subscribers: Vec<Weak<dyn Listener>>,
    width: usize,
    fill: u8,
    format: Format,
}

impl MockTerminal {
    pub fn new(preloaded_input: &[u8]) -> Self {
        MockTerminal {
            input: preloaded_input.iter().copied().collect(),
            output: Vec::new(),
            subscribers: Vec::new(),
            width: 0,
            fill: b' ',
            format: Format::Decimal,
        }
    }

    /// Append more bytes to the input queue and notify subscribers, as a
    /// real serial driver's completion callback would (§4.1, §9).
    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
        notify(&self.subscribers, TerminalEvent::SerialInput { length: bytes.len() });
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|w| w.strong_count() > 0).count()
    }
}

impl Terminal for MockTerminal {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        self.output.extend_from_slice(buf);
        buf.len()
    }

    fn subscribe(&mut self, listener: Weak<dyn Listener>) {
        self.subscribers.push(listener);
    }

    fn unsubscribe(&mut self, listener: &Weak<dyn Listener>) {
        self.subscribers.retain(|existing| !Weak::ptr_eq(existing, listener));
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
