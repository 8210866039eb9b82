//! Bounded line editor with echo (§4.3). Feeds raw bytes through the
//! escape-sequence parser first, then applies simple-editing rules for
//! everything that falls through un-escaped.

use crate::escape::{EscapeParser, Event, Status as EscapeStatus};
use crate::terminal::{Terminal, TerminalExt};

pub const MAX_LINE_LENGTH: usize = 256;

const CTRL_C: u8 = 0x03;
const BACKSPACE: u8 = 0x08;
const DEL: u8 = 0x7F;
const CR: u8 = 0x0D;
const LF: u8 = 0x0A;

/// Outcome of feeding one byte to the line editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The byte was absorbed but the line is not finished.
    Consumed,
    /// CR or LF finished the line; `contents()` has the result.
    Completed,
    /// The byte had no effect (full buffer, backspace at column 0, ...).
    Discarded,
    /// Ctrl-C aborted the line.
    Terminated,
}

pub struct LineParser {
    buffer: Vec<u8>,
    cursor: usize,
    echo: bool,
    escape: EscapeParser,
    last_eol: Option<u8>,
}

impl LineParser {
    pub fn new(echo: bool) -> Self {
        LineParser {
            buffer: Vec::with_capacity(MAX_LINE_LENGTH),
            cursor: 0,
            echo,
            escape: EscapeParser::new(),
            last_eol: None,
        }
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    pub fn contents(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.last_eol = None;
    }

    fn tail_len(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Redraw from the cursor to the end of the buffer, clear any leftover
    /// tail on the terminal, then rewind the cursor back to its column.
    fn redraw_tail(&self, term: &mut dyn Terminal) {
        let tail = &self.buffer[self.cursor..];
        term.write(tail);
        term.write(b"\x1B[K");
        if !tail.is_empty() {
            let seq = format!("\x1B[{}D", tail.len());
            term.write(seq.as_bytes());
        }
    }

    pub fn feed(&mut self, byte: u8, term: &mut dyn Terminal) -> Status {
        match self.escape.feed(byte) {
            EscapeStatus::Consumed => Status::Consumed,
            EscapeStatus::Completed(event) => self.apply_event(event, term),
            EscapeStatus::Discarded => self.apply_literal(byte, term),
        }
    }

    fn apply_event(&mut self, event: Event, term: &mut dyn Terminal) -> Status {
        match event {
            Event::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    term.write(b"\x1B[D");
                }
                Status::Consumed
            }
            Event::Right => {
                if self.cursor < self.buffer.len() {
                    self.cursor += 1;
                    term.write(b"\x1B[C");
                }
                Status::Consumed
            }
            Event::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                    self.redraw_tail(term);
                }
                Status::Consumed
            }
            Event::Up | Event::Down | Event::Undefined => Status::Consumed,
        }
    }

    fn apply_literal(&mut self, byte: u8, term: &mut dyn Terminal) -> Status {
        match byte {
            CTRL_C => {
                if self.echo {
                    term.write(b"^C");
                    term.insert_eol();
                }
                Status::Terminated
            }
            CR | LF => {
                let swallow = matches!(
                    (self.last_eol, byte),
                    (Some(CR), LF) | (Some(LF), CR)
                );
                self.last_eol = Some(byte);
                if swallow {
                    return Status::Consumed;
                }
                if self.echo {
                    term.insert_eol();
                }
                Status::Completed
            }
            BACKSPACE | DEL => {
                self.last_eol = None;
                if self.cursor == 0 {
                    return Status::Discarded;
                }
                self.cursor -= 1;
                self.buffer.remove(self.cursor);
                if self.echo {
                    term.write(b"\x08");
                    self.redraw_tail(term);
                }
                Status::Consumed
            }
            _ => {
                self.last_eol = None;
                if self.buffer.len() >= MAX_LINE_LENGTH {
                    return Status::Discarded;
                }
                self.buffer.insert(self.cursor, byte);
                self.cursor += 1;
                if self.echo {
                    term.write(&[byte]);
                    let tail = self.tail_len();
                    term.write(&self.buffer[self.cursor..]);
                    if tail > 0 {
                        let seq = format!("\x1B[{tail}D");
                        term.write(seq.as_bytes());
                    }
                }
                Status::Consumed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::MockTerminal;

    // ============ Plain typing ============

    #[test]
    fn typing_appends_to_buffer() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(true);
        for b in b"hi" {
            assert_eq!(parser.feed(*b, &mut term), Status::Consumed);
        }
        assert_eq!(parser.contents(), b"hi");
    }

    #[test]
    fn full_buffer_discards_further_input() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(false);
        for _ in 0..MAX_LINE_LENGTH {
            assert_eq!(parser.feed(b'x', &mut term), Status::Consumed);
        }
        assert_eq!(parser.feed(b'x', &mut term), Status::Discarded);
        assert_eq!(parser.contents().len(), MAX_LINE_LENGTH);
    }

    // ============ Completion ============

    #[test]
    fn cr_completes_the_line() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(false);
        parser.feed(b'h', &mut term);
        assert_eq!(parser.feed(CR, &mut term), Status::Completed);
        assert_eq!(parser.contents(), b"h");
    }

    #[test]
    fn lf_after_cr_is_swallowed() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(false);
        assert_eq!(parser.feed(CR, &mut term), Status::Completed);
        assert_eq!(parser.feed(LF, &mut term), Status::Consumed);
    }

    #[test]
    fn echo_writes_eol_on_completion() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(true);
        parser.feed(CR, &mut term);
        assert_eq!(term.output(), b"\r\n");
    }

    // ============ Ctrl-C ============

    #[test]
    fn ctrl_c_terminates_and_echoes() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(true);
        parser.feed(b'x', &mut term);
        assert_eq!(parser.feed(CTRL_C, &mut term), Status::Terminated);
        assert_eq!(term.output(), b"x^C\r\n");
    }

    // ============ Backspace / Delete ============

    #[test]
    fn backspace_at_column_zero_is_discarded() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(false);
        assert_eq!(parser.feed(BACKSPACE, &mut term), Status::Discarded);
    }

    #[test]
    fn backspace_removes_preceding_byte() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(false);
        parser.feed(b'a', &mut term);
        parser.feed(b'b', &mut term);
        parser.feed(BACKSPACE, &mut term);
        assert_eq!(parser.contents(), b"a");
    }

    #[test]
    fn escape_delete_removes_byte_at_cursor() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(false);
        parser.feed(b'a', &mut term);
        parser.feed(b'b', &mut term);
        parser.feed(0x1B, &mut term);
        parser.feed(b'[', &mut term);
        parser.feed(b'D', &mut term);
        assert_eq!(parser.feed(0x1B, &mut term), Status::Consumed);
        parser.feed(b'[', &mut term);
        parser.feed(b'3', &mut term);
        parser.feed(b'~', &mut term);
        assert_eq!(parser.contents(), b"a");
    }

    // ============ Cursor movement ============

    #[test]
    fn arrow_left_then_insert_is_mid_line() {
        let mut term = MockTerminal::new(b"");
        let mut parser = LineParser::new(false);
        parser.feed(b'a', &mut term);
        parser.feed(b'c', &mut term);
        parser.feed(0x1B, &mut term);
        parser.feed(b'[', &mut term);
        parser.feed(b'D', &mut term);
        parser.feed(b'b', &mut term);
        assert_eq!(parser.contents(), b"abc");
    }
}
