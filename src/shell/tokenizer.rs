//! Whitespace/quote tokeniser for one completed line (§4.10, §6 grammar).

use crate::error::{Error, Result};

const MAX_TOKENS: usize = 16;

/// Split `line` into tokens. Trailing control bytes are trimmed first;
/// `"` toggles a quoted region that suppresses whitespace splitting and is
/// itself stripped from the output. Empty input is `Empty`; more than
/// [`MAX_TOKENS`] tokens is `Full`.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let trimmed = line.trim_end_matches(|c: char| (c as u32) < 0x20);

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut active = false;
    let mut in_quotes = false;

    for c in trimmed.chars() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            } else {
                current.push(c);
            }
            continue;
        }
        if c == '"' {
            in_quotes = true;
            active = true;
        } else if c.is_whitespace() {
            if active {
                tokens.push(std::mem::take(&mut current));
                active = false;
            }
        } else {
            current.push(c);
            active = true;
        }
    }
    if active {
        tokens.push(current);
    }

    if tokens.is_empty() {
        return Err(Error::Empty);
    }
    if tokens.len() > MAX_TOKENS {
        return Err(Error::Full);
    }
    Ok(tokens)
}
