//! Declarative argument parser shared by every built-in (§4.4).

use crate::terminal::Terminal;

/// One recognised option, or the positional catch-all when `name` is `None`.
pub struct Descriptor<T> {
    pub name: Option<&'static str>,
    pub metavar: Option<&'static str>,
    pub info: &'static str,
    pub count: usize,
    pub setter: fn(&mut T, Option<&str>),
}

/// Walk `args` left to right, dispatching each token to the descriptor it
/// matches (or the positional descriptor when nothing matches by name).
/// A count-1 option missing its value is silently skipped.
pub fn parse<T: Default>(args: &[String], descriptors: &[Descriptor<T>]) -> T {
    let mut out = T::default();
    let mut i = 0;
    while i < args.len() {
        let token = args[i].as_str();
        if let Some(descriptor) = descriptors.iter().find(|d| d.name == Some(token)) {
            if descriptor.count == 0 {
                (descriptor.setter)(&mut out, None);
                i += 1;
            } else if i + 1 < args.len() {
                (descriptor.setter)(&mut out, Some(&args[i + 1]));
                i += 2;
            } else {
                i += 1;
            }
        } else if let Some(positional) = descriptors.iter().find(|d| d.name.is_none()) {
            (positional.setter)(&mut out, Some(token));
            i += 1;
        } else {
            i += 1;
        }
    }
    out
}

/// Same traversal as [`parse`], but `callback` is invoked for every token
/// that is not a recognised option name or an option's consumed value.
/// Used by multi-target commands such as `rm` and `cp`.
pub fn invoke<T>(args: &[String], descriptors: &[Descriptor<T>], mut callback: impl FnMut(&str)) {
    let mut i = 0;
    while i < args.len() {
        let token = args[i].as_str();
        if let Some(descriptor) = descriptors.iter().find(|d| d.name == Some(token)) {
            if descriptor.count == 0 {
                i += 1;
            } else if i + 1 < args.len() {
                i += 2;
            } else {
                i += 1;
            }
        } else {
            callback(token);
            i += 1;
        }
    }
}

/// Print `Usage: <name> [OPTION]... [ARGS]` followed by one line per
/// descriptor naming its metavar and info string.
pub fn help<T>(term: &mut dyn Terminal, name: &str, descriptors: &[Descriptor<T>]) {
    let usage = format!("Usage: {name} [OPTION]... [ARGS]\r\n");
    term.write(usage.as_bytes());
    for descriptor in descriptors {
        let label = descriptor.name.or(descriptor.metavar).unwrap_or("ARG");
        let line = format!("  {label:<12}{}\r\n", descriptor.info);
        term.write(line.as_bytes());
    }
}

/// Shared `--help` gate every built-in runs its arguments through before
/// its own descriptor-driven parse.
pub fn check_help(args: &[String], usage: &str) -> Option<String> {
    if args.iter().any(|a| a == "--help") {
        Some(usage.to_string())
    } else {
        None
    }
}
