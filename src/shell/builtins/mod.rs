//! The built-in command table (§6). Order here is the order the
//! initializer registers runners in, which fixes `ls /bin`'s enumeration
//! order (§4.11: directory children are insertion-ordered).

pub mod cat;
pub mod cd;
pub mod chmod;
mod common;
pub mod cksum;
pub mod cp;
pub mod date;
pub mod dd;
pub mod echo;
pub mod env;
pub mod exit;
pub mod getenv;
pub mod hexdump;
pub mod ls;
pub mod man;
pub mod mkdir;
pub mod mount;
pub mod rm;
pub mod setenv;
pub mod sh;
pub mod time;

use super::context::RunFn;

/// `(name, entry point)` pairs in §6 table order.
pub const REGISTRY: &[(&str, RunFn)] = &[
    ("cd", cd::run),
    ("ls", ls::run),
    ("cat", cat::run),
    ("hexdump", hexdump::run),
    ("cp", cp::run),
    ("dd", dd::run),
    ("rm", rm::run),
    ("mkdir", mkdir::run),
    ("chmod", chmod::run),
    ("cksum", cksum::run),
    ("echo", echo::run),
    ("env", env::run),
    ("getenv", getenv::run),
    ("setenv", setenv::run),
    ("date", date::run),
    ("time", time::run),
    ("sh", sh::run),
    ("exit", exit::run),
    ("mount", mount::run),
    ("man", man::run),
];
