//! Entry point for an interactive (or scripted) shell session over real
//! stdio. No dependencies beyond what the library already pulls in.

use std::cell::{RefCell, Weak};
use std::io::{Read, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vfsh::error::{Error, HostError};
use vfsh::shell::clock::SystemClock;
use vfsh::shell::{Initializer, Repl, ShellContext};
use vfsh::terminal::{Format, Listener, SharedTerminal, Terminal};
use vfsh::vfs::VfsHandle;

const CTRL_C: u8 = 0x03;

#[derive(Parser)]
#[command(name = "serve", about = "Run the virtual-filesystem shell")]
struct Args {
    /// Directory to start the session in; must already exist in the VFS.
    #[arg(long, default_value = "/")]
    cwd: String,

    /// Run this script non-interactively instead of reading a terminal.
    #[arg(long)]
    script: Option<String>,

    /// Raise the tracing filter level; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// A thin sink/source over the process's own stdin/stdout. Reads are
/// best-effort and non-blocking the way [`Terminal::read`] requires: a
/// background thread drains stdin into a channel and `read` drains whatever
/// has arrived so far without blocking the REPL's byte-feeding loop.
///
/// That background thread is also the only path by which a Ctrl-C can reach
/// a command already running on the main thread (§5): `feed_byte` calls the
/// evaluator synchronously, so the main thread cannot notice new input until
/// the command returns. The reader thread sidesteps that by setting the
/// shared `terminate` flag itself, directly, the moment it sees `0x03` — the
/// same "serial callback" delivery the spec describes, independent of
/// whatever the main shell thread is blocked on.
struct StdioTerminal {
    input: std::sync::mpsc::Receiver<u8>,
    width: usize,
    fill: u8,
    format: Format,
}

impl StdioTerminal {
    fn new(terminate: Arc<AtomicBool>) -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let mut byte = [0u8; 1];
            let mut stdin = std::io::stdin();
            while stdin.read_exact(&mut byte).is_ok() {
                if byte[0] == CTRL_C {
                    terminate.store(true, Ordering::SeqCst);
                }
                if tx.send(byte[0]).is_err() {
                    break;
                }
            }
        });
        StdioTerminal { input: rx, width: 0, fill: b' ', format: Format::Decimal }
    }
}

impl Terminal for StdioTerminal {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.input.try_recv() {
                Ok(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                Err(_) => break,
            }
        }
        n
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(buf);
        let _ = stdout.flush();
        buf.len()
    }

    fn subscribe(&mut self, _listener: Weak<dyn Listener>) {}
    fn unsubscribe(&mut self, _listener: &Weak<dyn Listener>) {}

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

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run `script`'s lines one at a time through the evaluator, the same way
/// the `sh` built-in does, but against the top-level context rather than a
/// nested invocation.
fn run_script(ctx: &ShellContext, term: &SharedTerminal, script: &str) -> Result<(), HostError> {
    let node = vfsh::vfs::path::open_node(&ctx.vfs.root()?, script)
        .map_err(|err| HostError::Init(format!("{script}: {}", err.name())))?;
    let length = vfsh::vfs::length(&node, vfsh::vfs::Field::Data)? as usize;
    let mut contents = vec![0u8; length];
    vfsh::vfs::read(&node, vfsh::vfs::Field::Data, 0, &mut contents)?;
    let text = String::from_utf8_lossy(&contents);

    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let tokens = match vfsh::shell::tokenizer::tokenize(line) {
            Ok(tokens) => tokens,
            Err(Error::Empty) => continue,
            Err(err) => return Err(HostError::Init(err.name().to_string())),
        };
        vfsh::shell::evaluator::run(ctx, term, &tokens).map_err(|err| {
            eprintln!("sh: command failed, error code {}", err.name());
            HostError::Init(err.name().to_string())
        })?;
    }
    Ok(())
}

fn main() -> Result<(), HostError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let init = Initializer::new(VfsHandle::new(), Rc::new(SystemClock))?;
    init.ctx.env.borrow_mut().get_or_insert("PWD").set(args.cwd.as_bytes());
    info!(cwd = %args.cwd, "shell session starting");

    let term: SharedTerminal = Rc::new(RefCell::new(StdioTerminal::new(init.ctx.terminate.clone())));

    if let Some(script) = &args.script {
        return run_script(&init.ctx, &term, script);
    }

    let mut repl = Repl::new(init.ctx.clone(), term.clone(), false);
    repl.print_prompt();
    loop {
        let mut buf = [0u8; 1];
        let n = term.borrow_mut().read(&mut buf);
        if n == 0 {
            std::thread::sleep(std::time::Duration::from_millis(10));
            continue;
        }
        if !repl.feed_byte(buf[0]) {
            break;
        }
    }
    Ok(())
}
