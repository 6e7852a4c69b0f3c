mod buffer;
mod error;
mod format;
mod proc;
mod reader;
mod shim;
mod signal;
mod status;
mod writer;

use crate::buffer::{BufferPool, RecordQueue};
use crate::format::StreamTag;
use crate::proc::ChildProc;
use crate::status::*;
use crate::writer::OutputWriter;
use clap::Parser;
use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about = "mix std{out,err} of a command", long_about = None)]
struct Args {
    /// Duplicate output to file.
    #[arg(short, long, value_name = "FILENAME")]
    tee: Option<String>,

    /// Append to output file instead of overwriting.
    #[arg(short, long, default_value_t = false)]
    append: bool,

    /// Command to run.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Basename of our own argv[0], used in banners and error messages.
fn self_name() -> String {
    env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name()?.to_str().map(String::from))
        .unwrap_or_else(|| "stlog".to_string())
}

fn main() {
    let self_name = self_name();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}: {}", self_name, err);
            process::exit(EXIT_USAGE);
        }
    };

    let cmd0 = &args.command[0];

    // Quiesce INT/TERM before any thread or blocking work: from here
    // on, an interrupt exits with 128+signum instead of a default kill
    // or a panic trace.
    if let Err(err) = signal::init_parent_signals() {
        eprintln!("{}: error: can't set up signal handling: {}", self_name, err);
        process::exit(EXIT_FAILURE);
    }
    signal::spawn_quiescer();

    // Open output sink. A tee file that can't be opened is fatal, we
    // never fall back to stdout-only silently.
    let mut out = match OutputWriter::open(args.tee.as_deref(), args.append) {
        Ok(out) => out,
        Err(err) => {
            eprintln!(
                "{}: error: can't open output file \"{}\": {}",
                self_name,
                args.tee.as_deref().unwrap_or(""),
                err
            );
            process::exit(EXIT_FAILURE);
        }
    };

    // Startup banners. These go through the sink, so they land in the
    // tee file too.
    let exec_banner = format!("{}:exec:'{}'\n", self_name, args.command.join(" "));
    if let Err(err) = out.write_banner(&exec_banner) {
        eprintln!("{}: error: can't write output: {}", self_name, err);
        process::exit(EXIT_FAILURE);
    }
    if out.ondisk() {
        let log_banner = format!("{}:log:'{}'\n", self_name, out.path().unwrap().display());
        if let Err(err) = out.write_banner(&log_banner) {
            eprintln!("{}: error: can't write output: {}", self_name, err);
            process::exit(EXIT_FAILURE);
        }
    }

    // Launch child with separate stdout/stderr pipes.
    let mut child = match ChildProc::spawn(&args.command) {
        Ok(child) => child,
        Err(err) => {
            eprintln!(
                "{}: error: can't execute command \"{}\": {}",
                self_name, cmd0, err
            );
            process::exit(EXIT_COMMAND_FAILED);
        }
    };

    // Thread-safe buffer pool and record queue.
    let buf_pool = Arc::new(BufferPool::new());
    let rec_queue = Arc::new(RecordQueue::new(2));

    // One reader thread per pipe. Each pushes stamped lines as soon as
    // they arrive, so a silent stream never delays the busy one.
    let stdout_thread =
        reader::spawn_stream_reader(StreamTag::Stdout, child.take_stdout(), &buf_pool, &rec_queue);
    let stderr_thread =
        reader::spawn_stream_reader(StreamTag::Stderr, child.take_stderr(), &buf_pool, &rec_queue);

    // Consume records in arrival order and write tagged lines.
    // pop() returns None only once both pipes are fully drained, so
    // output produced between child exit and pipe close is still
    // delivered.
    let mut prefix = String::new();
    while let Some(rec) = rec_queue.pop() {
        prefix.clear();
        format::format_prefix(&mut prefix, rec.stream, rec.stamp).unwrap();

        if let Err(err) = out.write_record(prefix.as_bytes(), &rec.line) {
            eprintln!("{}: error: can't write output: {}", self_name, err);
            process::exit(EXIT_FAILURE);
        }
    }

    stdout_thread.join().unwrap();
    stderr_thread.join().unwrap();

    // Both pipes are closed, so the child has exited (or dropped its
    // ends); usually a non-blocking poll is enough to reap it.
    let rc = {
        let polled = match child.poll_status() {
            Ok(polled) => polled,
            Err(err) => {
                eprintln!("{}: error: can't wait command \"{}\": {}", self_name, cmd0, err);
                process::exit(EXIT_COMMAND_FAILED);
            }
        };
        match polled {
            Some(rc) => rc,
            None => match child.wait() {
                Ok(rc) => rc,
                Err(err) => {
                    eprintln!(
                        "{}: error: can't wait command \"{}\": {}",
                        self_name, cmd0, err
                    );
                    process::exit(EXIT_COMMAND_FAILED);
                }
            },
        }
    };

    // Shutdown banner, then forward the child's exit code as our own.
    let rc_banner = format!("{}:rc:{}\n", self_name, rc);
    if let Err(err) = out.write_banner(&rc_banner) {
        eprintln!("{}: error: can't write output: {}", self_name, err);
        process::exit(EXIT_FAILURE);
    }
    if let Err(err) = out.close() {
        eprintln!("{}: error: can't close output: {}", self_name, err);
        process::exit(EXIT_FAILURE);
    }

    process::exit(rc);
}
