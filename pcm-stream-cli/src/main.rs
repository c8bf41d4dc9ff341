//! Command-driven PCM device exerciser.
//!
//! One-shot mode runs a single `playpcm`/`recpcm` command given on
//! the command line and waits for the session to finish; with no
//! command it drops into an interactive interpreter on stdin.

mod interpreter;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::warn;

use pcm_stream_core::{SessionRegistry, SessionReport, StreamError};

use crate::interpreter::{Dispatch, Interpreter};

#[derive(Parser)]
#[command(name = "pcmstream")]
#[command(about = "Exercise a kernel PCM driver: play and record 16-bit WAV files")]
struct Args {
    /// Playback device node.
    #[arg(long, default_value = pcm_stream_msm::DEFAULT_OUTPUT_DEVICE)]
    out_dev: PathBuf,

    /// Capture device node.
    #[arg(long, default_value = pcm_stream_msm::DEFAULT_INPUT_DEVICE)]
    in_dev: PathBuf,

    /// Verbose logging (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run a single command (e.g. `playpcm test.wav -repeat=2`) and
    /// wait for it to finish.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = Args::parse();
    init_logging(&args);

    let registry = Arc::new(SessionRegistry::new());
    let interpreter = Interpreter::new(
        Arc::clone(&registry),
        args.out_dev.clone(),
        args.in_dev.clone(),
    );

    let interrupt_registry = Arc::clone(&registry);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\ninterrupted, stopping sessions");
        interrupt_registry.stop_all();
    }) {
        warn!("cannot install interrupt handler: {}", e);
    }

    let mut failed = false;

    if args.command.is_empty() {
        interactive(&interpreter, &registry, &mut failed);
    } else {
        let line = args.command.join(" ");
        if let Err(e) = interpreter.dispatch(&line) {
            eprintln!("{:#}", e);
            failed = true;
        }
    }

    // Wait out whatever is still running.
    for (id, result) in registry.wait_all() {
        report(id, result, &mut failed);
    }

    if failed {
        -1
    } else {
        0
    }
}

fn interactive(interpreter: &Interpreter, registry: &SessionRegistry, failed: &mut bool) {
    println!("pcmstream ready; type `help` for commands");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF
            Ok(_) => {}
        }

        match interpreter.dispatch(line.trim()) {
            Ok(Dispatch::Quit) => break,
            Ok(Dispatch::Spawned(id)) => println!("session {} started", id),
            Ok(_) => {}
            Err(e) => {
                eprintln!("{:#}", e);
                *failed = true;
            }
        }

        for (id, result) in registry.reap() {
            report(id, result, failed);
        }
    }
    registry.stop_all();
}

fn report(id: u32, result: Result<SessionReport, StreamError>, failed: &mut bool) {
    match result {
        Ok(SessionReport::Playback(r)) => println!(
            "session {}: played {} bytes in {} chunks ({} replays)",
            id, r.bytes_written, r.chunks_written, r.replays
        ),
        Ok(SessionReport::Capture(r)) => println!(
            "session {}: recorded {} bytes to {}",
            id,
            r.bytes_captured,
            r.path.display()
        ),
        Err(e) => {
            eprintln!("session {}: {}", id, e);
            *failed = true;
        }
    }
}

fn init_logging(args: &Args) {
    let default = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
