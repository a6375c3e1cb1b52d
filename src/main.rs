//! OpenSSH Ed25519 Vanity Key Generator CLI
//!
//! Usage:
//!   ssh-vanity abc              # Find a key whose public text contains "abc"
//!   ssh-vanity --ci abc         # Same, ignoring ASCII case
//!   ssh-vanity -w 8 -o keys abc # 8 workers, write into ./keys

use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use ssh_vanity::worker::{CancelToken, ProgressSample};
use ssh_vanity::{Config, OsKeySource, SearchOutcome, WorkerPool};

fn main() {
    init_tracing();

    let config = match Config::parse_args(std::env::args_os()) {
        Ok(config) => config,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    let target = match config.search_target() {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let search = config.search_config();

    // Print startup info
    println!(
        "Searching for ed25519 key containing: {} ({})",
        config.target,
        target.case_mode()
    );
    println!("Using {} cores, {} workers", num_cpus::get(), search.workers);
    println!("Difficulty: {}", target.difficulty_description());
    if !target.is_reachable() {
        warn!(
            pattern = target.pattern(),
            "pattern cannot occur in an ssh-ed25519 public key, the search will not finish"
        );
    }

    // Set up ctrl-c handler before any worker runs
    let cancel = CancelToken::new();
    let handler_cancel = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_cancel.cancel();
    }) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let line_progress = config.line_progress;
    let pool = WorkerPool::with_progress(
        &search,
        Arc::new(OsKeySource),
        Arc::new(target),
        cancel,
        move |sample| print_progress(sample, line_progress),
    );

    let outcome = pool.wait();
    if !line_progress {
        // End the overwritten progress line
        println!();
    }

    println!("\n{}", outcome.headline());
    match outcome {
        SearchOutcome::Found {
            result,
            total_attempts,
            elapsed,
        } => {
            let written = match config.key_writer().persist(&result) {
                Ok(written) => written,
                Err(e) => {
                    eprintln!("Error saving keys: {}", e);
                    process::exit(1);
                }
            };
            println!(
                "Keys written to {} and {}",
                written.private_key.display(),
                written.public_key.display()
            );
            println!("Public key: {}", written.public_key_line.trim());
            println!("Total attempts across all workers: {}", total_attempts);

            let secs = elapsed.as_secs_f64();
            let rate = if secs > 0.0 {
                total_attempts as f64 / secs
            } else {
                0.0
            };
            println!(
                "Time elapsed: {:.2}s ({}/s)",
                secs,
                format_number(rate as u64)
            );
        }
        SearchOutcome::Interrupted { total_attempts, .. } => {
            println!("Total attempts across all workers: {}", total_attempts);
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_progress(sample: &ProgressSample, line_progress: bool) {
    let mut stdout = io::stdout().lock();
    if line_progress {
        let _ = writeln!(stdout, "{}", sample.render());
    } else {
        let _ = write!(stdout, "\r{}", sample.render());
        let _ = stdout.flush();
    }
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
