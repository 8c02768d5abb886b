//! jmxpoll - continuous JMX attribute monitor.
//!
//! Finds the target JVM by command-line substring, connects to its Jolokia
//! agent and prints one comma-separated sample line per interval.
//!
//! Usage:
//!   jmxpoll kafka.Kafka                  # ./beans, every 3 seconds
//!   jmxpoll kafka.Kafka ./kafka.beans 1  # custom beans file, every second
//!   jmxpoll --list                       # show candidate processes

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use jmxpoll::config::{
    DEFAULT_BEANS_FILE, DEFAULT_ENDPOINT, DEFAULT_INTERVAL_SECS, DEFAULT_PROC_PATH,
    DEFAULT_TIMEOUT_SECS, MonitorSettings, load_groups,
};
use jmxpoll::locator::{ProcessLocator, RealFs};
use jmxpoll::sampler::{SamplingLoop, SleepPacer, SystemClock};
use jmxpoll::target::JolokiaConnection;

/// Name used to keep the monitor from matching its own process.
const SELF_MARKER: &str = "jmxpoll";

/// Periodic JMX attribute sampler.
#[derive(Parser)]
#[command(name = "jmxpoll", about = "Periodic JMX attribute sampler", version)]
struct Args {
    /// Substring of the target process command line (e.g. its main class).
    #[arg(value_name = "MATCHER", required_unless_present = "list")]
    matcher: Option<String>,

    /// File listing `bean#attr1,attr2` or `bean#*` groups, one per line.
    #[arg(value_name = "BEANS_FILE", default_value = DEFAULT_BEANS_FILE)]
    beans_file: String,

    /// Sampling interval in seconds.
    #[arg(value_name = "INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: u64,

    /// Jolokia agent URL of the target.
    #[arg(long, env = "JMXPOLL_URL", default_value = DEFAULT_ENDPOINT)]
    url: String,

    /// Request timeout in seconds.
    #[arg(long, env = "JMXPOLL_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = DEFAULT_PROC_PATH)]
    proc_path: String,

    /// List candidate processes and exit.
    #[arg(long)]
    list: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber on stderr; stdout carries samples only.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("jmxpoll={}", level)
            .parse()
            .unwrap_or_else(|_| LevelFilter::from_level(level).into()),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_settings(args: &Args) -> jmxpoll::Result<MonitorSettings> {
    let settings = MonitorSettings::new(args.matcher.clone().unwrap_or_default())
        .with_beans_file(&args.beans_file)
        .with_endpoint(&args.url)
        .with_proc_path(&args.proc_path)
        .with_interval_secs(args.interval)?
        .with_timeout_secs(args.timeout)?;
    settings.validate()?;
    Ok(settings)
}

fn list_candidates(proc_path: &str) {
    let locator = ProcessLocator::new(RealFs::new(), proc_path).with_self_marker(SELF_MARKER);
    match locator.candidates() {
        Ok(candidates) => {
            for c in candidates {
                println!("{:>8}  {}", c.pid, c.descriptor);
            }
        }
        Err(e) => {
            error!("Failed to list processes: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if args.list {
        list_candidates(&args.proc_path);
        return;
    }

    let settings = match build_settings(&args) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("jmxpoll {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: matcher={:?}, beans={}, interval={}s, url={}",
        settings.matcher,
        settings.beans_file.display(),
        settings.interval.as_secs(),
        settings.endpoint
    );

    let locator =
        ProcessLocator::new(RealFs::new(), &settings.proc_path).with_self_marker(SELF_MARKER);
    let target = match locator.locate(&settings.matcher) {
        Ok(t) => t,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let groups = match load_groups(&settings.beans_file) {
        Ok(g) => g,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let conn = JolokiaConnection::new(&settings.endpoint, target.pid, settings.timeout);
    let mut sampler = SamplingLoop::new(conn, groups, settings.interval, io::stdout().lock());
    let mut pacer = SleepPacer::new(running);

    match sampler.run(&mut pacer, &SystemClock) {
        Ok(()) => info!("Stopped after {} samples", sampler.ticks()),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
