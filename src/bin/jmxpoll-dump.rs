//! jmxpoll-dump - print selected JMX attributes of a process once.
//!
//! Usage:
//!   jmxpoll-dump 1200 'java.lang:type=Memory#HeapMemoryUsage' 'java.lang:type=Threading#*'

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use jmxpoll::config::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, parse_group_token};
use jmxpoll::dump::dump;
use jmxpoll::target::{JolokiaConnection, TargetConnection};

#[derive(Parser)]
#[command(name = "jmxpoll-dump", about = "Print JMX attributes of a process once")]
struct Cli {
    /// Process id of the target JVM; the agent at --url must belong to it.
    pid: u32,

    /// One or more `bean#attr1,attr2` (or `bean#*`) selectors.
    #[arg(value_name = "BEAN#ATTRS", required = true, num_args = 1..)]
    specs: Vec<String>,

    /// Jolokia agent URL of the target.
    #[arg(long, env = "JMXPOLL_URL", default_value = DEFAULT_ENDPOINT)]
    url: String,

    /// Request timeout in seconds.
    #[arg(long, env = "JMXPOLL_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Show debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
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

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let groups = match cli
        .specs
        .iter()
        .map(|s| parse_group_token(s))
        .collect::<jmxpoll::Result<Vec<_>>>()
    {
        Ok(g) => g,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let timeout = Duration::from_secs(cli.timeout.max(1));
    let mut conn = JolokiaConnection::new(&cli.url, cli.pid, timeout);
    if let Err(e) = conn.open() {
        error!("{}", e);
        std::process::exit(1);
    }

    let result = dump(&mut conn, &groups, &mut io::stdout().lock());
    let _ = conn.close();

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
