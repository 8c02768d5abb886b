//! Periodic sampling loop.
//!
//! ```text
//!   Idle ──open ok──▶ Running ──fatal error / shutdown──▶ Stopped
//!    │                                                     ▲
//!    └──────────────────open failed────────────────────────┘
//! ```
//!
//! One tick = timestamp, collect, format, write one line, then wait for the
//! interval. A failed tick writes nothing and stops the loop; there is no
//! reconnection and no retry.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::collector::collect;
use crate::error::Result;
use crate::fmt::format_line;
use crate::model::MonitorGroup;
use crate::target::TargetConnection;

/// Granularity at which [`SleepPacer`] re-checks the shutdown flag.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Source of sample timestamps.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Scheduling contract between ticks.
///
/// The loop asks `running` before every tick and calls `wait` after every
/// emitted line. Implementations may sleep, poll a timer, or count ticks.
pub trait Pacer {
    fn running(&self) -> bool;

    fn wait(&mut self, interval: Duration);
}

/// Blocking sleep on the control thread, cut short by a shutdown flag.
#[derive(Debug, Clone)]
pub struct SleepPacer {
    running: Arc<AtomicBool>,
}

impl SleepPacer {
    pub fn new(running: Arc<AtomicBool>) -> Self {
        Self { running }
    }
}

impl Pacer for SleepPacer {
    fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn wait(&mut self, interval: Duration) {
        let mut remaining = interval;
        while remaining > Duration::ZERO && self.running() {
            let sleep_time = remaining.min(SLEEP_SLICE);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Drives [`collect`] at a fixed interval and writes one line per tick.
pub struct SamplingLoop<C: TargetConnection, W: Write> {
    conn: C,
    groups: Vec<MonitorGroup>,
    interval: Duration,
    out: W,
    state: LoopState,
    ticks: u64,
}

impl<C: TargetConnection, W: Write> SamplingLoop<C, W> {
    /// Creates an idle loop.
    ///
    /// # Arguments
    /// * `conn` - Unopened connection; the loop owns it from here on
    /// * `groups` - Bean/attribute groups sampled on every tick, in order
    /// * `interval` - Pause between ticks
    /// * `out` - Destination of sample lines (stdout in production)
    pub fn new(conn: C, groups: Vec<MonitorGroup>, interval: Duration, out: W) -> Self {
        Self {
            conn,
            groups,
            interval,
            out,
            state: LoopState::Idle,
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of lines emitted so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Opens the connection. Failure moves the loop straight to `Stopped`.
    pub fn start(&mut self) -> Result<()> {
        if self.state != LoopState::Idle {
            return Ok(());
        }
        match self.conn.open() {
            Ok(()) => {
                self.state = LoopState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = LoopState::Stopped;
                Err(e)
            }
        }
    }

    /// Runs one tick: collect every group and write the line.
    ///
    /// Nothing is written when collection fails.
    pub fn tick(&mut self, clock: &impl Clock) -> Result<()> {
        let timestamp = clock.now_millis();
        let record = collect(&mut self.conn, &self.groups)?;

        writeln!(self.out, "{}", format_line(timestamp, &record))?;
        self.out.flush()?;

        self.ticks += 1;
        debug!("Tick #{}: {} values", self.ticks, record.len());
        Ok(())
    }

    /// Runs until the pacer stops or a tick fails.
    ///
    /// The connection is closed on both paths. Returns the tick error, if any.
    pub fn run(&mut self, pacer: &mut impl Pacer, clock: &impl Clock) -> Result<()> {
        self.start()?;
        info!(
            "Sampling {} groups every {}s",
            self.groups.len(),
            self.interval.as_secs()
        );

        let mut outcome = Ok(());
        while pacer.running() {
            if let Err(e) = self.tick(clock) {
                error!("Sampling stopped after {} ticks: {}", self.ticks, e);
                outcome = Err(e);
                break;
            }
            pacer.wait(self.interval);
        }

        self.stop();
        outcome
    }

    /// Closes the connection (best effort) and marks the loop stopped.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        if let Err(e) = self.conn.close() {
            warn!("Failed to close connection: {}", e);
        }
        self.state = LoopState::Stopped;
    }
}
