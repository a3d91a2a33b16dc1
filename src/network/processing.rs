//! Packet acquisition loop and fault recovery.
//!
//! One blocking thread drives the whole pipeline: receive a buffer of
//! queued packets, split it, run the mutation engine over each packet and
//! return its verdict, in exactly the order the kernel delivered them.
//! Transport failures are recovered once by reopening the queue with
//! conntrack disabled; a second failure ends the run.

use crate::config::Config;
use crate::error::Result;
use crate::network::queue::{IoStatus, NfBuffer, NfPacket, PacketVerdict, QueueError, Transport};
use crate::network::rewrite;
use crate::shutdown::ShutdownFlag;
use crate::stats::Stats;
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

/// How often the loop reports its counters while traffic flows.
const REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// One-shot recovery latch for the queue transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// No transport error seen in this run.
    Normal,
    /// The single reopen-without-conntrack has been consumed.
    Retrying,
    /// Recovery spent and the transport failed again; terminal.
    Failed,
}

/// Runs the acquisition loop until shutdown or unrecoverable failure.
///
/// The shutdown flag is observed only at iteration boundaries; a packet
/// that has been dequeued always completes dispatch and receives its
/// verdict first. Returns `Ok` on a clean shutdown and the transport error
/// once recovery is exhausted.
pub fn run<T: Transport>(
    queue: &mut T,
    config: &Config,
    shutdown: &ShutdownFlag,
    stats: &Stats,
) -> Result<()> {
    let mut buffer = NfBuffer::new();
    let mut retry = RetryState::Normal;
    let mut reporter = StatsReporter::new(stats);

    info!("packet acquisition loop started");

    let failure = loop {
        if shutdown.is_set() {
            info!("shutdown requested, leaving acquisition loop");
            break None;
        }

        if let IoStatus::Error(err) = read_buffer(queue, &mut buffer, config, shutdown, stats) {
            match retry {
                RetryState::Normal => {
                    warn!("queue transport failed: {err}; reopening without conntrack");
                    retry = RetryState::Retrying;
                    if let Err(reopen_err) = queue.reopen_without_conntrack() {
                        error!("failed to reopen queue with conntrack disabled: {reopen_err}");
                        retry = RetryState::Failed;
                        break Some(reopen_err);
                    }
                    info!("queue reopened with conntrack disabled, resuming");
                }
                RetryState::Retrying | RetryState::Failed => {
                    error!("queue transport failed after the one-shot retry: {err}");
                    retry = RetryState::Failed;
                    break Some(err);
                }
            }
        }

        reporter.maybe_report();
    };

    debug!("acquisition loop finished (recovery state: {retry:?})");
    reporter.report_totals();

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Receives one buffer of queued packets and dispatches all of them.
fn read_buffer<T: Transport>(
    queue: &mut T,
    buffer: &mut NfBuffer,
    config: &Config,
    shutdown: &ShutdownFlag,
    stats: &Stats,
) -> IoStatus<()> {
    match queue.receive(buffer) {
        IoStatus::Ready(()) => drain_buffer(queue, buffer, config, shutdown, stats),
        status => status,
    }
}

/// Dispatches every packet in the received buffer, in arrival order. The
/// shutdown flag is honored between packets, never in the middle of one.
fn drain_buffer<T: Transport>(
    queue: &mut T,
    buffer: &mut NfBuffer,
    config: &Config,
    shutdown: &ShutdownFlag,
    stats: &Stats,
) -> IoStatus<()> {
    while !shutdown.is_set() {
        match buffer.next() {
            IoStatus::Ready(packet) => {
                if let Err(err) = dispatch_packet(queue, buffer, &packet, config, stats) {
                    return IoStatus::Error(err);
                }
            }
            IoStatus::End => return IoStatus::End,
            IoStatus::Error(err) => return IoStatus::Error(err),
        }
    }

    IoStatus::End
}

/// Runs the mutation engine over one packet and issues exactly one verdict.
fn dispatch_packet<T: Transport>(
    queue: &mut T,
    buffer: &mut NfBuffer,
    packet: &NfPacket,
    config: &Config,
    stats: &Stats,
) -> std::result::Result<(), QueueError> {
    let modified =
        rewrite::rewrite_user_agent(buffer.packet_bytes_mut(packet), config.replacement(), stats);

    let verdict = if modified {
        PacketVerdict::AcceptModified(buffer.packet_bytes(packet))
    } else {
        PacketVerdict::Accept
    };

    queue.verdict(packet.packet_id, verdict)
}

/// Emits the counters at a coarse interval, and once more on exit. Quiet
/// while no traffic arrives.
struct StatsReporter<'a> {
    stats: &'a Stats,
    last_report: Instant,
    last_inspected: u64,
}

impl<'a> StatsReporter<'a> {
    fn new(stats: &'a Stats) -> Self {
        Self {
            stats,
            last_report: Instant::now(),
            last_inspected: 0,
        }
    }

    fn maybe_report(&mut self) {
        if self.last_report.elapsed() < REPORT_INTERVAL {
            return;
        }
        let inspected = self.stats.inspected();
        if inspected == self.last_inspected {
            return;
        }
        info!(
            "inspected {inspected} packets, rewrote {}",
            self.stats.rewritten()
        );
        self.last_inspected = inspected;
        self.last_report = Instant::now();
    }

    fn report_totals(&self) {
        info!(
            "totals: {} packets inspected, {} rewritten",
            self.stats.inspected(),
            self.stats.rewritten()
        );
    }
}
