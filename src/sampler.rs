//! One sampling cycle: query the host, derive network throughput, format.
//!
//! The only state carried between cycles is [`NetworkRateState`]. It is
//! passed in by value and handed back updated, so whoever owns it (the ticker
//! thread) is its single writer.

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::collector::{MetricError, MetricKind, MetricsSource, NetCounters};
use crate::fmt::{
    CPU_LABEL, DISK_LABEL, NETWORK_LABEL, RAM_LABEL, UPTIME_LABEL, format_network_rate,
    format_percent, format_uptime, labeled,
};
use crate::shell::MenuItem;

/// CPU utilization is averaged over this blocking window.
pub const CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Seconds assumed between two network samples.
///
/// This is the nominal refresh interval, not a measured elapsed time: a
/// cycle that overruns still divides by two.
pub const RATE_DIVISOR_SECS: f64 = 2.0;

/// Volume whose usage is reported.
pub const ROOT_MOUNT: &str = "/";

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Previous cumulative network counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkRateState {
    pub prev_bytes_sent: u64,
    pub prev_bytes_recv: u64,
}

impl NetworkRateState {
    /// State at UI-ready: both counters zero, so the next rate is zero.
    pub fn reset() -> Self {
        Self::default()
    }

    /// A rate is only derived when both previous counters are nonzero.
    pub fn is_warm(&self) -> bool {
        self.prev_bytes_sent != 0 && self.prev_bytes_recv != 0
    }

    /// Throughput in MB/s (sent, received) from the previous counters to
    /// `current`.
    ///
    /// Zero on a cold start. A counter that went backwards (interface reset)
    /// contributes zero rather than wrapping.
    pub fn rate(&self, current: NetCounters) -> (f64, f64) {
        if !self.is_warm() {
            return (0.0, 0.0);
        }
        let per_sec = |cur: u64, prev: u64| {
            cur.saturating_sub(prev) as f64 / BYTES_PER_MIB / RATE_DIVISOR_SECS
        };
        (
            per_sec(current.bytes_sent, self.prev_bytes_sent),
            per_sec(current.bytes_recv, self.prev_bytes_recv),
        )
    }

    /// State for the next cycle.
    pub fn advance(self, current: NetCounters) -> Self {
        Self {
            prev_bytes_sent: current.bytes_sent,
            prev_bytes_recv: current.bytes_recv,
        }
    }
}

/// Raw values of one cycle. Built fresh, formatted, dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSnapshot {
    pub cpu_percent: f64,
    pub ram_used_percent: f64,
    pub disk_used_percent: f64,
    pub uptime_secs: u64,
    pub network: NetCounters,
}

impl MetricSnapshot {
    /// Queries every metric in display order, stopping at the first failure.
    pub fn collect<S: MetricsSource + ?Sized>(source: &mut S) -> Result<Self, MetricError> {
        let cpu_percent = source
            .cpu_percent(CPU_SAMPLE_WINDOW)
            .map_err(|e| MetricError::new(MetricKind::Cpu, e))?;
        let memory = source
            .virtual_memory()
            .map_err(|e| MetricError::new(MetricKind::Memory, e))?;
        let disk = source
            .disk_usage(Path::new(ROOT_MOUNT))
            .map_err(|e| MetricError::new(MetricKind::Disk, e))?;
        let uptime_secs = source
            .uptime()
            .map_err(|e| MetricError::new(MetricKind::Uptime, e))?;
        let network = source
            .network_counters()
            .map_err(|e| MetricError::new(MetricKind::Network, e))?;

        Ok(Self {
            cpu_percent,
            ram_used_percent: memory.used_percent,
            disk_used_percent: disk.used_percent,
            uptime_secs,
            network,
        })
    }
}

/// The five menu strings produced by one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayStrings {
    pub cpu: String,
    pub ram: String,
    pub disk: String,
    pub network: String,
    pub uptime: String,
}

impl DisplayStrings {
    pub fn format(snapshot: &MetricSnapshot, sent_mbps: f64, recv_mbps: f64) -> Self {
        Self {
            cpu: labeled(CPU_LABEL, &format_percent(snapshot.cpu_percent)),
            ram: labeled(RAM_LABEL, &format_percent(snapshot.ram_used_percent)),
            disk: labeled(DISK_LABEL, &format_percent(snapshot.disk_used_percent)),
            network: labeled(NETWORK_LABEL, &format_network_rate(sent_mbps, recv_mbps)),
            uptime: labeled(UPTIME_LABEL, &format_uptime(snapshot.uptime_secs)),
        }
    }

    /// Text for one menu item.
    pub fn text(&self, item: MenuItem) -> &str {
        match item {
            MenuItem::Cpu => &self.cpu,
            MenuItem::Ram => &self.ram,
            MenuItem::Disk => &self.disk,
            MenuItem::Network => &self.network,
            MenuItem::Uptime => &self.uptime,
        }
    }
}

/// Runs one cycle.
///
/// On success returns the display strings and the state for the next cycle.
/// On the first failing query returns the error; the caller keeps its old
/// state and leaves the menu untouched.
pub fn sample_and_format<S: MetricsSource + ?Sized>(
    source: &mut S,
    state: NetworkRateState,
) -> Result<(DisplayStrings, NetworkRateState), MetricError> {
    let snapshot = MetricSnapshot::collect(source)?;
    let (sent, recv) = state.rate(snapshot.network);
    debug!(
        "sample: cpu={:.1} ram={:.1} disk={:.1} uptime={}s sent={:.2}MB/s recv={:.2}MB/s warm={}",
        snapshot.cpu_percent,
        snapshot.ram_used_percent,
        snapshot.disk_used_percent,
        snapshot.uptime_secs,
        sent,
        recv,
        state.is_warm()
    );

    let strings = DisplayStrings::format(&snapshot, sent, recv);
    Ok((strings, state.advance(snapshot.network)))
}
