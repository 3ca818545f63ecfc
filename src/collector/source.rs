//! The OS metrics provider seam.
//!
//! [`MetricsSource`] is the only thing the sampler knows about the host. Each
//! query may fail independently; the sampler tags failures with the
//! [`MetricKind`] it was fetching.

use std::path::Path;
use std::time::Duration;

use super::procfs::CollectError;

/// Virtual memory usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    /// `used / total * 100`.
    pub used_percent: f64,
}

impl MemoryUsage {
    /// Builds usage from byte counts. `used` is clamped to `total`.
    pub fn from_used(
        total_bytes: u64,
        used_bytes: u64,
        available_bytes: u64,
    ) -> Result<Self, CollectError> {
        if total_bytes == 0 {
            return Err(CollectError::Parse("memory reports zero total size".into()));
        }
        let used_bytes = used_bytes.min(total_bytes);
        Ok(Self {
            total_bytes,
            used_bytes,
            available_bytes,
            used_percent: used_bytes as f64 / total_bytes as f64 * 100.0,
        })
    }
}

/// Space on a mounted volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    /// Space available to unprivileged users; excludes reserved blocks.
    pub available_bytes: u64,
    /// `used / (used + available) * 100`, as `df` reports it.
    pub used_percent: f64,
}

impl DiskUsage {
    /// Builds usage from the volume's total, free and available byte counts.
    ///
    /// `free` includes blocks reserved for root, `available` does not. A
    /// volume with nothing used and nothing available is 0% used.
    pub fn from_space(total_bytes: u64, free_bytes: u64, available_bytes: u64) -> Self {
        let used_bytes = total_bytes.saturating_sub(free_bytes);
        let visible = used_bytes.saturating_add(available_bytes);
        let used_percent = if visible == 0 {
            0.0
        } else {
            used_bytes as f64 / visible as f64 * 100.0
        };
        Self {
            total_bytes,
            used_bytes,
            available_bytes,
            used_percent,
        }
    }
}

/// Cumulative network byte counters, summed over every interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// OS-level metric queries.
///
/// Implementations are owned by the ticker thread, hence `Send` and `&mut self`.
pub trait MetricsSource: Send {
    /// Aggregate CPU utilization over `window`. Blocks for the whole window.
    fn cpu_percent(&mut self, window: Duration) -> Result<f64, CollectError>;

    /// Virtual memory usage.
    fn virtual_memory(&mut self) -> Result<MemoryUsage, CollectError>;

    /// Usage of the volume holding `path`.
    fn disk_usage(&mut self, path: &Path) -> Result<DiskUsage, CollectError>;

    /// Whole seconds since boot.
    fn uptime(&mut self) -> Result<u64, CollectError>;

    /// Cumulative bytes sent and received since boot.
    fn network_counters(&mut self) -> Result<NetCounters, CollectError>;
}

/// Which metric a query was fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    Uptime,
    Network,
}

impl MetricKind {
    /// Short name used in log lines.
    pub fn describe(self) -> &'static str {
        match self {
            MetricKind::Cpu => "CPU usage",
            MetricKind::Memory => "memory info",
            MetricKind::Disk => "disk info",
            MetricKind::Uptime => "system uptime",
            MetricKind::Network => "network info",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// A metric query failed; the whole sampling cycle is abandoned.
#[derive(Debug)]
pub struct MetricError {
    pub metric: MetricKind,
    pub source: CollectError,
}

impl MetricError {
    pub fn new(metric: MetricKind, source: CollectError) -> Self {
        Self { metric, source }
    }
}

impl std::fmt::Display for MetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error getting {}: {}", self.metric, self.source)
    }
}

impl std::error::Error for MetricError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_usage_without_reserved_blocks() {
        let usage = DiskUsage::from_space(1000, 250, 250);
        assert_eq!(usage.used_bytes, 750);
        assert!((usage.used_percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_disk_usage_with_reserved_blocks() {
        // 100 blocks, 50 free, 45 available to users: 5 reserved for root.
        let usage = DiskUsage::from_space(100, 50, 45);
        assert_eq!(usage.used_bytes, 50);
        assert!((usage.used_percent - 50.0 / 95.0 * 100.0).abs() < 1e-9);
        assert_eq!(format!("{:.1}", usage.used_percent), "52.6");
    }

    #[test]
    fn test_disk_usage_empty_volume_is_zero() {
        let usage = DiskUsage::from_space(0, 0, 0);
        assert_eq!(usage.used_percent, 0.0);
    }

    #[test]
    fn test_disk_usage_free_exceeds_total() {
        let usage = DiskUsage::from_space(100, 120, 120);
        assert_eq!(usage.used_percent, 0.0);
    }

    #[test]
    fn test_memory_usage_from_used() {
        let mem = MemoryUsage::from_used(1000, 250, 700).unwrap();
        assert!((mem.used_percent - 25.0).abs() < 1e-9);
        assert_eq!(mem.available_bytes, 700);
    }

    #[test]
    fn test_memory_used_clamped_to_total() {
        let mem = MemoryUsage::from_used(100, 150, 0).unwrap();
        assert_eq!(mem.used_percent, 100.0);
    }

    #[test]
    fn test_memory_zero_total_is_error() {
        assert!(MemoryUsage::from_used(0, 0, 0).is_err());
    }

    #[test]
    fn test_metric_error_names_metric() {
        let err = MetricError::new(
            MetricKind::Disk,
            CollectError::Unsupported("no volume mounted at /".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("disk info"), "got: {}", msg);
        assert!(msg.contains("no volume mounted at /"));
    }
}
