//! Scripted metric sources for sampler and poll-loop tests.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::collector::disk::DiskProbe;
use crate::collector::procfs::CollectError;
use crate::collector::source::{DiskUsage, MemoryUsage, MetricKind, MetricsSource, NetCounters};

#[derive(Debug)]
struct Script {
    cpu: f64,
    memory_percent: f64,
    disk_percent: f64,
    uptime: u64,
    network: VecDeque<NetCounters>,
    last_network: NetCounters,
    failing: HashSet<MetricKind>,
    cpu_windows: Vec<Duration>,
    disk_paths: Vec<PathBuf>,
}

/// A [`MetricsSource`] returning scripted values.
///
/// Clones share the same script, so a test can keep one clone to change
/// values or inject failures while another is owned by a ticker thread.
#[derive(Debug, Clone)]
pub struct StaticSource {
    script: Arc<Mutex<Script>>,
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticSource {
    /// CPU 12.5%, RAM 50%, disk 75%, uptime 90125 s, zero network counters.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                cpu: 12.5,
                memory_percent: 50.0,
                disk_percent: 75.0,
                uptime: 90125,
                network: VecDeque::new(),
                last_network: NetCounters::default(),
                failing: HashSet::new(),
                cpu_windows: Vec::new(),
                disk_paths: Vec::new(),
            })),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_cpu(&self, pct: f64) {
        self.script().cpu = pct;
    }

    pub fn set_memory(&self, pct: f64) {
        self.script().memory_percent = pct;
    }

    pub fn set_disk(&self, pct: f64) {
        self.script().disk_percent = pct;
    }

    pub fn set_uptime(&self, secs: u64) {
        self.script().uptime = secs;
    }

    /// Queues counters for the next network query. Once the queue drains,
    /// the last counters are repeated.
    pub fn push_network(&self, bytes_sent: u64, bytes_recv: u64) {
        self.script().network.push_back(NetCounters {
            bytes_sent,
            bytes_recv,
        });
    }

    /// Makes every query of `metric` fail until [`recover`](Self::recover).
    pub fn fail(&self, metric: MetricKind) {
        self.script().failing.insert(metric);
    }

    pub fn recover(&self, metric: MetricKind) {
        self.script().failing.remove(&metric);
    }

    /// Observation windows passed to every `cpu_percent` call so far.
    pub fn cpu_windows(&self) -> Vec<Duration> {
        self.script().cpu_windows.clone()
    }

    /// Paths passed to every `disk_usage` call so far.
    pub fn disk_paths(&self) -> Vec<PathBuf> {
        self.script().disk_paths.clone()
    }

    fn check(script: &Script, metric: MetricKind) -> Result<(), CollectError> {
        if script.failing.contains(&metric) {
            return Err(CollectError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("scripted {} failure", metric),
            )));
        }
        Ok(())
    }
}

impl MetricsSource for StaticSource {
    fn cpu_percent(&mut self, window: Duration) -> Result<f64, CollectError> {
        let mut script = self.script();
        script.cpu_windows.push(window);
        Self::check(&script, MetricKind::Cpu)?;
        Ok(script.cpu)
    }

    fn virtual_memory(&mut self) -> Result<MemoryUsage, CollectError> {
        let script = self.script();
        Self::check(&script, MetricKind::Memory)?;
        Ok(MemoryUsage {
            total_bytes: 0,
            used_bytes: 0,
            available_bytes: 0,
            used_percent: script.memory_percent,
        })
    }

    fn disk_usage(&mut self, path: &Path) -> Result<DiskUsage, CollectError> {
        let mut script = self.script();
        script.disk_paths.push(path.to_path_buf());
        Self::check(&script, MetricKind::Disk)?;
        Ok(DiskUsage {
            total_bytes: 0,
            used_bytes: 0,
            available_bytes: 0,
            used_percent: script.disk_percent,
        })
    }

    fn uptime(&mut self) -> Result<u64, CollectError> {
        let script = self.script();
        Self::check(&script, MetricKind::Uptime)?;
        Ok(script.uptime)
    }

    fn network_counters(&mut self) -> Result<NetCounters, CollectError> {
        let mut script = self.script();
        Self::check(&script, MetricKind::Network)?;
        if let Some(next) = script.network.pop_front() {
            script.last_network = next;
        }
        Ok(script.last_network)
    }
}

/// A [`DiskProbe`] that reports the same volume for every path.
#[derive(Debug, Clone, Copy)]
pub struct FixedDisk {
    total_bytes: u64,
    free_bytes: u64,
    available_bytes: u64,
}

impl FixedDisk {
    /// A volume without reserved blocks.
    pub fn new(total_bytes: u64, available_bytes: u64) -> Self {
        Self::with_reserved(total_bytes, available_bytes, available_bytes)
    }

    /// A volume where `free - available` bytes are reserved for root.
    pub fn with_reserved(total_bytes: u64, free_bytes: u64, available_bytes: u64) -> Self {
        Self {
            total_bytes,
            free_bytes,
            available_bytes,
        }
    }
}

impl DiskProbe for FixedDisk {
    fn usage(&mut self, _path: &Path) -> Result<DiskUsage, CollectError> {
        Ok(DiskUsage::from_space(
            self.total_bytes,
            self.free_bytes,
            self.available_bytes,
        ))
    }
}
