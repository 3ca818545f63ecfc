//! The two background activities started at UI-ready.
//!
//! - The ticker sleeps for [`REFRESH_INTERVAL`], runs one sampling cycle and
//!   writes the five strings to the menu, forever. It owns the
//!   [`NetworkRateState`]. There is no overlap guard: a cycle that overruns
//!   simply delays the next one.
//! - The quit waiter blocks on the quit channel and asks the shell to
//!   terminate when the event arrives.
//!
//! Neither thread is cancelled; the ticker is abandoned at process exit.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::collector::MetricsSource;
use crate::sampler::{NetworkRateState, sample_and_format};
use crate::shell::{MenuItem, MenuShell, QuitReceiver};

/// Time between the end of one cycle and the start of the next.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// One sampling cycle at a time, pushing results into the menu.
pub struct Ticker<S: MetricsSource> {
    source: S,
    shell: Arc<dyn MenuShell>,
    state: NetworkRateState,
    cycles: u64,
    failures: u64,
}

impl<S: MetricsSource> Ticker<S> {
    /// Creates a ticker with cold network counters.
    pub fn new(source: S, shell: Arc<dyn MenuShell>) -> Self {
        Self {
            source,
            shell,
            state: NetworkRateState::reset(),
            cycles: 0,
            failures: 0,
        }
    }

    /// Runs one cycle. Returns whether the menu was updated.
    ///
    /// On failure the error is logged and nothing is written; the network
    /// state stays as it was.
    pub fn tick(&mut self) -> bool {
        self.cycles += 1;
        match sample_and_format(&mut self.source, self.state) {
            Ok((strings, next)) => {
                for item in MenuItem::ALL {
                    self.shell.set_display_text(item, strings.text(item));
                }
                self.state = next;
                true
            }
            Err(e) => {
                self.failures += 1;
                error!("Error getting {}: {}", e.metric, e.source);
                false
            }
        }
    }

    pub fn state(&self) -> NetworkRateState {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Sleeps, ticks, repeats. Never returns.
    fn run(mut self, interval: Duration) {
        loop {
            thread::sleep(interval);
            self.tick();
            if self.cycles % 150 == 0 {
                debug!("{} cycles, {} failed", self.cycles, self.failures);
            }
        }
    }
}

/// Handles to the running ticker and quit waiter.
pub struct PollLoop {
    _ticker: JoinHandle<()>,
    quit_wait: JoinHandle<()>,
}

impl PollLoop {
    /// Starts both activities with the fixed refresh interval.
    pub fn start<S>(source: S, shell: Arc<dyn MenuShell>, quit: QuitReceiver) -> io::Result<Self>
    where
        S: MetricsSource + 'static,
    {
        Self::start_with_interval(source, shell, quit, REFRESH_INTERVAL)
    }

    pub(crate) fn start_with_interval<S>(
        source: S,
        shell: Arc<dyn MenuShell>,
        quit: QuitReceiver,
        interval: Duration,
    ) -> io::Result<Self>
    where
        S: MetricsSource + 'static,
    {
        let ticker = Ticker::new(source, Arc::clone(&shell));
        let ticker = thread::Builder::new()
            .name("gouge-ticker".into())
            .spawn(move || ticker.run(interval))?;

        let quit_wait = thread::Builder::new()
            .name("gouge-quit".into())
            .spawn(move || {
                match quit.wait() {
                    Ok(_) => info!("Quit requested"),
                    Err(_) => debug!("quit channel closed"),
                }
                shell.request_terminate();
            })?;

        info!("Poll loop started, refreshing every {:?}", interval);
        Ok(Self {
            _ticker: ticker,
            quit_wait,
        })
    }

    /// Blocks until the quit waiter has told the shell to terminate.
    pub fn join_quit_wait(self) -> thread::Result<()> {
        self.quit_wait.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MetricKind;
    use crate::collector::mock::StaticSource;
    use crate::shell::{MenuHandle, quit_channel};
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Instant;

    const MIB: u64 = 1024 * 1024;

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Runs `f` with a subscriber writing into the returned capture.
    fn capture_logs(f: impl FnOnce()) -> String {
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        capture.text()
    }

    fn ticker(src: &StaticSource, menu: &MenuHandle) -> Ticker<StaticSource> {
        Ticker::new(src.clone(), Arc::new(menu.clone()))
    }

    #[test]
    fn test_tick_writes_all_items() {
        let src = StaticSource::new();
        let menu = MenuHandle::new();
        let mut t = ticker(&src, &menu);

        assert!(t.tick());

        assert_eq!(menu.text(MenuItem::Cpu), "CPU: 12.5%");
        assert_eq!(menu.text(MenuItem::Ram), "RAM: 50.0%");
        assert_eq!(menu.text(MenuItem::Disk), "Disk: 75.0%");
        assert_eq!(
            menu.text(MenuItem::Network),
            "Network: Sent: 0.00 MB/s, Received: 0.00 MB/s"
        );
        assert_eq!(menu.text(MenuItem::Uptime), "Uptime: 1 d, 1 h, 2 m");
    }

    #[test]
    fn test_failed_cycle_leaves_menu_unchanged() {
        let src = StaticSource::new();
        let menu = MenuHandle::new();
        let mut t = ticker(&src, &menu);

        assert!(t.tick());
        let before = menu.snapshot();

        src.set_cpu(99.0);
        src.set_memory(99.0);
        src.fail(MetricKind::Disk);
        assert!(!t.tick());

        assert_eq!(menu.snapshot(), before);
        assert_eq!(menu.text(MenuItem::Cpu), "CPU: 12.5%");
        assert_eq!(menu.text(MenuItem::Ram), "RAM: 50.0%");
        assert_eq!(t.failures(), 1);

        src.recover(MetricKind::Disk);
        assert!(t.tick());
        assert_eq!(menu.text(MenuItem::Cpu), "CPU: 99.0%");
        assert_eq!(t.cycles(), 3);
    }

    #[test]
    fn test_failed_disk_query_logs_metric_name() {
        let src = StaticSource::new();
        src.fail(MetricKind::Disk);
        let menu = MenuHandle::new();
        let mut t = ticker(&src, &menu);

        let logs = capture_logs(|| assert!(!t.tick()));

        let line = logs
            .lines()
            .find(|l| l.contains("Error getting"))
            .unwrap_or_else(|| panic!("no error line in: {}", logs));
        assert!(line.contains("ERROR"), "got: {}", line);
        assert!(line.contains("Error getting disk info"), "got: {}", line);
        assert!(line.contains("scripted disk info failure"), "got: {}", line);
        assert_eq!(menu.text(MenuItem::Disk), "Disk: -");
    }

    #[test]
    fn test_successful_tick_logs_no_error() {
        let src = StaticSource::new();
        let menu = MenuHandle::new();
        let mut t = ticker(&src, &menu);

        let logs = capture_logs(|| assert!(t.tick()));
        assert!(!logs.contains("ERROR"), "got: {}", logs);
    }

    #[test]
    fn test_network_rate_across_ticks() {
        let src = StaticSource::new();
        src.push_network(MIB, MIB);
        src.push_network(3 * MIB, 2 * MIB);
        let menu = MenuHandle::new();
        let mut t = ticker(&src, &menu);

        t.tick();
        assert_eq!(
            menu.text(MenuItem::Network),
            "Network: Sent: 0.00 MB/s, Received: 0.00 MB/s"
        );

        t.tick();
        assert_eq!(
            menu.text(MenuItem::Network),
            "Network: Sent: 1.00 MB/s, Received: 0.50 MB/s"
        );
    }

    #[test]
    fn test_failed_cycle_keeps_network_state() {
        let src = StaticSource::new();
        src.push_network(MIB, MIB);
        let menu = MenuHandle::new();
        let mut t = ticker(&src, &menu);

        t.tick();
        let warm = t.state();
        src.fail(MetricKind::Uptime);
        t.tick();
        assert_eq!(t.state(), warm);
    }

    #[test]
    fn test_quit_terminates_shell() {
        let src = StaticSource::new();
        let menu = MenuHandle::new();
        let (tx, rx) = quit_channel();

        let poll = PollLoop::start(src, Arc::new(menu.clone()), rx).unwrap();
        assert!(!menu.is_terminated());

        // The ticker is still in its first two-second sleep.
        let start = Instant::now();
        assert!(tx.send());
        poll.join_quit_wait().unwrap();

        assert!(menu.is_terminated());
        assert!(start.elapsed() < REFRESH_INTERVAL);
        assert_eq!(menu.text(MenuItem::Cpu), "CPU: -");
    }

    #[test]
    fn test_ticker_thread_updates_menu() {
        let src = StaticSource::new();
        src.set_cpu(33.3);
        let menu = MenuHandle::new();
        let (_tx, rx) = quit_channel();

        let _poll = PollLoop::start_with_interval(
            src,
            Arc::new(menu.clone()),
            rx,
            Duration::from_millis(10),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while menu.text(MenuItem::Cpu) != "CPU: 33.3%" {
            assert!(Instant::now() < deadline, "ticker never updated the menu");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_closed_quit_channel_terminates() {
        let menu = MenuHandle::new();
        let (tx, rx) = quit_channel();
        drop(tx);

        let poll = PollLoop::start(StaticSource::new(), Arc::new(menu.clone()), rx).unwrap();
        poll.join_quit_wait().unwrap();
        assert!(menu.is_terminated());
    }
}
