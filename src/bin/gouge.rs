//! gouge - live system metrics in a small menu.
//!
//! Shows CPU, RAM, disk, network throughput and uptime, refreshed every two
//! seconds. Logs go to a transient file that is removed on exit.
//!
//! Usage:
//!   gouge                    # log to ./gouge.log at INFO
//!   gouge -v                 # DEBUG logging
//!   gouge --log-file /tmp/g  # log elsewhere

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use gouge::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use gouge::collector::SysinfoSource;
#[cfg(target_os = "linux")]
use gouge::collector::{HostSource, PlatformDisk};
use gouge::fmt::format_bytes;
use gouge::icon::{exe_dir, find_icon};
use gouge::logging::{DEFAULT_LOG_FILE, init_logging};
use gouge::poll::PollLoop;
use gouge::shell::terminal::TerminalMenu;
use gouge::shell::{APP_TITLE, MenuHandle, MenuShell, QuitReceiver};

/// Live system metrics menu.
#[derive(Parser)]
#[command(name = "gouge", about = "Live system metrics menu", version)]
struct Args {
    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// Log file, removed when gouge exits.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Path to /proc filesystem (Linux only).
    #[arg(long, default_value = "/proc")]
    proc_path: String,
}

fn main() {
    let args = Args::parse();

    let log_file = init_logging(args.verbose, args.quiet, &args.log_file);
    info!("gouge {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: proc={}, log={}",
        args.proc_path,
        args.log_file.display()
    );

    let terminal = TerminalMenu::new(MenuHandle::new());

    let quit = terminal.quit_sender();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        quit.send();
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let proc_path = args.proc_path;
    let result = terminal.run(
        move |menu, quit_rx| on_ready(menu, quit_rx, &proc_path),
        || info!("Menu closed"),
    );

    if let Err(ref e) = result {
        error!("Menu failed: {}", e);
        eprintln!("Error running menu: {}", e);
    }

    println!("Application is closing and cleaning up...");
    if let Err(e) = log_file.cleanup() {
        eprintln!("Failed to remove log file: {}", e);
    }

    if result.is_err() {
        std::process::exit(1);
    }
}

/// Called once the menu is on screen.
fn on_ready(menu: &MenuHandle, quit_rx: QuitReceiver, proc_path: &str) {
    match find_icon(&RealFs::new(), exe_dir().as_deref()) {
        Ok(icon) => {
            info!(
                "Setting icon from {}, size: {}",
                icon.path.display(),
                format_bytes(icon.bytes.len() as u64)
            );
            menu.set_icon(&icon.bytes);
        }
        Err(e) => warn!("Error loading icon: {}", e),
    }

    menu.set_title(APP_TITLE);
    menu.set_tooltip(APP_TITLE);

    #[cfg(target_os = "linux")]
    let source = HostSource::new(RealFs::new(), proc_path, PlatformDisk::new());
    #[cfg(not(target_os = "linux"))]
    let source = {
        let _ = proc_path;
        SysinfoSource::new()
    };

    if let Err(e) = PollLoop::start(source, Arc::new(menu.clone()), quit_rx) {
        error!("Failed to start poll loop: {}", e);
        menu.request_terminate();
    }
}
