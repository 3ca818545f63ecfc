//! The menu the metrics are pushed into.
//!
//! The poll loop only needs a narrow view of the UI: set the text of one of
//! five items, and ask the shell to terminate. [`MenuShell`] is that view.
//! [`MenuHandle`] is the thread-safe model behind it; the terminal renderer
//! (feature `tui`) draws the model and turns clicks on "Terminate" into a
//! [`QuitEvent`].

mod menu;
#[cfg(feature = "tui")]
pub mod terminal;

pub use menu::{MenuHandle, MenuModel};

use std::sync::mpsc::{self, Receiver, RecvError, Sender};

/// Application name shown as menu title and tooltip.
pub const APP_TITLE: &str = "GOuge";

/// Text of the quit item.
pub const QUIT_ITEM_TITLE: &str = "Terminate";

/// The five metric slots, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    Cpu,
    Ram,
    Disk,
    Network,
    Uptime,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::Cpu,
        MenuItem::Ram,
        MenuItem::Disk,
        MenuItem::Network,
        MenuItem::Uptime,
    ];

    /// Text before the first sample lands.
    pub fn placeholder(self) -> &'static str {
        match self {
            MenuItem::Cpu => "CPU: -",
            MenuItem::Ram => "RAM: -",
            MenuItem::Disk => "Disk: -",
            MenuItem::Network => "Network: -",
            MenuItem::Uptime => "Uptime: -",
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            MenuItem::Cpu => "CPU Usage",
            MenuItem::Ram => "RAM Usage",
            MenuItem::Disk => "Disk Usage",
            MenuItem::Network => "Network Usage",
            MenuItem::Uptime => "System Uptime",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// What the poll loop and startup code may do to the UI.
pub trait MenuShell: Send + Sync {
    fn set_display_text(&self, item: MenuItem, text: &str);
    fn set_icon(&self, icon: &[u8]);
    fn set_title(&self, title: &str);
    fn set_tooltip(&self, tooltip: &str);
    /// Asks the UI loop to unwind. Idempotent.
    fn request_terminate(&self);
    fn is_terminated(&self) -> bool;
}

/// The user asked to quit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitEvent;

/// Sending half of the quit channel: the "Terminate" item, Ctrl-C.
#[derive(Debug, Clone)]
pub struct QuitSender(Sender<QuitEvent>);

impl QuitSender {
    /// Delivers a quit request. Returns false once nobody is waiting.
    pub fn send(&self) -> bool {
        self.0.send(QuitEvent).is_ok()
    }
}

/// Receiving half of the quit channel, consumed by the quit-wait thread.
#[derive(Debug)]
pub struct QuitReceiver(Receiver<QuitEvent>);

impl QuitReceiver {
    /// Blocks until a quit request arrives. Errors when every sender is gone.
    pub fn wait(&self) -> Result<QuitEvent, RecvError> {
        self.0.recv()
    }
}

/// Creates the quit channel.
pub fn quit_channel() -> (QuitSender, QuitReceiver) {
    let (tx, rx) = mpsc::channel();
    (QuitSender(tx), QuitReceiver(rx))
}
