//! Shared menu model.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use super::{APP_TITLE, MenuItem, MenuShell};
use crate::fmt::format_bytes;

/// What the renderer draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuModel {
    pub title: String,
    pub tooltip: String,
    pub icon: Option<Vec<u8>>,
    /// Text of each metric item, indexed by [`MenuItem::index`].
    pub items: [String; 5],
    /// Highlighted row: 0..5 are metric items, 5 is "Terminate".
    pub selected: usize,
}

impl MenuModel {
    /// Number of selectable rows (five items plus "Terminate").
    pub const ROWS: usize = 6;

    pub fn new() -> Self {
        Self {
            title: APP_TITLE.to_string(),
            tooltip: APP_TITLE.to_string(),
            icon: None,
            items: MenuItem::ALL.map(|item| item.placeholder().to_string()),
            selected: Self::ROWS - 1,
        }
    }

    pub fn text(&self, item: MenuItem) -> &str {
        &self.items[item.index()]
    }

    pub fn quit_selected(&self) -> bool {
        self.selected == Self::ROWS - 1
    }
}

impl Default for MenuModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, thread-safe handle to the menu.
///
/// The ticker writes item text through it while the UI loop reads
/// [`snapshot`](Self::snapshot)s to draw.
#[derive(Debug, Clone, Default)]
pub struct MenuHandle {
    model: Arc<Mutex<MenuModel>>,
    terminated: Arc<AtomicBool>,
}

impl MenuHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn model(&self) -> MutexGuard<'_, MenuModel> {
        // A panicked writer leaves plain strings behind; keep drawing them.
        self.model.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current model for rendering.
    pub fn snapshot(&self) -> MenuModel {
        self.model().clone()
    }

    pub fn text(&self, item: MenuItem) -> String {
        self.model().text(item).to_string()
    }

    pub fn select_next(&self) {
        let mut model = self.model();
        model.selected = (model.selected + 1) % MenuModel::ROWS;
    }

    pub fn select_prev(&self) {
        let mut model = self.model();
        model.selected = (model.selected + MenuModel::ROWS - 1) % MenuModel::ROWS;
    }

    pub fn quit_selected(&self) -> bool {
        self.model().quit_selected()
    }
}

impl MenuShell for MenuHandle {
    fn set_display_text(&self, item: MenuItem, text: &str) {
        self.model().items[item.index()] = text.to_string();
    }

    fn set_icon(&self, icon: &[u8]) {
        debug!("menu icon set ({})", format_bytes(icon.len() as u64));
        self.model().icon = Some(icon.to_vec());
    }

    fn set_title(&self, title: &str) {
        self.model().title = title.to_string();
    }

    fn set_tooltip(&self, tooltip: &str) {
        self.model().tooltip = tooltip.to_string();
    }

    fn request_terminate(&self) {
        if !self.terminated.swap(true, Ordering::SeqCst) {
            info!("Terminate requested");
        }
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}
