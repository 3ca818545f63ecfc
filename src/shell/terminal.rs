//! Terminal rendering of the menu.
//!
//! Draws the title, the five metric items, a separator and "Terminate" as a
//! dropdown in the top-left corner of the terminal. Input is polled on a
//! separate thread; choosing "Terminate" (or `q`, `Esc`, Ctrl-C) sends a
//! [`QuitEvent`](super::QuitEvent) and the loop unwinds once the shell has
//! been told to terminate.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::cursor;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::{debug, warn};

use super::{
    MenuHandle, MenuItem, MenuModel, MenuShell, QUIT_ITEM_TITLE, QuitReceiver, QuitSender,
    quit_channel,
};

/// Redraw and termination-check cadence.
const UI_TICK: Duration = Duration::from_millis(200);

/// Marker drawn before the title once an icon is loaded.
const ICON_MARKER: &str = "◉ ";

/// Terminal events.
#[derive(Debug)]
enum Event {
    Tick,
    Key(KeyEvent),
    Resize,
}

/// Polls terminal input on a separate thread.
struct EventHandler {
    rx: Receiver<Event>,
    /// Kept alive to prevent channel closure.
    _tx: Sender<Event>,
}

impl EventHandler {
    fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let event_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            CrosstermEvent::Key(key) => Event::Key(key),
                            CrosstermEvent::Resize(_, _) => Event::Resize,
                            _ => continue,
                        };
                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                } else if event_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

/// Runs a restore action once: through [`restore`](Self::restore), or on
/// drop if that was never reached.
struct RestoreGuard<F: FnOnce() -> io::Result<()>> {
    action: Option<F>,
}

impl<F: FnOnce() -> io::Result<()>> RestoreGuard<F> {
    fn new(action: F) -> Self {
        Self {
            action: Some(action),
        }
    }

    fn restore(mut self) -> io::Result<()> {
        match self.action.take() {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}

impl<F: FnOnce() -> io::Result<()>> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            if let Err(e) = action() {
                warn!("failed to restore terminal: {}", e);
            }
        }
    }
}

/// Leaves raw mode and the alternate screen. Safe to call when setup only
/// got half way.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Moved,
    QuitClicked,
}

/// Applies one key press to the menu.
pub fn handle_key(menu: &MenuHandle, quit: &QuitSender, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::None;
    }

    let clicked_quit = match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            menu.select_prev();
            return KeyAction::Moved;
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
            menu.select_next();
            return KeyAction::Moved;
        }
        KeyCode::Enter => menu.quit_selected(),
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        _ => false,
    };

    if !clicked_quit {
        return KeyAction::None;
    }
    if !quit.send() {
        // Nobody is waiting for the event any more; unwind directly.
        warn!("quit listener is gone, terminating directly");
        menu.request_terminate();
    }
    KeyAction::QuitClicked
}

/// Draws the menu.
pub fn render_menu(frame: &mut Frame, model: &MenuModel) {
    let area = frame.area();

    let title = match model.icon {
        Some(_) => format!(" {}{} ", ICON_MARKER, model.title),
        None => format!(" {} ", model.title),
    };

    let widest = model
        .items
        .iter()
        .map(|s| s.chars().count())
        .chain([QUIT_ITEM_TITLE.len(), title.chars().count(), model.tooltip.chars().count()])
        .max()
        .unwrap_or(0) as u16;
    // Border + one column of padding on each side.
    let width = (widest + 4).min(area.width);
    let height = (MenuModel::ROWS as u16 + 4).min(area.height);
    let menu_area = Rect::new(area.x, area.y, width, height);

    frame.render_widget(Clear, menu_area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(menu_area);
    frame.render_widget(block, menu_area);

    let row_style = |row: usize| {
        if row == model.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let mut lines: Vec<Line> = MenuItem::ALL
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!(" {}", model.text(*item)),
                row_style(item.index()),
            ))
        })
        .collect();
    lines.push(Line::from(Span::styled(
        "─".repeat(inner.width as usize),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        format!(" {}", QUIT_ITEM_TITLE),
        row_style(MenuModel::ROWS - 1),
    )));
    lines.push(Line::from(Span::styled(
        format!(" {}", model.tooltip),
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// The menu running in the terminal.
pub struct TerminalMenu {
    menu: MenuHandle,
    quit_tx: QuitSender,
    quit_rx: QuitReceiver,
}

impl TerminalMenu {
    pub fn new(menu: MenuHandle) -> Self {
        let (quit_tx, quit_rx) = quit_channel();
        Self {
            menu,
            quit_tx,
            quit_rx,
        }
    }

    /// Another way to deliver the quit event (signal handlers).
    pub fn quit_sender(&self) -> QuitSender {
        self.quit_tx.clone()
    }

    /// Runs the menu until the shell is terminated.
    ///
    /// `on_ready` is called once the terminal is set up and the menu is on
    /// screen, with the receiving end of the quit channel. `on_exit` runs
    /// after the terminal has been restored.
    pub fn run<R, X>(self, on_ready: R, on_exit: X) -> io::Result<()>
    where
        R: FnOnce(&MenuHandle, QuitReceiver),
        X: FnOnce(),
    {
        let TerminalMenu {
            menu,
            quit_tx,
            quit_rx,
        } = self;

        enable_raw_mode()?;
        let guard = RestoreGuard::new(restore_terminal);
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let events = EventHandler::new(UI_TICK);

        terminal.draw(|frame| render_menu(frame, &menu.snapshot()))?;
        on_ready(&menu, quit_rx);

        let result = loop {
            if menu.is_terminated() {
                break Ok(());
            }

            match events.next() {
                Ok(Event::Tick) | Ok(Event::Resize) => {}
                Ok(Event::Key(key)) => {
                    let action = handle_key(&menu, &quit_tx, key);
                    debug!("key {:?} -> {:?}", key.code, action);
                }
                Err(_) => {
                    // Input thread died; nothing can click quit any more.
                    menu.request_terminate();
                }
            }

            if let Err(e) = terminal.draw(|frame| render_menu(frame, &menu.snapshot())) {
                break Err(e);
            }
        };

        drop(terminal);
        guard.restore()?;

        on_exit();
        result
    }
}
