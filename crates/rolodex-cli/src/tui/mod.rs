//! Terminal user interface (TUI) for rolodex.
//!
//! ## Entry points
//!
//! - [`run`]: full-screen address list with detail pane, selection,
//!   edit modal, and bulk labeling.

pub mod app;
pub mod edit_dialog;
pub mod render;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use rolodex_core::{Session, Settings, SqliteStore, Store};
use std::io;
use std::time::Duration;
use tracing::info;

use app::AddressBookView;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Open the configured address book and run the interactive browser.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the terminal cannot
/// be driven.
pub fn run(settings: &Settings) -> Result<()> {
    let path = settings.database_path();
    let store = SqliteStore::open(&path, settings.list.collation)
        .with_context(|| format!("open address book at {}", path.display()))?;
    let session = Session::open(store).context("load address list")?;
    info!(
        path = %path.display(),
        addresses = session.addresses().len(),
        "tui session opened"
    );
    let mut view = AddressBookView::new(session, settings.labels.default.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal before the default hook prints the panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut view);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("tui session closed");
    result
}

fn run_event_loop<S: Store>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view: &mut AddressBookView<S>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            view.render(frame, area);
        })?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            view.handle_key(key);
        }

        if view.should_quit() {
            break;
        }
    }
    Ok(())
}
