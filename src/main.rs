//! pagefeed: paginated feeds, a chat and a publish form in the terminal,
//! backed by mock data sources.
//!
//! ## Architecture overview
//!
//! ```text
//!                 Page<T>               items / is_loading / has_more
//! ┌───────────┐ (blocking) ┌──────────────┐  (watch)   ┌───────────┐  draw()  ┌─────────┐
//! │ source/   │ ◄───────── │ viewmodel/   │ ─────────► │ screen/   │ ───────► │  ui.rs  │
//! │ (mock)    │ ─────────► │ (tokio task) │            │ (binding) │          │(render) │
//! └───────────┘            └──────────────┘ ◄───────── └───────────┘          └─────────┘
//!                                          triggers (mpsc)  ▲
//!                                                           │ handle_key_event()
//!                                      ┌────────┐      ┌──────────┐
//!                                      │ app.rs │ ◄─── │ input.rs │
//!                                      └────────┘      └──────────┘
//! ```
//!
//! * **`source/`**: the `DataSource` / `Publisher` traits, item models and
//!   the mock implementations with simulated latency and failures.
//! * **`paging`**: the paged list state machine (refresh, load more, dedup).
//! * **`viewmodel/`**: input/output view-models; one driver task each.
//! * **`binding`**: projects an items stream onto a rendered list.
//! * **`screen/`**: the tab screens and the publish and chat modals.
//! * **`tabs`**: the tab bar with its center publish slot.
//! * **`app`**: owns the screens, the modal and the status line.
//! * **`ui`**: pure rendering helpers.
//! * **`input`**: maps key events to `App` actions.
//! * **`main`**: wires everything together: parse args, set up logging, the
//!   runtime and the terminal, and run the event loop.

mod app;
mod binding;
mod config;
mod error;
mod input;
mod logging;
mod paging;
mod screen;
mod source;
mod tabs;
mod ui;
mod viewmodel;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use config::Config;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- parse arguments -----------------------------------------------------
    let config = Config::parse();
    config.validate()?;
    logging::init(&config.log_file)?;
    tracing::info!(?config, "starting");

    install_panic_hook();

    // -- runtime for view-model drivers and fetches --------------------------
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    // -- terminal setup (RAII, Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(&config, runtime.handle().clone());

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Bind view-model state into the visible screens.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        app.bind_state();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // Screens first, so their drivers are aborted before the runtime stops.
    drop(app);
    drop(guard);
    runtime.shutdown_timeout(Duration::from_millis(500));
    tracing::info!("exiting");
    Ok(())
}
