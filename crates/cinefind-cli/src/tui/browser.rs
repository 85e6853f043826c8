//! Movie browser TUI main loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cinefind_api::appwrite::DocumentStore;
use cinefind_api::tmdb::{TmdbApi, TmdbMovie};
use cinefind_core::{ControllerConfig, SearchController, SearchService};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedSender};

use super::state::BrowserState;
use super::ui;

/// Redraw interval while idle (drives the spinner).
const TICK: Duration = Duration::from_millis(100);

/// Runs the movie browser TUI until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub async fn run_browser<C, S>(
    service: Arc<SearchService<C, S>>,
    config: &ControllerConfig,
) -> Result<()>
where
    C: TmdbApi + Sync + 'static,
    S: DocumentStore + Sync + 'static,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let mut controller = SearchController::start(service, config);
    let mut state = BrowserState::default();

    let result = run_event_loop(&mut terminal, &mut controller, &mut state).await;

    // Cleanup (always attempt even if event loop failed)
    let restored = restore_terminal();
    result.and(restored)
}

/// Leaves raw mode and the alternate screen, attempting both steps.
fn restore_terminal() -> Result<()> {
    first_error([
        disable_raw_mode().context("failed to disable raw mode"),
        crossterm::execute!(io::stdout(), LeaveAlternateScreen)
            .context("failed to leave alternate screen"),
    ])
}

/// Returns the first failure among already completed steps.
fn first_error<const N: usize>(steps: [Result<()>; N]) -> Result<()> {
    steps.into_iter().collect()
}

/// Main event loop.
async fn run_event_loop<C, S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut SearchController<C, S>,
    state: &mut BrowserState,
) -> Result<()>
where
    C: TmdbApi + Sync + 'static,
    S: DocumentStore + Sync + 'static,
{
    let (key_tx, mut keys) = mpsc::unbounded_channel();
    let reader = tokio::task::spawn_blocking(move || read_keys(&key_tx));
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal
            .draw(|frame| ui::draw(frame, controller.session(), state))
            .context("failed to draw TUI")?;

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else {
                    // Reader stopped on its own; surface its error.
                    break;
                };
                if handle_input(controller, state, key) {
                    break;
                }
            }
            _ = controller.step() => {
                state.clamp(controller.session().movies().len());
            }
            _ = tick.tick() => state.tick(),
        }
    }

    drop(keys);
    reader.await.context("key reader task failed")?
}

/// Forwards key presses from the terminal until the receiver is dropped.
fn read_keys(tx: &UnboundedSender<KeyEvent>) -> Result<()> {
    while !tx.is_closed() {
        if event::poll(TICK).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
            && tx.send(key).is_err()
        {
            break;
        }
    }
    Ok(())
}

/// Handles one key press. Returns `true` to exit.
fn handle_input<C, S>(
    controller: &mut SearchController<C, S>,
    state: &mut BrowserState,
    key: KeyEvent,
) -> bool
where
    C: TmdbApi + Sync + 'static,
    S: DocumentStore + Sync + 'static,
{
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Esc => {
            if controller.session().query().is_empty() {
                return true;
            }
            controller.clear_query();
        }
        KeyCode::Enter => {
            if let Some(movie) = state.selected_movie(controller.session().movies()) {
                open_movie_page(movie);
            }
        }
        KeyCode::Up => state.move_up(),
        KeyCode::Down => state.move_down(controller.session().movies().len()),
        KeyCode::Backspace => controller.backspace(),
        KeyCode::Char(c) => controller.push_char(c),
        _ => {}
    }
    false
}

/// Opens the TMDB page of a movie in the default browser.
fn open_movie_page(movie: &TmdbMovie) {
    let url = movie.web_url();
    if let Err(e) = open::that(&url) {
        tracing::warn!(url = %url, error = %e, "failed to open browser");
    }
}
