//! TUI rendering logic for the movie browser.

use cinefind_api::tmdb::TmdbMovie;
use cinefind_core::{FetchState, SearchSession};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::state::BrowserState;

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, session: &SearchSession, state: &mut BrowserState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search input
            Constraint::Min(8),    // main content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_search(frame, chunks[0], session, state);
    draw_main(frame, chunks[1], session, state);
    draw_footer(frame, chunks[2]);
}

/// Draws the search input with the fetch status on the right.
#[allow(clippy::indexing_slicing)]
fn draw_search(frame: &mut Frame, area: Rect, session: &SearchSession, state: &BrowserState) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(session.query()),
        Span::styled("_", Style::default().fg(Color::DarkGray)),
    ]))
    .style(Style::default().fg(Color::Yellow))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search through thousands of movies "),
    );
    frame.render_widget(input, header_chunks[0]);

    let status = match session.fetch_state() {
        FetchState::Idle => Span::raw(""),
        FetchState::Loading => Span::styled(
            format!("{} Loading...", state.spinner()),
            Style::default().fg(Color::Cyan),
        ),
        FetchState::Success(movies) => Span::raw(format!("{} movies", movies.len())),
        FetchState::Failure(_) => Span::styled("Error", Style::default().fg(Color::Red)),
    };
    let status = Paragraph::new(Line::from(status))
        .block(Block::default().borders(Borders::ALL).title(" cinefind "));
    frame.render_widget(status, header_chunks[1]);
}

/// Draws trending, movie list and detail panes.
#[allow(clippy::indexing_slicing)]
fn draw_main(frame: &mut Frame, area: Rect, session: &SearchSession, state: &mut BrowserState) {
    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(40),
            Constraint::Percentage(35),
        ])
        .split(area);

    draw_trending(frame, pane_chunks[0], session);
    draw_movies(frame, pane_chunks[1], session, state);
    draw_detail(
        frame,
        pane_chunks[2],
        state.selected_movie(session.movies()),
    );
}

/// Draws the trending list (left pane).
fn draw_trending(frame: &mut Frame, area: Rect, session: &SearchSession) {
    let items: Vec<ListItem> = session
        .trending()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>2} ", i.saturating_add(1)),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(t.title.clone()),
                Span::styled(
                    format!(" ({})", t.count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Trending Movies "),
    );
    frame.render_widget(list, area);
}

/// Draws the movie list (middle pane), or the error message.
fn draw_movies(frame: &mut Frame, area: Rect, session: &SearchSession, state: &mut BrowserState) {
    let title = match session.debounced() {
        Some(term) if !term.trim().is_empty() => format!(" Results for \"{}\" ", term.trim()),
        _ => String::from(" Popular "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    if let Some((message, color)) = results_placeholder(session, state.spinner()) {
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = session
        .movies()
        .iter()
        .map(|m| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("\u{2605} {:<4}", m.rating_label()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(String::from(m.display_title())),
                Span::styled(
                    format!("  {}", m.release_year()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_stateful_widget(list, area, &mut state.list_state);
}

/// Text shown instead of the movie list while loading or after a failure.
fn results_placeholder(session: &SearchSession, spinner: char) -> Option<(String, Color)> {
    if session.is_loading() {
        return Some((format!("{spinner} Loading..."), Color::Cyan));
    }
    session
        .error_message()
        .map(|message| (String::from(message), Color::Red))
}

/// Draws details of the selected movie (right pane).
fn draw_detail(frame: &mut Frame, area: Rect, movie: Option<&TmdbMovie>) {
    let block = Block::default().borders(Borders::ALL).title(" Details ");
    let Some(m) = movie else {
        frame.render_widget(block, area);
        return;
    };

    let label = Style::default().fg(Color::Yellow);
    let mut lines = vec![
        Line::from(Span::styled(
            String::from(m.display_title()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Rating:   ", label),
            Span::raw(m.rating_label()),
        ]),
        Line::from(vec![
            Span::styled("Language: ", label),
            Span::raw(m.language_label()),
        ]),
        Line::from(vec![
            Span::styled("Year:     ", label),
            Span::raw(String::from(m.release_year())),
        ]),
        Line::from(vec![
            Span::styled("Poster:   ", label),
            Span::raw(
                m.poster_url()
                    .unwrap_or_else(|| String::from("No poster")),
            ),
        ]),
    ];
    if let Some(overview) = m.overview.as_deref().filter(|o| !o.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(String::from(overview)));
    }

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(detail, area);
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect) {
    let help_text = "Type to search  \u{2191}\u{2193}: move  Enter: open on TMDB  Esc: clear / quit  Ctrl-C: quit";
    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use cinefind_core::{NO_MOVIES_FOUND, StaleResponsePolicy};

    use super::*;

    #[test]
    fn test_placeholder_shows_spinner_while_loading() {
        // Arrange
        let mut session = SearchSession::new(StaleResponsePolicy::default());
        session.mount();

        // Act
        let placeholder = results_placeholder(&session, '*');

        // Assert
        assert_eq!(
            placeholder,
            Some((String::from("* Loading..."), Color::Cyan))
        );
    }

    #[test]
    fn test_placeholder_shows_failure_message() {
        // Arrange
        let mut session = SearchSession::new(StaleResponsePolicy::default());
        let ticket = session.mount();
        session.apply(ticket, FetchState::Failure(String::from(NO_MOVIES_FOUND)));

        // Act
        let placeholder = results_placeholder(&session, '*');

        // Assert
        assert_eq!(
            placeholder,
            Some((String::from(NO_MOVIES_FOUND), Color::Red))
        );
    }

    #[test]
    fn test_placeholder_absent_for_idle_session() {
        // Arrange
        let session = SearchSession::new(StaleResponsePolicy::default());

        // Act & Assert
        assert_eq!(results_placeholder(&session, '*'), None);
    }
}
