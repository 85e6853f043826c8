//! Browser view state (cursor and spinner).
//!
//! Search state lives in `cinefind_core::SearchSession`; this only holds
//! what the terminal view adds on top of it.

use cinefind_api::tmdb::TmdbMovie;
use ratatui::widgets::ListState;

/// Braille spinner frames.
const SPINNER_FRAMES: [char; 10] = [
    '\u{280b}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283c}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280f}',
];

/// State for the movie browser TUI.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct BrowserState {
    /// Movie list selection.
    pub list_state: ListState,
    /// Spinner frame index.
    spinner: usize,
}

impl BrowserState {
    /// Returns the cursor position in the movie list.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    /// Returns the movie under the cursor.
    #[must_use]
    pub fn selected_movie<'a>(&self, movies: &'a [TmdbMovie]) -> Option<&'a TmdbMovie> {
        movies.get(self.cursor())
    }

    /// Moves cursor up.
    pub fn move_up(&mut self) {
        let current = self.cursor();
        self.list_state.select(Some(current.saturating_sub(1)));
    }

    /// Moves cursor down, stopping at the last of `count` entries.
    pub fn move_down(&mut self, count: usize) {
        let max = count.saturating_sub(1);
        let current = self.cursor();
        self.list_state
            .select(Some(current.saturating_add(1).min(max)));
    }

    /// Keeps the cursor inside a list of `count` entries.
    pub fn clamp(&mut self, count: usize) {
        if count == 0 {
            self.list_state.select(None);
        } else {
            let current = self.cursor();
            self.list_state
                .select(Some(current.min(count.saturating_sub(1))));
        }
    }

    /// Advances the spinner by one frame.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn tick(&mut self) {
        self.spinner = self.spinner.wrapping_add(1) % SPINNER_FRAMES.len();
    }

    /// Returns the current spinner frame.
    #[must_use]
    pub fn spinner(&self) -> char {
        SPINNER_FRAMES
            .get(self.spinner)
            .copied()
            .unwrap_or(' ')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies(n: u64) -> Vec<TmdbMovie> {
        (1..=n)
            .map(|id| TmdbMovie {
                id,
                ..TmdbMovie::default()
            })
            .collect()
    }

    #[test]
    fn test_initial_state() {
        // Arrange & Act
        let state = BrowserState::default();

        // Assert
        assert_eq!(state.cursor(), 0);
        assert!(state.selected_movie(&[]).is_none());
    }

    #[test]
    fn test_move_down_and_up() {
        // Arrange
        let mut state = BrowserState::default();
        let list = movies(3);

        // Act
        state.move_down(list.len());
        state.move_down(list.len());
        state.move_down(list.len());

        // Assert
        assert_eq!(state.cursor(), 2);
        assert_eq!(state.selected_movie(&list).map(|m| m.id), Some(3));

        state.move_up();
        assert_eq!(state.cursor(), 1);
        state.move_up();
        state.move_up();
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_clamp_after_shorter_results() {
        // Arrange
        let mut state = BrowserState::default();
        for _ in 0..5 {
            state.move_down(10);
        }

        // Act
        state.clamp(2);

        // Assert
        assert_eq!(state.cursor(), 1);

        state.clamp(0);
        assert!(state.list_state.selected().is_none());
    }

    #[test]
    fn test_spinner_wraps() {
        // Arrange
        let mut state = BrowserState::default();
        let first = state.spinner();

        // Act
        for _ in 0..SPINNER_FRAMES.len() {
            state.tick();
        }

        // Assert
        assert_eq!(state.spinner(), first);
    }
}
