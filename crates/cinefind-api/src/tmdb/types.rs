//! TMDB API response types and request parameters.

use serde::Deserialize;

/// Base URL for poster images (w500 size).
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Base URL for the TMDB website.
pub const WEB_BASE_URL: &str = "https://www.themoviedb.org";

// --- Movie list pages ---

/// Response page from `discover/movie` and `search/movie`.
///
/// `results` stays optional so an absent list can be told apart from
/// an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMoviePage {
    /// Current page number.
    #[serde(default)]
    pub page: Option<u32>,
    /// Movie results in provider order.
    #[serde(default)]
    pub results: Option<Vec<TmdbMovie>>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Total number of results.
    #[serde(default)]
    pub total_results: Option<u32>,
}

/// A single movie entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TmdbMovie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: Option<String>,
    /// Original title.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: Option<String>,
    /// Release date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Vote count.
    #[serde(default)]
    pub vote_count: Option<u32>,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl TmdbMovie {
    /// Title for display, `"Untitled"` when missing.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled")
    }

    /// Full poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{IMAGE_BASE_URL}{p}"))
    }

    /// Rating with one decimal, `"N/A"` when absent.
    #[must_use]
    pub fn rating_label(&self) -> String {
        self.vote_average
            .map_or_else(|| String::from("N/A"), |v| format!("{v:.1}"))
    }

    /// Upper-cased language code, `"N/A"` when missing.
    #[must_use]
    pub fn language_label(&self) -> String {
        self.original_language
            .as_deref()
            .filter(|l| !l.is_empty())
            .map_or_else(|| String::from("N/A"), str::to_uppercase)
    }

    /// Release year (first four chars of the date), `"N/A"` when missing.
    #[must_use]
    pub fn release_year(&self) -> &str {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .unwrap_or("N/A")
    }

    /// TMDB web page for this movie.
    #[must_use]
    pub fn web_url(&self) -> String {
        format!("{WEB_BASE_URL}/movie/{}", self.id)
    }
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[serde(default)]
    pub success: bool,
}

// --- Request Parameters ---

/// Parameters for `discover/movie` endpoint.
#[derive(Debug, Clone)]
pub struct DiscoverMovieParams {
    /// Sort order (default: "popularity.desc").
    pub sort_by: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Include adult content.
    pub include_adult: bool,
}

impl Default for DiscoverMovieParams {
    fn default() -> Self {
        Self {
            sort_by: String::from("popularity.desc"),
            language: String::from("en-US"),
            page: 1,
            include_adult: false,
        }
    }
}

impl DiscoverMovieParams {
    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Parameters for `search/movie` endpoint.
#[derive(Debug, Clone)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from("en-US"),
            page: 1,
            include_adult: false,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
