//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 `discover/movie` and
//! `search/movie` endpoints.

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    DiscoverMovieParams, IMAGE_BASE_URL, SearchMovieParams, TmdbErrorResponse, TmdbMovie,
    TmdbMoviePage, WEB_BASE_URL,
};
