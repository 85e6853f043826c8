//! API client library for cinefind.
//!
//! Provides clients for the TMDB movie catalog and the Appwrite
//! document store that keeps search-count telemetry.

/// Appwrite document store client.
pub mod appwrite;

/// TMDB API client.
pub mod tmdb;
