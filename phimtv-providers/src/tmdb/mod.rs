//! TMDB (themoviedb.org) metadata lookup client

pub mod client;
pub mod types;

pub use client::TmdbClient;
