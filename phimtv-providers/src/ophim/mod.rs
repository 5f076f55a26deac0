//! OPhim (ophim1.com) provider client
//!
//! OPhim runs the same catalog software family as KKPhim, so its wire
//! envelopes deserialize with the KKPhim types. What differs is the image
//! hosting: OPhim returns paths relative to its own CDN
//! (`img.ophim.live/uploads/movies/`), which the normalizer upstream must
//! resolve with this provider's image base rather than KKPhim's.

pub mod client;

pub use client::OPhimClient;

// Same wire shapes as KKPhim; see module doc.
pub use crate::kkphim::types;
