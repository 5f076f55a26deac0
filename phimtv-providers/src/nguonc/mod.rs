//! NguonC (phim.nguonc.com) provider client

pub mod client;
pub mod types;

pub use client::NguonCClient;
