pub mod models;
pub mod provider;
pub mod service;
pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
