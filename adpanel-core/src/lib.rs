pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod playlist;
pub mod service;
pub mod store;
pub mod vmix;

pub use config::Config;
pub use error::{Error, Result};
