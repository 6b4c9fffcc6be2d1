// src/lib.rs

pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod services;

pub use config::Config;
pub use error::PortfolioError;
pub use services::portfolio::{analyze, run, PortfolioReport};
