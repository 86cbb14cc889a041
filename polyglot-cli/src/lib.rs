//! CLI library for testing purposes

pub mod config;
pub mod view;

pub use config::CliConfig;
