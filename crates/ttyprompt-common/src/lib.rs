pub mod config;
pub mod error;
pub mod history;
pub mod keys;
