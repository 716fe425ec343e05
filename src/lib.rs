pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gerrit;
pub mod logging;
pub mod model;
pub mod report;
