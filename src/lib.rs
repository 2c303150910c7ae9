pub mod api;
pub mod cli;
pub mod core;
pub mod generators;
pub mod logging;
pub mod models;
