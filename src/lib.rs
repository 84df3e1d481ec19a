pub mod battle;
pub mod cli;
pub mod config;
pub mod logging;
pub mod names;
pub mod server;
