pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fleet;
pub mod journal;
pub mod platform;
pub mod provision;
pub mod proxy;
pub mod registry;
pub mod status;
pub mod supervisor;
pub mod ui;

#[cfg(test)]
pub mod testing;
