pub mod cli;
pub mod config;
pub mod export;
pub mod fetch;
pub mod server;
pub mod store;
pub mod upload;

pub use cli::{run, Cli};
