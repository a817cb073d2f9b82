//! Command handlers, one module per subcommand.

pub mod apply;
pub mod config;
pub mod connection;
pub mod diagnose;
pub mod extract;
pub mod generate;
pub mod message;
