pub mod commands;
pub mod maintenance;
pub mod query;
pub mod report;
pub mod serve;
pub mod reconcile;

pub use commands::{Cli, Commands};
