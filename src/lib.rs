pub mod api;
pub mod checker;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod reconcile;
pub mod store;
