pub mod connection;
pub mod maintenance;
pub mod schema;
pub mod trusted;
pub mod untrusted;

pub use connection::{Collections, Database};
pub use trusted::Promotion;
