pub mod connections;
pub mod consumer;
pub mod ws;

pub use connections::ConnectionMap;
