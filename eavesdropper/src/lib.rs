pub mod config;
pub mod handler;
pub mod sink;
pub mod transport;
