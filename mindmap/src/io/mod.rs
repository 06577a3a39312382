//! Side-effecting collaborators around the pure pipeline core.

pub mod config;
pub mod prompt;
pub mod store;
pub mod transport;
