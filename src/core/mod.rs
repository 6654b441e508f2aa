//! Core module
//!
//! Contains the resource configuration and the game session

mod config;
mod session;

pub use config::ResourceConfig;
pub use session::{GameState, Session};
