//! Core types and configuration for notewatch
//!
//! This crate contains domain types shared across all other crates.

mod config;
pub mod constants;
mod env_config;
mod error;
mod item;

pub use config::*;
pub use env_config::{env_parse_with_default, env_string};
pub use error::*;
pub use item::*;
