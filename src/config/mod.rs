//! Configuration module for CardioPix
//!
//! CLI arguments, environment overrides and resolved settings.

mod settings;

pub use settings::*;
