//! Configuration management
//!
//! Storage locations, difficulty and the default reward address, read from
//! the environment once and shared through [`GLOBAL_CONFIG`].

pub mod settings;

pub use settings::{parse_bits, Config, GLOBAL_CONFIG};
