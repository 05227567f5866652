// src/config/mod.rs
pub mod pulse;

pub use pulse::PulseConfig;
