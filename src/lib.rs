// src/lib.rs
pub mod analysis;
pub mod channels;
pub mod config;
pub mod discovery;
pub use analysis::{AnalysisError, AnalysisReport, OnsetPipeline, Recording};
pub use config::{AnalysisConfig, ConfigError};
