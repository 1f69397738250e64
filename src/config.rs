// src/config.rs
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::analysis::{
    AnalysisError, ArtifactConfig, ChannelSelection, CollisionPolicy, EdgeMode, EpochOptions,
    OnsetParams,
};
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] AnalysisError),
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Annotation description that marks a trigger.
    pub event_label: String,
    pub pre_time: f64,
    pub post_time: f64,
    /// Baseline length before each trigger, seconds.
    pub start_offset: f64,
    /// Baseline standard deviations above the baseline mean.
    pub threshold: f64,
    /// Burst scan length after each trigger, seconds.
    pub duration: f64,
    /// Moving-average length, samples.
    pub win_size: usize,
    /// Explicit channels to scan. When absent, channels whose name contains
    /// `channel_marker` are scanned.
    pub channels: Option<Vec<String>>,
    pub channel_marker: String,
    pub collision: CollisionPolicy,
    pub edge_mode: EdgeMode,
    /// Rectify epochs before averaging.
    pub rectify: bool,
    /// Directory for diagnostic PNG plots; no plots when absent.
    pub plot: Option<PathBuf>,
    pub recording_extension: String,
    pub artifacts: ArtifactConfig,
}
impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            event_label: "x".to_string(),
            pre_time: 0.5,
            post_time: 0.5,
            start_offset: 1.0,
            threshold: 3.0,
            duration: 1.0,
            win_size: 10,
            channels: None,
            channel_marker: "EMG".to_string(),
            collision: CollisionPolicy::default(),
            edge_mode: EdgeMode::default(),
            rectify: true,
            plot: None,
            recording_extension: "json".to_string(),
            artifacts: ArtifactConfig::default(),
        }
    }
}
impl AnalysisConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.onset_params().validate()?;
        self.epoch_options().validate()?;
        if self.event_label.is_empty() {
            return Err(AnalysisError::invalid("event_label", "must not be empty"));
        }
        Ok(())
    }
    pub fn onset_params(&self) -> OnsetParams {
        OnsetParams {
            offset: self.start_offset,
            threshold_sd: self.threshold,
            duration: self.duration,
            win_size: self.win_size,
            edge: self.edge_mode,
            collision: self.collision,
        }
    }
    pub fn epoch_options(&self) -> EpochOptions {
        EpochOptions::new(self.pre_time, self.post_time).rectified(self.rectify)
    }
    pub fn channel_selection(&self) -> ChannelSelection {
        match &self.channels {
            Some(names) => ChannelSelection::named(names.iter().cloned()),
            None => ChannelSelection::containing(self.channel_marker.clone()),
        }
    }
}
