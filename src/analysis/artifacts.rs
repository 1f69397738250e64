//! Artifact removal through an external component decomposition.
//!
//! The decomposition itself (ICA and its automatic labeler) lives behind
//! [`ComponentDecomposer`]. This module band-passes the recording, asks the
//! decomposer for one component per channel, and removes every component not
//! labeled brain or other.
use std::str::FromStr;
use log::info;
use serde::{Deserialize, Serialize};
use crate::analysis::filter::BandPass;
use crate::analysis::recording::Recording;
use crate::analysis::AnalysisError;
/// Automatic component classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentLabel {
    Brain,
    MuscleArtifact,
    EyeBlink,
    HeartBeat,
    LineNoise,
    ChannelNoise,
    Other,
}
impl ComponentLabel {
    pub fn is_kept(self) -> bool {
        matches!(self, ComponentLabel::Brain | ComponentLabel::Other)
    }
}
impl FromStr for ComponentLabel {
    type Err = AnalysisError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', " ").as_str() {
            "brain" => Ok(ComponentLabel::Brain),
            "muscle artifact" | "muscle" => Ok(ComponentLabel::MuscleArtifact),
            "eye blink" | "eye" => Ok(ComponentLabel::EyeBlink),
            "heart beat" | "heart" => Ok(ComponentLabel::HeartBeat),
            "line noise" => Ok(ComponentLabel::LineNoise),
            "channel noise" => Ok(ComponentLabel::ChannelNoise),
            "other" => Ok(ComponentLabel::Other),
            other => Err(AnalysisError::Decomposition(format!(
                "unknown component label `{other}`"
            ))),
        }
    }
}
/// Independent-component decomposition with automatic labeling.
pub trait ComponentDecomposer {
    /// Fits `n_components` sources; `seed` makes the fit reproducible.
    fn fit(&mut self, recording: &Recording, n_components: usize, seed: u64) -> Result<(), AnalysisError>;
    /// One label per fitted component.
    fn label_components(&self, recording: &Recording) -> Result<Vec<ComponentLabel>, AnalysisError>;
    /// Reconstructs the recording without the `exclude`d components.
    fn apply(&self, recording: &Recording, exclude: &[usize]) -> Result<Recording, AnalysisError>;
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub enabled: bool,
    pub seed: u64,
    pub l_freq: f64,
    pub h_freq: f64,
}
impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: 69,
            l_freq: 0.005,
            h_freq: 50.0,
        }
    }
}
/// Indices of components to drop.
pub fn artifact_components(labels: &[ComponentLabel]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| !label.is_kept())
        .map(|(idx, _)| idx)
        .collect()
}
#[derive(Clone, Debug, PartialEq)]
pub struct CleanedRecording {
    pub recording: Recording,
    pub labels: Vec<ComponentLabel>,
    pub excluded: Vec<usize>,
}
pub fn remove_artifacts<D: ComponentDecomposer + ?Sized>(
    decomposer: &mut D,
    recording: &Recording,
    config: &ArtifactConfig,
) -> Result<CleanedRecording, AnalysisError> {
    let n_components = recording.num_channels();
    if n_components == 0 {
        return Err(AnalysisError::Decomposition("recording has no channels".into()));
    }
    let filtered = BandPass::new(config.l_freq, config.h_freq)?.apply(recording);
    decomposer.fit(&filtered, n_components, config.seed)?;
    let labels = decomposer.label_components(&filtered)?;
    if labels.len() != n_components {
        return Err(AnalysisError::Decomposition(format!(
            "expected {n_components} component labels, got {}",
            labels.len()
        )));
    }
    let excluded = artifact_components(&labels);
    info!("excluding components {excluded:?} of {n_components}");
    let cleaned = decomposer.apply(&filtered, &excluded)?;
    Ok(CleanedRecording {
        recording: cleaned,
        labels,
        excluded,
    })
}
