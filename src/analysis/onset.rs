use std::fmt;
use std::sync::Arc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use crate::analysis::baseline::{estimate_baseline, sample_at};
use crate::analysis::burst::{BurstDetector, BurstOutcome, EdgeMode};
use crate::analysis::recording::Recording;
use crate::analysis::AnalysisError;
/// Detected burst onset and the channel/event that produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Onset {
    pub time: f64,
    pub channel: String,
    pub event_time: f64,
}
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SkipReason {
    NoBurst,
    Failed(String),
}
/// (channel, event) pair that produced no onset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedEvent {
    pub channel: String,
    pub event_time: f64,
    pub reason: SkipReason,
}
/// What happens when two onsets land on the same sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later insertion replaces the earlier one in place.
    #[default]
    LastWriteWins,
    /// The onset with the lower time is kept; ties keep the existing one.
    KeepEarliest,
    /// Every onset is kept, each tagged with its channel.
    KeepAll,
}
/// Ordered onset list plus the pairs that were skipped.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OnsetRecord {
    sample_rate_hz: f64,
    policy: CollisionPolicy,
    onsets: Vec<Onset>,
    skipped: Vec<SkippedEvent>,
}
impl OnsetRecord {
    pub fn new(sample_rate_hz: f64, policy: CollisionPolicy) -> Self {
        Self {
            sample_rate_hz,
            policy,
            onsets: Vec::new(),
            skipped: Vec::new(),
        }
    }
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }
    pub fn insert(&mut self, onset: Onset) {
        if self.policy == CollisionPolicy::KeepAll {
            self.onsets.push(onset);
            return;
        }
        let key = sample_at(onset.time, self.sample_rate_hz);
        let existing = self
            .onsets
            .iter()
            .position(|o| sample_at(o.time, self.sample_rate_hz) == key);
        match (existing, self.policy) {
            (None, _) => self.onsets.push(onset),
            (Some(idx), CollisionPolicy::LastWriteWins) => self.onsets[idx] = onset,
            (Some(idx), _) => {
                if onset.time < self.onsets[idx].time {
                    self.onsets[idx] = onset;
                }
            }
        }
    }
    pub fn skip(&mut self, channel: &str, event_time: f64, reason: SkipReason) {
        self.skipped.push(SkippedEvent {
            channel: channel.to_string(),
            event_time,
            reason,
        });
    }
    pub fn onsets(&self) -> &[Onset] {
        &self.onsets
    }
    pub fn skipped(&self) -> &[SkippedEvent] {
        &self.skipped
    }
    pub fn iter(&self) -> impl Iterator<Item = &Onset> {
        self.onsets.iter()
    }
    pub fn len(&self) -> usize {
        self.onsets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.onsets.is_empty()
    }
    /// Onset times in insertion order.
    pub fn times(&self) -> Vec<f64> {
        self.onsets.iter().map(|o| o.time).collect()
    }
    pub fn for_channel<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = &'a Onset> + 'a {
        self.onsets.iter().filter(move |o| o.channel == channel)
    }
}
/// Which channels are scanned for bursts.
#[derive(Clone)]
pub enum ChannelSelection {
    Matching(Arc<dyn Fn(&str) -> bool + Send + Sync>),
    Named(Vec<String>),
}
impl ChannelSelection {
    pub fn matching(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        ChannelSelection::Matching(Arc::new(predicate))
    }
    /// Channels whose name contains `marker`, e.g. `"EMG"`.
    pub fn containing(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self::matching(move |name| name.contains(marker.as_str()))
    }
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChannelSelection::Named(names.into_iter().map(Into::into).collect())
    }
    /// Channel indices into `recording`, in recording order for predicates and
    /// in the given order for explicit names.
    pub fn resolve(&self, recording: &Recording) -> Result<Vec<usize>, AnalysisError> {
        match self {
            ChannelSelection::Matching(predicate) => Ok(recording
                .channel_labels
                .iter()
                .enumerate()
                .filter(|(_, name)| predicate(name))
                .map(|(idx, _)| idx)
                .collect()),
            ChannelSelection::Named(names) => names
                .iter()
                .map(|name| {
                    recording
                        .channel_index(name)
                        .ok_or_else(|| AnalysisError::UnknownChannel(name.clone()))
                })
                .collect(),
        }
    }
}
impl fmt::Debug for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSelection::Matching(_) => f.write_str("ChannelSelection::Matching(..)"),
            ChannelSelection::Named(names) => f.debug_tuple("ChannelSelection::Named").field(names).finish(),
        }
    }
}
impl From<&str> for ChannelSelection {
    fn from(name: &str) -> Self {
        ChannelSelection::Named(vec![name.to_string()])
    }
}
impl From<String> for ChannelSelection {
    fn from(name: String) -> Self {
        ChannelSelection::Named(vec![name])
    }
}
impl From<Vec<String>> for ChannelSelection {
    fn from(names: Vec<String>) -> Self {
        ChannelSelection::Named(names)
    }
}
/// Detection parameters for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnsetParams {
    /// Baseline length before each event, seconds.
    pub offset: f64,
    /// Number of baseline standard deviations above the baseline mean.
    pub threshold_sd: f64,
    /// Scan length after each event, seconds.
    pub duration: f64,
    /// Moving-average length, samples.
    pub win_size: usize,
    pub edge: EdgeMode,
    pub collision: CollisionPolicy,
}
impl Default for OnsetParams {
    fn default() -> Self {
        Self {
            offset: 1.0,
            threshold_sd: 3.0,
            duration: 1.0,
            win_size: 10,
            edge: EdgeMode::default(),
            collision: CollisionPolicy::default(),
        }
    }
}
impl OnsetParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        positive("offset", self.offset)?;
        positive("threshold", self.threshold_sd)?;
        positive("duration", self.duration)?;
        if self.win_size == 0 {
            return Err(AnalysisError::invalid(
                "win_size",
                "smoothing window must span at least one sample",
            ));
        }
        Ok(())
    }
}
fn positive(name: &'static str, value: f64) -> Result<(), AnalysisError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AnalysisError::invalid(name, format!("must be positive, got {value}")));
    }
    Ok(())
}
fn onset_for_event(
    detector: &BurstDetector,
    signal: &[f64],
    sample_rate_hz: f64,
    event_time: f64,
    params: &OnsetParams,
) -> Result<BurstOutcome, AnalysisError> {
    let baseline = estimate_baseline(signal, sample_rate_hz, event_time, params.offset)?;
    let threshold = baseline.threshold(params.threshold_sd);
    detector.detect(signal, sample_rate_hz, event_time, params.duration, threshold)
}
/// Runs baseline estimation and burst detection for every selected channel
/// and every event time, merging the hits into one [`OnsetRecord`].
pub fn detect_onsets(
    recording: &Recording,
    event_times: &[f64],
    selection: &ChannelSelection,
    params: &OnsetParams,
) -> Result<OnsetRecord, AnalysisError> {
    params.validate()?;
    let detector = BurstDetector::new(params.win_size)?.with_edge_mode(params.edge);
    let channels = selection.resolve(recording)?;
    let sample_rate_hz = recording.sample_rate_hz;
    let mut record = OnsetRecord::new(sample_rate_hz, params.collision);
    for idx in &channels {
        let name = &recording.channel_labels[*idx];
        let signal = &recording.samples[*idx];
        for &event_time in event_times {
            match onset_for_event(&detector, signal, sample_rate_hz, event_time, params) {
                Ok(BurstOutcome::Found(time)) => record.insert(Onset {
                    time,
                    channel: name.clone(),
                    event_time,
                }),
                Ok(BurstOutcome::NotFound) => {
                    debug!("{name}: no burst within {}s of event at {event_time:.3}s", params.duration);
                    record.skip(name, event_time, SkipReason::NoBurst);
                }
                Err(err) if err.is_per_event() => {
                    warn!("{name}: skipping event at {event_time:.3}s: {err}");
                    record.skip(name, event_time, SkipReason::Failed(err.to_string()));
                }
                Err(err) => return Err(err),
            }
        }
    }
    info!(
        "{} onsets from {} channels x {} events ({} skipped)",
        record.len(),
        channels.len(),
        event_times.len(),
        record.skipped().len()
    );
    Ok(record)
}
