use log::{debug, warn};
use ndarray::{s, Array2, Array3, ArrayView1, Axis};
use crate::analysis::baseline::sample_at;
use crate::analysis::events::{events_from_onsets, Event};
use crate::analysis::onset::OnsetRecord;
use crate::analysis::recording::Recording;
use crate::analysis::AnalysisError;
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpochOptions {
    pub pre_time: f64,
    pub post_time: f64,
    /// Baseline interval relative to the anchor, seconds.
    pub baseline: Option<(f64, f64)>,
    /// Take |x| after baseline correction (EMG envelopes).
    pub rectify: bool,
}
impl EpochOptions {
    /// Window `[-pre_time, post_time]` with baseline `[-pre_time, 0]`.
    pub fn new(pre_time: f64, post_time: f64) -> Self {
        Self {
            pre_time,
            post_time,
            baseline: Some((-pre_time, 0.0)),
            rectify: false,
        }
    }
    pub fn rectified(mut self, rectify: bool) -> Self {
        self.rectify = rectify;
        self
    }
    pub fn without_baseline(mut self) -> Self {
        self.baseline = None;
        self
    }
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (name, value) in [("pre_time", self.pre_time), ("post_time", self.post_time)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::invalid(name, format!("must be non-negative, got {value}")));
            }
        }
        if self.pre_time + self.post_time <= 0.0 {
            return Err(AnalysisError::invalid("post_time", "epoch window is empty"));
        }
        if let Some((start, end)) = self.baseline {
            if start > end || start < -self.pre_time || end > self.post_time {
                return Err(AnalysisError::invalid(
                    "baseline",
                    format!(
                        "({start}, {end}) must be ordered and inside [{}, {}]",
                        -self.pre_time, self.post_time
                    ),
                ));
            }
        }
        Ok(())
    }
}
impl Default for EpochOptions {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}
/// Epochs x channels x times, plus the events that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct Epochs {
    pub data: Array3<f64>,
    pub channel_labels: Vec<String>,
    pub sample_rate_hz: f64,
    pub tmin: f64,
    pub tmax: f64,
    pub events: Vec<Event>,
    /// Events whose window did not fit in the recording.
    pub dropped: usize,
}
impl Epochs {
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn average(&self) -> Result<Evoked, AnalysisError> {
        if self.is_empty() {
            return Err(AnalysisError::EmptyEventSet);
        }
        let data = self
            .data
            .mean_axis(Axis(0))
            .ok_or(AnalysisError::EmptyEventSet)?;
        Ok(Evoked {
            data,
            channel_labels: self.channel_labels.clone(),
            sample_rate_hz: self.sample_rate_hz,
            tmin: self.tmin,
            tmax: self.tmax,
            nave: self.len(),
        })
    }
}
/// Channels x times mean across epochs.
#[derive(Clone, Debug, PartialEq)]
pub struct Evoked {
    pub data: Array2<f64>,
    pub channel_labels: Vec<String>,
    pub sample_rate_hz: f64,
    pub tmin: f64,
    pub tmax: f64,
    /// Number of averaged epochs.
    pub nave: usize,
}
impl Evoked {
    pub fn n_times(&self) -> usize {
        self.data.ncols()
    }
    pub fn times(&self) -> Vec<f64> {
        (0..self.n_times())
            .map(|i| self.tmin + i as f64 / self.sample_rate_hz)
            .collect()
    }
    pub fn channel(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.channel_labels
            .iter()
            .position(|label| label == name)
            .map(|idx| self.data.row(idx))
    }
}
/// Cuts one epoch per event. Events whose window leaves the recording are
/// dropped; an empty result is [`AnalysisError::EmptyEventSet`].
pub fn build_epochs(
    recording: &Recording,
    events: &[Event],
    options: &EpochOptions,
) -> Result<Epochs, AnalysisError> {
    options.validate()?;
    if events.is_empty() {
        return Err(AnalysisError::EmptyEventSet);
    }
    let sfreq = recording.sample_rate_hz;
    let n_samples = recording.n_samples();
    let pre = sample_at(options.pre_time, sfreq);
    let post = sample_at(options.post_time, sfreq);
    if pre + post >= n_samples as f64 {
        warn!(
            "dropping all {} epochs: window of {} samples exceeds the recording ({n_samples})",
            events.len(),
            pre + post + 1.0
        );
        return Err(AnalysisError::EmptyEventSet);
    }
    let (pre, post) = (pre as usize, post as usize);
    let n_times = pre + post + 1;
    let kept: Vec<Event> = events
        .iter()
        .copied()
        .filter(|event| {
            let fits = event.sample >= pre && event.sample + post < n_samples;
            if !fits {
                warn!(
                    "dropping epoch at sample {}: window leaves the recording",
                    event.sample
                );
            }
            fits
        })
        .collect();
    if kept.is_empty() {
        return Err(AnalysisError::EmptyEventSet);
    }
    let n_channels = recording.num_channels();
    let mut data = Array3::<f64>::zeros((kept.len(), n_channels, n_times));
    for (e, event) in kept.iter().enumerate() {
        let start = event.sample - pre;
        for (c, channel) in recording.samples.iter().enumerate() {
            data.slice_mut(s![e, c, ..])
                .assign(&ArrayView1::from(&channel[start..start + n_times]));
        }
    }
    let tmin = -(pre as f64) / sfreq;
    if let Some((b_start, b_end)) = options.baseline {
        let first = (sample_at(b_start - tmin, sfreq).max(0.0) as usize).min(n_times - 1);
        let last = (sample_at(b_end - tmin, sfreq).max(0.0) as usize).min(n_times - 1);
        for mut lane in data.lanes_mut(Axis(2)) {
            let mean = lane.slice(s![first..=last]).mean().unwrap_or(0.0);
            lane.mapv_inplace(|v| v - mean);
        }
    }
    if options.rectify {
        data.mapv_inplace(f64::abs);
    }
    debug!("built {} epochs of {} samples", kept.len(), n_times);
    Ok(Epochs {
        data,
        channel_labels: recording.channel_labels.clone(),
        sample_rate_hz: sfreq,
        tmin,
        tmax: post as f64 / sfreq,
        dropped: events.len() - kept.len(),
        events: kept,
    })
}
/// One epoch per detected onset, averaged.
pub fn evoked_from_onsets(
    recording: &Recording,
    record: &OnsetRecord,
    options: &EpochOptions,
) -> Result<Evoked, AnalysisError> {
    if record.is_empty() {
        return Err(AnalysisError::EmptyEventSet);
    }
    let events = events_from_onsets(record, recording);
    build_epochs(recording, &events, options)?.average()
}
