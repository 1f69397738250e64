use crate::analysis::baseline::{check_sample_rate, sample_at};
use crate::analysis::AnalysisError;
use serde::{Deserialize, Serialize};
/// Result of scanning one window: either the onset time in seconds or an
/// explicit miss. A miss is an expected outcome, not an error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BurstOutcome {
    Found(f64),
    NotFound,
}
impl BurstOutcome {
    pub fn time(self) -> Option<f64> {
        match self {
            BurstOutcome::Found(t) => Some(t),
            BurstOutcome::NotFound => None,
        }
    }
}
/// How the moving average treats windows that hang over the scan edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Samples outside the scan window count as zero and every window is
    /// divided by its full length, like a "same"-mode convolution.
    #[default]
    ZeroPad,
    /// Boundary windows average only the samples they actually cover.
    Shrink,
}
/// Centered moving average with a same-length output.
///
/// Output `i` covers input `[i - win/2, i + (win-1)/2]`, which matches the
/// alignment of a "same" convolution for both odd and even window lengths.
pub fn moving_average(signal: &[f64], win_size: usize, edge: EdgeMode) -> Vec<f64> {
    if win_size == 0 || signal.is_empty() {
        return signal.to_vec();
    }
    let before = win_size / 2;
    let after = (win_size - 1) / 2;
    let mut prefix = Vec::with_capacity(signal.len() + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &v in signal {
        acc += v;
        prefix.push(acc);
    }
    (0..signal.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after + 1).min(signal.len());
            let sum = prefix[hi] - prefix[lo];
            match edge {
                EdgeMode::ZeroPad => sum / win_size as f64,
                EdgeMode::Shrink => sum / (hi - lo) as f64,
            }
        })
        .collect()
}
/// Smoothing settings shared by every scan of an analysis run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstDetector {
    win_size: usize,
    edge: EdgeMode,
}
impl BurstDetector {
    pub fn new(win_size: usize) -> Result<Self, AnalysisError> {
        if win_size == 0 {
            return Err(AnalysisError::invalid(
                "win_size",
                "smoothing window must span at least one sample",
            ));
        }
        Ok(Self {
            win_size,
            edge: EdgeMode::default(),
        })
    }
    pub fn with_edge_mode(mut self, edge: EdgeMode) -> Self {
        self.edge = edge;
        self
    }
    pub fn win_size(&self) -> usize {
        self.win_size
    }
    pub fn edge_mode(&self) -> EdgeMode {
        self.edge
    }
    /// Scans `[scan_start, scan_start + duration)` for the first smoothed
    /// sample strictly above `threshold`.
    ///
    /// The window is truncated at the end of the signal; a window that starts
    /// outside the signal is [`AnalysisError::InsufficientData`].
    pub fn detect(
        &self,
        signal: &[f64],
        sample_rate_hz: f64,
        scan_start: f64,
        duration: f64,
        threshold: f64,
    ) -> Result<BurstOutcome, AnalysisError> {
        check_sample_rate(sample_rate_hz)?;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AnalysisError::InvalidThreshold(threshold));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(AnalysisError::invalid(
                "duration",
                format!("scan duration must be positive, got {duration}"),
            ));
        }
        let span = sample_at(duration, sample_rate_hz);
        if span < 1.0 {
            return Err(AnalysisError::invalid(
                "duration",
                format!("scan duration {duration}s is shorter than one sample"),
            ));
        }
        let start = sample_at(scan_start, sample_rate_hz);
        if !start.is_finite() || start < 0.0 || start >= signal.len() as f64 {
            return Err(AnalysisError::InsufficientData {
                start: scan_start,
                end: scan_start + duration,
                available: signal.len() as f64 / sample_rate_hz,
            });
        }
        let end = (start + span).min(signal.len() as f64) as usize;
        let start = start as usize;
        let rectified: Vec<f64> = signal[start..end].iter().map(|v| v.abs()).collect();
        let smoothed = moving_average(&rectified, self.win_size, self.edge);
        Ok(match smoothed.iter().position(|&power| power > threshold) {
            Some(index) => BurstOutcome::Found(scan_start + index as f64 / sample_rate_hz),
            None => BurstOutcome::NotFound,
        })
    }
}
/// One-shot detection with the default [`EdgeMode::ZeroPad`] policy.
pub fn detect_burst(
    signal: &[f64],
    sample_rate_hz: f64,
    scan_start: f64,
    duration: f64,
    threshold: f64,
    win_size: usize,
) -> Result<BurstOutcome, AnalysisError> {
    BurstDetector::new(win_size)?.detect(signal, sample_rate_hz, scan_start, duration, threshold)
}
