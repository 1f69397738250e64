use rustfft::{num_complex::Complex64, FftPlanner};
use crate::analysis::recording::Recording;
use crate::analysis::AnalysisError;
/// Zero-phase FFT band-pass: bins outside `[low_hz, high_hz]` are zeroed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandPass {
    low_hz: f64,
    high_hz: f64,
}
impl BandPass {
    pub fn new(low_hz: f64, high_hz: f64) -> Result<Self, AnalysisError> {
        if !low_hz.is_finite() || low_hz < 0.0 {
            return Err(AnalysisError::invalid("l_freq", format!("must be non-negative, got {low_hz}")));
        }
        if !high_hz.is_finite() || high_hz <= low_hz {
            return Err(AnalysisError::invalid(
                "h_freq",
                format!("must exceed l_freq ({low_hz}), got {high_hz}"),
            ));
        }
        Ok(Self { low_hz, high_hz })
    }
    pub fn low_hz(&self) -> f64 {
        self.low_hz
    }
    pub fn high_hz(&self) -> f64 {
        self.high_hz
    }
    pub fn apply_channel(&self, channel: &[f64], sample_rate_hz: f64) -> Vec<f64> {
        let n = channel.len();
        if n == 0 {
            return Vec::new();
        }
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        let mut buffer: Vec<Complex64> = channel.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        forward.process(&mut buffer);
        for (k, bin) in buffer.iter_mut().enumerate() {
            let freq = k.min(n - k) as f64 * sample_rate_hz / n as f64;
            if freq < self.low_hz || freq > self.high_hz {
                *bin = Complex64::new(0.0, 0.0);
            }
        }
        inverse.process(&mut buffer);
        buffer.iter().map(|c| c.re / n as f64).collect()
    }
    /// Filtered copy of every channel; annotations are kept.
    pub fn apply(&self, recording: &Recording) -> Recording {
        let samples = recording
            .samples
            .iter()
            .map(|channel| self.apply_channel(channel, recording.sample_rate_hz))
            .collect();
        Recording {
            samples,
            ..recording.clone()
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    fn tone(freq: f64, sfreq: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / sfreq).sin()).collect()
    }
    #[test]
    fn keeps_passband_and_removes_stopband() {
        let sfreq = 256.0;
        let slow = tone(5.0, sfreq, 256);
        let fast = tone(60.0, sfreq, 256);
        let mixed: Vec<f64> = slow.iter().zip(&fast).map(|(a, b)| a + b + 3.0).collect();
        let filtered = BandPass::new(1.0, 20.0).unwrap().apply_channel(&mixed, sfreq);
        for (got, want) in filtered.iter().zip(&slow) {
            assert!((got - want).abs() < 1e-9);
        }
    }
    #[test]
    fn filters_every_channel() {
        let recording = Recording::new(
            128.0,
            vec!["Cz".into(), "Pz".into()],
            vec![vec![1.0; 128], tone(4.0, 128.0, 128)],
        )
        .unwrap();
        let filtered = BandPass::new(0.5, 50.0).unwrap().apply(&recording);
        assert!(filtered.samples[0].iter().all(|v| v.abs() < 1e-9));
        assert_eq!(filtered.channel_labels, recording.channel_labels);
    }
    #[test]
    fn rejects_inverted_band() {
        assert!(BandPass::new(50.0, 10.0).is_err());
        assert!(BandPass::new(-1.0, 10.0).is_err());
    }
}
