use crate::analysis::AnalysisError;
/// Mean and spread of |x| over one baseline window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub mean: f64,
    pub std_dev: f64,
    pub n_samples: usize,
}
impl Baseline {
    /// Adaptive amplitude threshold for a multiplier of `threshold_sd`
    /// standard deviations. A flat baseline yields exactly `mean`.
    pub fn threshold(&self, threshold_sd: f64) -> f64 {
        self.mean + threshold_sd * self.std_dev
    }
}
pub(crate) fn check_sample_rate(sample_rate_hz: f64) -> Result<(), AnalysisError> {
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(AnalysisError::InvalidSampleRate(sample_rate_hz));
    }
    Ok(())
}
/// Nearest sample index for a time in seconds (may be negative).
pub(crate) fn sample_at(time: f64, sample_rate_hz: f64) -> f64 {
    (time * sample_rate_hz).round()
}
/// Baseline statistics of `signal` over `[event_time - offset, event_time)`.
///
/// Windows that start before the first sample or end after the last one are
/// rejected with [`AnalysisError::InsufficientData`] rather than truncated.
pub fn estimate_baseline(
    signal: &[f64],
    sample_rate_hz: f64,
    event_time: f64,
    offset: f64,
) -> Result<Baseline, AnalysisError> {
    check_sample_rate(sample_rate_hz)?;
    if !offset.is_finite() || offset <= 0.0 {
        return Err(AnalysisError::invalid(
            "offset",
            format!("must be a positive number of seconds, got {offset}"),
        ));
    }
    let start_time = event_time - offset;
    let start = sample_at(start_time, sample_rate_hz);
    let end = sample_at(event_time, sample_rate_hz);
    if !start.is_finite() || start < 0.0 || end > signal.len() as f64 || end <= start {
        return Err(AnalysisError::InsufficientData {
            start: start_time,
            end: event_time,
            available: signal.len() as f64 / sample_rate_hz,
        });
    }
    let window = &signal[start as usize..end as usize];
    let n = window.len() as f64;
    let mean = window.iter().map(|v| v.abs()).sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|v| {
            let delta = v.abs() - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;
    Ok(Baseline {
        mean,
        std_dev: variance.sqrt(),
        n_samples: window.len(),
    })
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn statistics_use_rectified_window_only() {
        // 10 Hz: window [0.5, 1.0) covers samples 5..10.
        let mut signal = vec![100.0; 20];
        for (i, v) in [-1.0, 1.0, -3.0, 3.0, 2.0].iter().enumerate() {
            signal[5 + i] = *v;
        }
        let baseline = estimate_baseline(&signal, 10.0, 1.0, 0.5).unwrap();
        assert_eq!(baseline.n_samples, 5);
        assert!((baseline.mean - 2.0).abs() < 1e-12);
        // |x| = 1,1,3,3,2 -> deviations -1,-1,1,1,0 -> variance 0.8
        assert!((baseline.std_dev - 0.8f64.sqrt()).abs() < 1e-12);
        assert!((baseline.threshold(2.0) - (2.0 + 2.0 * 0.8f64.sqrt())).abs() < 1e-12);
    }
    #[test]
    fn flat_baseline_threshold_equals_mean() {
        let signal = vec![-4.0; 300];
        let baseline = estimate_baseline(&signal, 100.0, 2.0, 1.0).unwrap();
        assert_eq!(baseline.std_dev, 0.0);
        assert_eq!(baseline.threshold(3.0), baseline.mean);
        assert_eq!(baseline.mean, 4.0);
    }
    #[test]
    fn window_before_first_sample_is_insufficient() {
        let signal = vec![0.0; 1000];
        let err = estimate_baseline(&signal, 100.0, 0.3, 0.5).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
        let err = estimate_baseline(&signal, 100.0, 12.0, 0.5).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }
    #[test]
    fn sub_sample_offset_is_insufficient() {
        // 0.001 s at 100 Hz rounds to an empty range.
        let signal = vec![0.0; 1000];
        let err = estimate_baseline(&signal, 100.0, 5.0, 0.001).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }
    #[test]
    fn non_positive_offset_is_rejected() {
        let signal = vec![0.0; 100];
        for offset in [0.0, -0.5, f64::NAN] {
            let err = estimate_baseline(&signal, 100.0, 0.5, offset).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidParameter { name: "offset", .. }));
        }
    }
}
