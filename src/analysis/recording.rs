use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::analysis::AnalysisError;
/// Lowest sampling rate a recording may declare and still be analysed.
pub const MIN_SAMPLE_RATE_HZ: f64 = 10.0;
/// Labeled point (or span) in a recording, e.g. a trigger marked `"x"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Seconds from the first sample.
    pub onset: f64,
    #[serde(default)]
    pub duration: f64,
    pub description: String,
}
impl Annotation {
    pub fn new(onset: f64, description: impl Into<String>) -> Self {
        Self {
            onset,
            duration: 0.0,
            description: description.into(),
        }
    }
}
/// Multichannel timeseries with its sampling rate and annotations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub sample_rate_hz: f64,
    /// Spacing of consecutive samples when the container stores it next to the
    /// nominal rate. Used to recover headers with a bogus rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_period: Option<f64>,
    pub channel_labels: Vec<String>,
    pub samples: Vec<Vec<f64>>, // channels x samples
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}
impl Recording {
    pub fn new(
        sample_rate_hz: f64,
        channel_labels: Vec<String>,
        samples: Vec<Vec<f64>>,
    ) -> Result<Self, AnalysisError> {
        let recording = Self {
            sample_rate_hz,
            sample_period: None,
            channel_labels,
            samples,
            annotations: Vec::new(),
        };
        recording.validate()?;
        Ok(recording)
    }
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz < MIN_SAMPLE_RATE_HZ {
            return Err(AnalysisError::InvalidSampleRate(self.sample_rate_hz));
        }
        if self.samples.len() != self.channel_labels.len() {
            return Err(AnalysisError::ChannelMismatch {
                expected: self.channel_labels.len(),
                actual: self.samples.len(),
            });
        }
        let expected = self.n_samples();
        for (label, channel) in self.channel_labels.iter().zip(&self.samples) {
            if channel.len() != expected {
                return Err(AnalysisError::RaggedChannels {
                    channel: label.clone(),
                    expected,
                    actual: channel.len(),
                });
            }
        }
        Ok(())
    }
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }
    pub fn n_samples(&self) -> usize {
        self.samples.first().map(|c| c.len()).unwrap_or(0)
    }
    pub fn duration_seconds(&self) -> f64 {
        self.n_samples() as f64 / self.sample_rate_hz.max(1.0)
    }
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channel_labels.iter().position(|label| label == name)
    }
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.channel_index(name).map(|idx| self.samples[idx].as_slice())
    }
    /// Renames every channel present in `mapping`; names absent from it stay.
    pub fn rename_channels(&mut self, mapping: &HashMap<String, String>) {
        for label in &mut self.channel_labels {
            if let Some(renamed) = mapping.get(label) {
                *label = renamed.clone();
            }
        }
    }
    /// Copy of the recording restricted to channels accepted by `keep`.
    pub fn pick_channels(&self, keep: impl Fn(&str) -> bool) -> Recording {
        let (channel_labels, samples) = self
            .channel_labels
            .iter()
            .zip(&self.samples)
            .filter(|(label, _)| keep(label))
            .map(|(label, channel)| (label.clone(), channel.clone()))
            .unzip();
        Recording {
            sample_rate_hz: self.sample_rate_hz,
            sample_period: self.sample_period,
            channel_labels,
            samples,
            annotations: self.annotations.clone(),
        }
    }
    /// Onset times of annotations whose description equals `label` exactly.
    pub fn annotation_times(&self, label: &str) -> Vec<f64> {
        self.annotations
            .iter()
            .filter(|a| a.description == label)
            .map(|a| a.onset)
            .collect()
    }
}
/// Header-level summary, checked before any samples are analysed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordingInfo {
    pub name: String,
    pub sample_rate_hz: f64,
    pub n_samples: usize,
    pub n_signals: usize,
    pub signal_names: Vec<String>,
    pub duration_seconds: f64,
}
impl RecordingInfo {
    /// Some headers carry a nonsensical nominal rate. The rate is checked
    /// twice: first as declared (truncated to whole Hz), then recomputed from
    /// the sample period when one is present.
    pub fn inspect(name: impl Into<String>, recording: &Recording) -> Result<Self, AnalysisError> {
        let mut sample_rate_hz = recording.sample_rate_hz;
        if !sample_rate_hz.is_finite() || sample_rate_hz.trunc() < MIN_SAMPLE_RATE_HZ {
            sample_rate_hz = match recording.sample_period {
                Some(period) if period > 0.0 => 1.0 / period,
                _ => return Err(AnalysisError::InvalidSampleRate(recording.sample_rate_hz)),
            };
            if !sample_rate_hz.is_finite() || sample_rate_hz < MIN_SAMPLE_RATE_HZ {
                return Err(AnalysisError::InvalidSampleRate(sample_rate_hz));
            }
        }
        let n_samples = recording.n_samples();
        Ok(Self {
            name: name.into(),
            sample_rate_hz,
            n_samples,
            n_signals: recording.channel_labels.len(),
            signal_names: recording.channel_labels.clone(),
            duration_seconds: n_samples as f64 / sample_rate_hz.max(1.0),
        })
    }
}
/// Reads and writes recordings in some container format.
pub trait RecordingStore {
    fn read(&self, path: &Path) -> Result<Recording, AnalysisError>;
    fn write(&mut self, path: &Path, recording: &Recording) -> Result<(), AnalysisError>;
}
/// Reads a recording and validates its header, repairing the sampling rate
/// from the sample period when needed.
pub fn load_checked<S: RecordingStore + ?Sized>(
    store: &S,
    path: &Path,
) -> Result<(Recording, RecordingInfo), AnalysisError> {
    let mut recording = store.read(path)?;
    let info = RecordingInfo::inspect(path.display().to_string(), &recording)?;
    recording.sample_rate_hz = info.sample_rate_hz;
    recording.validate()?;
    Ok((recording, info))
}
/// Serde JSON container, one recording per file.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRecordingStore;
impl RecordingStore for JsonRecordingStore {
    fn read(&self, path: &Path) -> Result<Recording, AnalysisError> {
        let file = File::open(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| AnalysisError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
    fn write(&mut self, path: &Path, recording: &Recording) -> Result<(), AnalysisError> {
        let io_err = |source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, recording).map_err(|source| AnalysisError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)
    }
}
/// In-memory store useful for tests and deterministic playback.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    recordings: HashMap<PathBuf, Recording>,
}
impl MemoryStore {
    pub fn new(recordings: impl IntoIterator<Item = (PathBuf, Recording)>) -> Self {
        Self {
            recordings: recordings.into_iter().collect(),
        }
    }
    pub fn get(&self, path: &Path) -> Option<&Recording> {
        self.recordings.get(path)
    }
    pub fn len(&self) -> usize {
        self.recordings.len()
    }
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}
impl RecordingStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Recording, AnalysisError> {
        self.recordings
            .get(path)
            .cloned()
            .ok_or_else(|| AnalysisError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such recording"),
            })
    }
    fn write(&mut self, path: &Path, recording: &Recording) -> Result<(), AnalysisError> {
        self.recordings.insert(path.to_path_buf(), recording.clone());
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn two_channels() -> Recording {
        Recording::new(
            100.0,
            vec!["EMG1".into(), "Cz".into()],
            vec![vec![0.0; 200], vec![1.0; 200]],
        )
        .unwrap()
    }
    #[test]
    fn rejects_low_rate_and_ragged_channels() {
        let low = Recording::new(5.0, vec!["A".into()], vec![vec![0.0; 4]]);
        assert!(matches!(low, Err(AnalysisError::InvalidSampleRate(_))));
        let ragged = Recording::new(
            100.0,
            vec!["A".into(), "B".into()],
            vec![vec![0.0; 4], vec![0.0; 3]],
        );
        assert!(matches!(ragged, Err(AnalysisError::RaggedChannels { .. })));
        let mismatch = Recording::new(100.0, vec!["A".into()], vec![]);
        assert!(matches!(mismatch, Err(AnalysisError::ChannelMismatch { .. })));
    }
    #[test]
    fn inspect_recovers_rate_from_sample_period() {
        let mut recording = two_channels();
        recording.sample_rate_hz = 1.0;
        recording.sample_period = Some(0.004);
        let info = RecordingInfo::inspect("r", &recording).unwrap();
        assert!((info.sample_rate_hz - 250.0).abs() < 1e-9);
        assert_eq!(info.n_signals, 2);
        recording.sample_period = Some(0.5);
        assert!(matches!(
            RecordingInfo::inspect("r", &recording),
            Err(AnalysisError::InvalidSampleRate(_))
        ));
        recording.sample_period = None;
        assert!(RecordingInfo::inspect("r", &recording).is_err());
    }
    #[test]
    fn rename_and_pick_channels() {
        let mut recording = two_channels();
        let mapping = HashMap::from([("Cz".to_string(), "C3".to_string())]);
        recording.rename_channels(&mapping);
        assert_eq!(recording.channel_labels, vec!["EMG1", "C3"]);
        let emg = recording.pick_channels(|name| name.starts_with("EMG"));
        assert_eq!(emg.channel_labels, vec!["EMG1"]);
        assert_eq!(emg.n_samples(), 200);
        assert_eq!(recording.channel("C3").unwrap()[0], 1.0);
    }
    #[test]
    fn annotation_times_match_exact_label() {
        let recording = two_channels().with_annotations(vec![
            Annotation::new(0.5, "x"),
            Annotation::new(0.7, "xx"),
            Annotation::new(1.2, "x"),
        ]);
        assert_eq!(recording.annotation_times("x"), vec![0.5, 1.2]);
    }
    #[test]
    fn json_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.json");
        let recording = two_channels().with_annotations(vec![Annotation::new(1.0, "x")]);
        let mut store = JsonRecordingStore;
        store.write(&path, &recording).unwrap();
        let (loaded, info) = load_checked(&store, &path).unwrap();
        assert_eq!(loaded, recording);
        assert_eq!(info.n_samples, 200);
        assert!((info.duration_seconds - 2.0).abs() < 1e-9);
    }
    #[test]
    fn missing_file_is_an_io_error() {
        let store = MemoryStore::default();
        let err = store.read(Path::new("nope.json")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
