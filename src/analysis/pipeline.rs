use std::path::{Path, PathBuf};
use log::{error, info};
use crate::analysis::artifacts::{remove_artifacts, ArtifactConfig, CleanedRecording, ComponentDecomposer};
use crate::analysis::epochs::{build_epochs, evoked_from_onsets, EpochOptions, Epochs, Evoked};
use crate::analysis::error::AnalysisError;
use crate::analysis::events::events_from_annotations;
use crate::analysis::onset::{detect_onsets, OnsetRecord};
use crate::analysis::plot::{render_evoked_png, PlotStyle};
use crate::analysis::recording::{load_checked, Recording, RecordingInfo, RecordingStore};
use crate::channels::{channel_mapping, split_channels};
use crate::config::AnalysisConfig;
/// Outcome of one recording: onsets, their average and an optional plot.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    pub info: RecordingInfo,
    pub onsets: OnsetRecord,
    pub evoked: Evoked,
    pub plot_png: Option<Vec<u8>>,
}
/// Per-file results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<(PathBuf, Result<AnalysisReport, AnalysisError>)>,
}
impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&PathBuf, &AnalysisReport)> {
        self.results
            .iter()
            .filter_map(|(path, result)| result.as_ref().ok().map(|report| (path, report)))
    }
    pub fn failed(&self) -> impl Iterator<Item = (&PathBuf, &AnalysisError)> {
        self.results
            .iter()
            .filter_map(|(path, result)| result.as_ref().err().map(|err| (path, err)))
    }
}
/// Onset detection followed by onset-locked averaging, one recording at a time.
pub struct OnsetPipeline<S: RecordingStore> {
    store: S,
    config: AnalysisConfig,
    plot_style: PlotStyle,
}
impl<S: RecordingStore> OnsetPipeline<S> {
    pub fn new(store: S, config: AnalysisConfig) -> Self {
        Self {
            store,
            config,
            plot_style: PlotStyle::default(),
        }
    }
    pub fn with_plot_style(mut self, style: PlotStyle) -> Self {
        self.plot_style = style;
        self
    }
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
    pub fn store(&self) -> &S {
        &self.store
    }
    /// Detects onsets after every labeled trigger and averages epochs
    /// anchored at them.
    pub fn analyse(&self, recording: &Recording) -> Result<(OnsetRecord, Evoked), AnalysisError> {
        self.config.validate()?;
        let event_times = recording.annotation_times(&self.config.event_label);
        info!(
            "{} '{}' triggers across {} channels",
            event_times.len(),
            self.config.event_label,
            recording.num_channels()
        );
        let onsets = detect_onsets(
            recording,
            &event_times,
            &self.config.channel_selection(),
            &self.config.onset_params(),
        )?;
        let evoked = evoked_from_onsets(recording, &onsets, &self.config.epoch_options())?;
        Ok((onsets, evoked))
    }
    pub fn run(&self, path: &Path) -> Result<AnalysisReport, AnalysisError> {
        let (recording, info) = load_checked(&self.store, path)?;
        let (onsets, evoked) = self.analyse(&recording)?;
        let plot_png = match self.config.plot {
            Some(_) => Some(render_evoked_png(&evoked, self.plot_style.clone())?),
            None => None,
        };
        Ok(AnalysisReport {
            info,
            onsets,
            evoked,
            plot_png,
        })
    }
    /// Runs every path in order. A failing file is logged and recorded; the
    /// batch moves on to the next one.
    pub fn run_batch(&self, paths: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            let result = self.run(path);
            match &result {
                Ok(r) => info!(
                    "{}: {} onsets, {} epochs averaged",
                    path.display(),
                    r.onsets.len(),
                    r.evoked.nave
                ),
                Err(err) => error!("{}: {err}", path.display()),
            }
            report.results.push((path.clone(), result));
        }
        report
    }
}
/// Epochs anchored directly at annotations labeled `label`, and their average.
pub fn annotation_evoked(
    recording: &Recording,
    label: &str,
    options: &EpochOptions,
) -> Result<(Epochs, Evoked), AnalysisError> {
    let events = events_from_annotations(recording, label);
    let epochs = build_epochs(recording, &events, options)?;
    let evoked = epochs.average()?;
    Ok((epochs, evoked))
}
/// `<dir>/<stem><suffix>.<ext>` next to `path`.
pub fn derived_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}{suffix}");
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}
#[derive(Clone, Debug)]
pub struct PreprocessOutputs {
    pub emg: Recording,
    pub eeg: Recording,
    pub cleaned: Option<CleanedRecording>,
}
/// Renames channels, stores the EMG leads and the montage EEG separately,
/// then stores an artifact-cleaned EEG when a decomposer is given.
pub fn preprocess_recording<S: RecordingStore + ?Sized>(
    store: &mut S,
    path: &Path,
    decomposer: Option<&mut dyn ComponentDecomposer>,
    config: &ArtifactConfig,
) -> Result<PreprocessOutputs, AnalysisError> {
    let (mut recording, info) = load_checked(store, path)?;
    info!(
        "{}: {} signals at {} Hz, {:.1}s",
        info.name, info.n_signals, info.sample_rate_hz, info.duration_seconds
    );
    let mapping = channel_mapping(&recording.channel_labels);
    recording.rename_channels(&mapping);
    let split = split_channels(&recording);
    store.write(&derived_path(path, "emgraw"), &split.emg)?;
    store.write(&derived_path(path, "eegraw"), &split.eeg)?;
    let cleaned = match decomposer {
        Some(decomposer) if config.enabled => {
            let cleaned = remove_artifacts(decomposer, &split.eeg, config)?;
            store.write(&derived_path(path, "eegica"), &cleaned.recording)?;
            Some(cleaned)
        }
        _ => None,
    };
    Ok(PreprocessOutputs {
        emg: split.emg,
        eeg: split.eeg,
        cleaned,
    })
}
/// True for files written by [`preprocess_recording`].
pub fn is_preprocess_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| PREPROCESS_SUFFIXES.iter().any(|suffix| stem.ends_with(suffix)))
        .unwrap_or(false)
}
const PREPROCESS_SUFFIXES: [&str; 3] = ["emgraw", "eegraw", "eegica"];
/// Preprocesses every path in order. A failing file is logged and recorded;
/// the rest still run.
pub fn preprocess_batch<S: RecordingStore + ?Sized>(
    store: &mut S,
    paths: &[PathBuf],
    mut decomposer: Option<&mut dyn ComponentDecomposer>,
    config: &ArtifactConfig,
) -> Vec<(PathBuf, Result<PreprocessOutputs, AnalysisError>)> {
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        let result = match decomposer {
            Some(ref mut d) => preprocess_recording(store, path, Some(&mut **d), config),
            None => preprocess_recording(store, path, None, config),
        };
        match &result {
            Ok(out) => info!(
                "{}: {} EMG and {} EEG channels written",
                path.display(),
                out.emg.num_channels(),
                out.eeg.num_channels()
            ),
            Err(err) => error!("{}: {err}", path.display()),
        }
        results.push((path.clone(), result));
    }
    results
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::artifacts::tests::ChannelDecomposer;
    use crate::analysis::artifacts::ComponentLabel;
    use crate::analysis::recording::MemoryStore;
    use crate::analysis::synthetic::{Burst, SyntheticBuilder};
    fn burst(start: f64) -> Burst {
        Burst {
            start,
            end: start + 0.3,
            amplitude: 6.0,
        }
    }
    fn emg_recording() -> Recording {
        SyntheticBuilder::new(250.0, 12.0)
            .seed(21)
            .channel("EMG L", 0.1, vec![burst(2.2), burst(6.25), burst(10.3)])
            .channel("Cz", 0.1, vec![])
            .annotate(2.0, "x")
            .annotate(6.0, "x")
            .annotate(10.0, "x")
            .annotate(4.0, "y")
            .build()
            .unwrap()
    }
    fn store_with(recordings: Vec<(&str, Recording)>) -> MemoryStore {
        MemoryStore::new(recordings.into_iter().map(|(p, r)| (PathBuf::from(p), r)))
    }
    #[test]
    fn pipeline_detects_onsets_and_averages() {
        let store = store_with(vec![("a.json", emg_recording())]);
        let config = AnalysisConfig {
            plot: Some(PathBuf::from("plots")),
            ..AnalysisConfig::default()
        };
        let pipeline = OnsetPipeline::new(store, config);
        let report = pipeline.run(Path::new("a.json")).unwrap();
        assert_eq!(report.onsets.len(), 3);
        let expected = [2.2, 6.25, 10.3];
        for (onset, want) in report.onsets.iter().zip(expected) {
            assert!((onset.time - want).abs() <= 0.03, "{} vs {want}", onset.time);
        }
        assert_eq!(report.evoked.nave, 3);
        assert_eq!(report.evoked.channel_labels, vec!["EMG L", "Cz"]);
        assert_eq!(report.evoked.n_times(), 251);
        // Rectified envelope rises after the onset.
        let envelope = report.evoked.channel("EMG L").unwrap();
        assert!(envelope[150] > envelope[50]);
        assert!(report.plot_png.is_some());
    }
    #[test]
    fn pipeline_is_repeatable() {
        let pipeline = OnsetPipeline::new(store_with(vec![("a.json", emg_recording())]), AnalysisConfig::default());
        let first = pipeline.run(Path::new("a.json")).unwrap();
        let second = pipeline.run(Path::new("a.json")).unwrap();
        assert_eq!(first.onsets, second.onsets);
        assert_eq!(first.evoked, second.evoked);
    }
    #[test]
    fn batch_isolates_failing_files() {
        let mut silent = emg_recording();
        silent.samples[0].iter_mut().for_each(|v| *v *= 0.0);
        let mut low_rate = emg_recording();
        low_rate.sample_rate_hz = 2.0;
        let store = store_with(vec![("ok.json", emg_recording()), ("silent.json", silent), ("low.json", low_rate)]);
        let pipeline = OnsetPipeline::new(store, AnalysisConfig::default());
        let paths: Vec<PathBuf> = ["low.json", "missing.json", "silent.json", "ok.json"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let batch = pipeline.run_batch(&paths);
        assert_eq!(batch.results.len(), 4);
        assert_eq!(batch.succeeded().count(), 1);
        let failures: Vec<&AnalysisError> = batch.failed().map(|(_, err)| err).collect();
        assert!(matches!(failures[0], AnalysisError::InvalidSampleRate(_)));
        assert!(matches!(failures[1], AnalysisError::Io { .. }));
        assert!(matches!(failures[2], AnalysisError::EmptyEventSet));
    }
    #[test]
    fn no_matching_channels_is_empty_event_set() {
        let config = AnalysisConfig {
            channel_marker: "ECG".into(),
            ..AnalysisConfig::default()
        };
        let pipeline = OnsetPipeline::new(store_with(vec![("a.json", emg_recording())]), config);
        assert!(matches!(
            pipeline.run(Path::new("a.json")),
            Err(AnalysisError::EmptyEventSet)
        ));
    }
    #[test]
    fn annotation_locked_average() {
        let recording = emg_recording();
        let (epochs, evoked) = annotation_evoked(&recording, "x", &EpochOptions::new(0.5, 0.5)).unwrap();
        assert_eq!(epochs.len(), 3);
        assert_eq!(evoked.nave, 3);
        assert!(matches!(
            annotation_evoked(&recording, "z", &EpochOptions::default()),
            Err(AnalysisError::EmptyEventSet)
        ));
    }
    #[test]
    fn derived_paths_keep_directory_and_extension() {
        assert_eq!(
            derived_path(Path::new("/data/s01/rec.json"), "emgraw"),
            PathBuf::from("/data/s01/recemgraw.json")
        );
    }
    #[test]
    fn preprocessing_writes_split_and_cleaned_recordings() {
        let labels: Vec<String> = ["EEG FP1-A1+A2", "EEG CZ-G2", "EMG L", "EKG"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let raw = Recording::new(100.0, labels, vec![vec![1.0; 400]; 4]).unwrap();
        let mut store = store_with(vec![("rec.json", raw)]);
        let mut decomposer = ChannelDecomposer {
            labels: vec![ComponentLabel::EyeBlink, ComponentLabel::Brain],
            fitted: None,
        };
        let outputs = preprocess_recording(
            &mut store,
            Path::new("rec.json"),
            Some(&mut decomposer),
            &ArtifactConfig::default(),
        )
        .unwrap();
        assert_eq!(outputs.emg.channel_labels, vec!["EMG L"]);
        assert_eq!(outputs.eeg.channel_labels, vec!["Fp1", "Cz"]);
        assert_eq!(outputs.cleaned.as_ref().unwrap().excluded, vec![0]);
        assert_eq!(store.len(), 4);
        assert!(store.get(Path::new("receegica.json")).is_some());
        let without = preprocess_recording(&mut store, Path::new("rec.json"), None, &ArtifactConfig::default()).unwrap();
        assert!(without.cleaned.is_none());
    }
    #[test]
    fn preprocess_batch_isolates_failing_files() {
        let labels: Vec<String> = ["EEG CZ-G2", "EMG L"].iter().map(|s| s.to_string()).collect();
        let raw = Recording::new(100.0, labels, vec![vec![0.5; 200]; 2]).unwrap();
        let mut store = store_with(vec![("a.json", raw.clone()), ("c.json", raw)]);
        let mut decomposer = ChannelDecomposer {
            labels: vec![ComponentLabel::Brain],
            fitted: None,
        };
        let config = AnalysisConfig::default();
        let paths: Vec<PathBuf> = ["a.json", "b.json", "c.json"].iter().map(PathBuf::from).collect();
        let results = preprocess_batch(&mut store, &paths, Some(&mut decomposer), &config.artifacts);
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(AnalysisError::Io { .. })));
        assert!(results[2].1.as_ref().unwrap().cleaned.is_some());
        assert_eq!(decomposer.fitted, Some((1, 69)));
        assert!(store.get(Path::new("ceegica.json")).is_some());
        let disabled = ArtifactConfig {
            enabled: false,
            ..config.artifacts
        };
        let results = preprocess_batch(&mut store, &paths[..1], Some(&mut decomposer), &disabled);
        assert!(results[0].1.as_ref().unwrap().cleaned.is_none());
    }
    #[test]
    fn preprocess_outputs_are_recognised() {
        assert!(is_preprocess_output(Path::new("/d/recemgraw.json")));
        assert!(is_preprocess_output(Path::new("receegica.json")));
        assert!(!is_preprocess_output(Path::new("/d/rec.json")));
    }
}
