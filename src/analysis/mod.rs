// src/analysis/mod.rs
pub mod artifacts;
pub mod baseline;
pub mod burst;
pub mod epochs;
pub mod error;
pub mod events;
pub mod filter;
pub mod onset;
pub mod pipeline;
pub mod plot;
pub mod recording;
pub mod synthetic;
pub use artifacts::{
    artifact_components, remove_artifacts, ArtifactConfig, CleanedRecording, ComponentDecomposer,
    ComponentLabel,
};
pub use baseline::{estimate_baseline, Baseline};
pub use burst::{detect_burst, moving_average, BurstDetector, BurstOutcome, EdgeMode};
pub use epochs::{build_epochs, evoked_from_onsets, EpochOptions, Epochs, Evoked};
pub use error::AnalysisError;
pub use events::{events_from_annotations, events_from_onsets, Event, DEFAULT_EVENT_ID};
pub use filter::BandPass;
pub use onset::{
    detect_onsets, ChannelSelection, CollisionPolicy, Onset, OnsetParams, OnsetRecord, SkipReason,
    SkippedEvent,
};
pub use pipeline::{
    annotation_evoked, derived_path, is_preprocess_output, preprocess_batch, preprocess_recording,
    AnalysisReport, BatchReport, OnsetPipeline, PreprocessOutputs,
};
pub use plot::{render_evoked_png, PlotStyle};
pub use recording::{
    load_checked, Annotation, JsonRecordingStore, MemoryStore, Recording, RecordingInfo,
    RecordingStore, MIN_SAMPLE_RATE_HZ,
};
pub use synthetic::{step_signal, Burst, SyntheticBuilder};
