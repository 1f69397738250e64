// src/channels.rs
use std::collections::{HashMap, HashSet};
use log::warn;
use once_cell::sync::Lazy;
use crate::analysis::Recording;
/// Electrode names of the standard 10-20 montage (extended positions included).
pub static STANDARD_1020: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Fp1", "Fpz", "Fp2", "AF9", "AF7", "AF5", "AF3", "AF1", "AFz", "AF2", "AF4", "AF6",
        "AF8", "AF10", "F9", "F7", "F5", "F3", "F1", "Fz", "F2", "F4", "F6", "F8", "F10", "FT9",
        "FT7", "FC5", "FC3", "FC1", "FCz", "FC2", "FC4", "FC6", "FT8", "FT10", "T9", "T7", "C5",
        "C3", "C1", "Cz", "C2", "C4", "C6", "T8", "T10", "TP9", "TP7", "CP5", "CP3", "CP1",
        "CPz", "CP2", "CP4", "CP6", "TP8", "TP10", "P9", "P7", "P5", "P3", "P1", "Pz", "P2",
        "P4", "P6", "P8", "P10", "PO9", "PO7", "PO5", "PO3", "PO1", "POz", "PO2", "PO4", "PO6",
        "PO8", "PO10", "O1", "Oz", "O2", "O9", "Iz", "O10", "T3", "T5", "T4", "T6", "M1", "M2",
        "A1", "A2",
    ]
    .into_iter()
    .collect()
});
fn electrode_name(label: &str) -> Option<String> {
    // Text between the first whitespace and the next '-'.
    let (_, rest) = label.split_once(char::is_whitespace)?;
    let (electrode, _) = rest.split_once('-')?;
    Some(electrode.replace("FP", "Fp").replace('Z', "z"))
}
/// Maps a TUH label to its electrode name.
///
/// `"EEG FP1-A1+A2"` and `"EEG CZ-G2"` become `"Fp1"` and `"Cz"`; average
/// referenced labels keep a `-AVG` suffix (`"EEG FZ-AVG"` → `"Fz-AVG"`).
/// Anything else is returned unchanged.
pub fn rename_tuh_channel(label: &str) -> String {
    if !label.starts_with("EEG ") {
        return label.to_string();
    }
    if label.ends_with("-A1+A2") || label.ends_with("-G2") {
        if let Some(name) = electrode_name(label) {
            return name;
        }
    } else if label.ends_with("-AVG") {
        if let Some(name) = electrode_name(label) {
            return name + "-AVG";
        }
    }
    label.to_string()
}
/// Old → new name for every distinct label.
pub fn channel_mapping<'a>(labels: impl IntoIterator<Item = &'a String>) -> HashMap<String, String> {
    let mut mapping = HashMap::new();
    for label in labels {
        mapping
            .entry(label.clone())
            .or_insert_with(|| rename_tuh_channel(label));
    }
    mapping
}
pub fn is_emg_channel(name: &str) -> bool {
    name.starts_with("EMG")
}
/// Renamed labels starting with `E` or `M` (EKG, EMG, ...) are not EEG.
pub fn is_non_eeg_channel(name: &str) -> bool {
    name.starts_with('E') || name.starts_with('M')
}
pub fn in_standard_1020(name: &str) -> bool {
    STANDARD_1020.contains(name)
}
/// EEG and EMG views of one renamed recording.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitRecording {
    pub eeg: Recording,
    pub emg: Recording,
}
/// Splits a renamed recording into EMG leads and montage EEG channels.
/// EEG channels missing from the 10-20 montage are dropped with a warning.
pub fn split_channels(recording: &Recording) -> SplitRecording {
    let emg = recording.pick_channels(is_emg_channel);
    let eeg = recording.pick_channels(|name| !is_non_eeg_channel(name));
    let unplaced: Vec<&String> = eeg
        .channel_labels
        .iter()
        .filter(|name| !in_standard_1020(name))
        .collect();
    if !unplaced.is_empty() {
        warn!("dropping channels outside the 10-20 montage: {unplaced:?}");
    }
    let eeg = eeg.pick_channels(in_standard_1020);
    SplitRecording { eeg, emg }
}
