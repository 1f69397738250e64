// src/main.rs
use std::fs;
use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use log::{info, warn};
use emg_onset::analysis::{
    derived_path, is_preprocess_output, preprocess_batch, JsonRecordingStore, OnsetPipeline,
};
use emg_onset::discovery::expand_inputs;
use emg_onset::AnalysisConfig;
const USAGE: &str = "usage: emg-onset [preprocess] <config.json> <recording or directory>...";
fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1).peekable();
    let preprocess = args.peek().map(String::as_str) == Some("preprocess");
    if preprocess {
        args.next();
    }
    let Some(config_path) = args.next() else {
        bail!(USAGE);
    };
    let config = AnalysisConfig::load(&config_path)
        .with_context(|| format!("loading config {config_path}"))?;
    let inputs: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if inputs.is_empty() {
        bail!("no recordings given\n{USAGE}");
    }
    let paths: Vec<PathBuf> = expand_inputs(&inputs, &config.recording_extension)
        .context("searching for recordings")?
        .into_iter()
        .filter(|path| !(preprocess && is_preprocess_output(path)))
        .collect();
    if paths.is_empty() {
        bail!("no .{} recordings found", config.recording_extension);
    }
    if preprocess {
        run_preprocess(&config, &paths)
    } else {
        run_analysis(config, &paths)
    }
}
fn run_preprocess(config: &AnalysisConfig, paths: &[PathBuf]) -> Result<()> {
    info!("{} recordings to preprocess", paths.len());
    if config.artifacts.enabled {
        warn!("no component decomposer is linked into this binary; artifact removal is skipped");
    }
    let mut store = JsonRecordingStore;
    let results = preprocess_batch(&mut store, paths, None, &config.artifacts);
    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(out) => println!(
                "{}: {} EMG, {} EEG channels",
                path.display(),
                out.emg.num_channels(),
                out.eeg.num_channels()
            ),
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err}", path.display());
            }
        }
    }
    if failed == results.len() {
        bail!("all {failed} recordings failed");
    }
    Ok(())
}
fn run_analysis(config: AnalysisConfig, paths: &[PathBuf]) -> Result<()> {
    info!("{} recordings to analyse", paths.len());
    if let Some(dir) = &config.plot {
        fs::create_dir_all(dir).with_context(|| format!("creating plot dir {}", dir.display()))?;
    }
    let plot_dir = config.plot.clone();
    let pipeline = OnsetPipeline::new(JsonRecordingStore, config);
    let batch = pipeline.run_batch(paths);
    for (path, report) in batch.succeeded() {
        println!(
            "{}: {} onsets ({} skipped), {} epochs averaged",
            path.display(),
            report.onsets.len(),
            report.onsets.skipped().len(),
            report.evoked.nave
        );
        for onset in report.onsets.iter() {
            println!("  {:>10.4}s  {}  (trigger {:.4}s)", onset.time, onset.channel, onset.event_time);
        }
        if let (Some(dir), Some(png)) = (&plot_dir, &report.plot_png) {
            let name = derived_path(path, "_evoked").with_extension("png");
            let Some(file_name) = name.file_name() else {
                continue;
            };
            let target = dir.join(file_name);
            if let Err(err) = fs::write(&target, png) {
                warn!("failed to write {}: {err}", target.display());
            }
        }
    }
    let failed = batch.failed().count();
    for (path, err) in batch.failed() {
        eprintln!("{}: {err}", path.display());
    }
    if failed == batch.results.len() {
        bail!("all {failed} recordings failed");
    }
    Ok(())
}
