use log::warn;
use crate::analysis::baseline::sample_at;
use crate::analysis::onset::OnsetRecord;
use crate::analysis::recording::Recording;
/// Event id given to annotation and onset events.
pub const DEFAULT_EVENT_ID: u32 = 1;
/// Trigger at a sample index, tagged with an event id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Event {
    pub sample: usize,
    pub id: u32,
}
fn to_events(
    times: impl IntoIterator<Item = f64>,
    sample_rate_hz: f64,
    n_samples: usize,
    id: u32,
) -> Vec<Event> {
    let mut events: Vec<Event> = times
        .into_iter()
        .filter_map(|time| {
            let sample = sample_at(time, sample_rate_hz);
            if sample.is_finite() && sample >= 0.0 && (sample as usize) < n_samples {
                Some(Event {
                    sample: sample as usize,
                    id,
                })
            } else {
                warn!("dropping event at {time:.3}s: outside the recording");
                None
            }
        })
        .collect();
    events.sort();
    events
}
/// Events for annotations whose description equals `label`, rounded to the
/// nearest sample and sorted.
pub fn events_from_annotations(recording: &Recording, label: &str) -> Vec<Event> {
    to_events(
        recording.annotation_times(label),
        recording.sample_rate_hz,
        recording.n_samples(),
        DEFAULT_EVENT_ID,
    )
}
/// Events anchored at every detected onset.
pub fn events_from_onsets(record: &OnsetRecord, recording: &Recording) -> Vec<Event> {
    to_events(
        record.times(),
        recording.sample_rate_hz,
        recording.n_samples(),
        DEFAULT_EVENT_ID,
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::onset::{CollisionPolicy, Onset};
    use crate::analysis::recording::Annotation;
    fn recording() -> Recording {
        Recording::new(100.0, vec!["EMG1".into()], vec![vec![0.0; 1000]])
            .unwrap()
            .with_annotations(vec![
                Annotation::new(4.004, "x"),
                Annotation::new(1.5, "x"),
                Annotation::new(2.0, "y"),
                Annotation::new(12.0, "x"),
            ])
    }
    #[test]
    fn annotations_are_filtered_rounded_and_sorted() {
        let events = events_from_annotations(&recording(), "x");
        assert_eq!(
            events,
            vec![
                Event { sample: 150, id: 1 },
                Event { sample: 400, id: 1 },
            ]
        );
    }
    #[test]
    fn onsets_become_events() {
        let mut record = OnsetRecord::new(100.0, CollisionPolicy::KeepAll);
        for (time, channel) in [(3.257, "EMG1"), (1.0, "EMG2")] {
            record.insert(Onset {
                time,
                channel: channel.into(),
                event_time: 0.0,
            });
        }
        let events = events_from_onsets(&record, &recording());
        assert_eq!(events.iter().map(|e| e.sample).collect::<Vec<_>>(), vec![100, 326]);
    }
}
