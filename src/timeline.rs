//! Timeline alignment of visual segments to the narration
//!
//! Durations are split in whole milliseconds: every segment but the last
//! gets its weighted share rounded down, and the last absorbs the
//! remainder. The visual stream therefore covers the audio exactly, or
//! runs past it when a minimum segment or total length applies. It is
//! never shorter. A minimum total length is reached by holding the last
//! segment.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::TimingConfig;
use crate::visual::VisualSegment;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot build a timeline from zero visual segments")]
pub struct EmptyTimelineError;

/// Ordered, contiguous segments covering the audio.
#[derive(Debug, Clone)]
pub struct Timeline {
    segments: Vec<VisualSegment>,
    audio_duration: Duration,
}

fn secs_to_ms_ceil(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).ceil() as u64
    } else {
        0
    }
}

fn effective_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        1.0
    }
}

impl Timeline {
    /// Assign start offsets and display durations to `segments` so they
    /// cover `audio_duration_secs`.
    pub fn build(
        audio_duration_secs: f64,
        mut segments: Vec<VisualSegment>,
        timing: &TimingConfig,
    ) -> Result<Self, EmptyTimelineError> {
        if segments.is_empty() {
            return Err(EmptyTimelineError);
        }

        let audio_ms = secs_to_ms_ceil(audio_duration_secs);
        let target_ms = audio_ms.max(secs_to_ms_ceil(timing.min_total_secs));
        let floor_ms = secs_to_ms_ceil(timing.min_segment_secs).max(1);

        let total_weight: f64 = segments.iter().map(|s| effective_weight(s.weight)).sum();
        let last = segments.len() - 1;
        let mut start_ms = 0u64;

        for (index, segment) in segments.iter_mut().enumerate() {
            let share_ms = if index == last {
                target_ms.saturating_sub(start_ms)
            } else {
                (audio_ms as f64 * effective_weight(segment.weight) / total_weight).floor() as u64
            };
            let duration_ms = share_ms.max(floor_ms);

            segment.assign(
                Duration::from_millis(start_ms),
                Duration::from_millis(duration_ms),
            );
            start_ms += duration_ms;
        }

        debug!(
            "Timeline: {} segments, {}ms visual for {}ms audio",
            segments.len(),
            start_ms,
            audio_ms
        );

        Ok(Self {
            segments,
            audio_duration: Duration::from_millis(audio_ms),
        })
    }

    pub fn segments(&self) -> &[VisualSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Narration length, rounded up to whole milliseconds.
    pub fn audio_duration(&self) -> Duration {
        self.audio_duration
    }

    /// End of the last segment.
    pub fn total_duration(&self) -> Duration {
        self.segments
            .last()
            .map_or(Duration::ZERO, VisualSegment::end)
    }
}
