use std::fmt;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::FaceMatchError;
use crate::extractor::{EmbeddingExtractor, FaceBounds};
use crate::matcher::{MatchOutcome, Matcher};
use crate::store::EmbeddingStore;

/// Label drawn when a face is present but matches nobody in the
/// gallery.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Default number of frames between successive extraction attempts.
pub const DEFAULT_SAMPLE_INTERVAL: u64 = 10;

/// Where frames come from: a local device index or a network stream
/// URL. Already resolved by the caller; the loop treats it opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    /// Local capture device index.
    Device(u32),
    /// Network stream URL (HTTP, RTSP, ...).
    Url(String),
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSource::Device(idx) => write!(f, "device {idx}"),
            CameraSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Frame acquisition backend.
///
/// The capture handle is a scoped resource: implementors release it
/// in `Drop`, which covers every exit path out of
/// [`RecognitionLoop::run`], including errors.
pub trait FrameSource {
    /// Block until the next frame. `Ok(None)` means the stream ended;
    /// `Err` means acquisition failed. Both stop the loop.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, FaceMatchError>;
}

/// Frame presentation backend: draws the overlay and status line and
/// shows the frame.
pub trait FrameSink {
    /// Present one frame. `overlay` is the current detection overlay
    /// (possibly stale by up to `sample_interval - 1` frames);
    /// `status` is the fixed status line drawn on every frame.
    fn present(
        &mut self,
        frame: &DynamicImage,
        overlay: Option<&Overlay>,
        status: &str,
    ) -> Result<(), FaceMatchError>;

    /// Whether the user asked to exit. Checked once per loop
    /// iteration, after rendering; an in-flight extraction always
    /// runs to completion first.
    fn exit_requested(&mut self) -> bool {
        false
    }
}

/// Whether the overlaid face matched an enrolled identity. Drives
/// the display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Nearest gallery record was within the threshold.
    Recognized,
    /// A face was present but nobody matched.
    Unknown,
}

/// The detection currently drawn on rendered frames.
///
/// Replaced only on sampled frames; rendered on every frame so the
/// box stays visually stable instead of flickering at the sample
/// rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Face bounding box, in pixel units of the frame it was
    /// computed on.
    pub bounds: FaceBounds,
    /// Display string: `"{id} ({similarity}%)"` or [`UNKNOWN_LABEL`].
    pub label: String,
    /// Recognized vs. unknown, for display color.
    pub kind: MatchKind,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Frames acquired and rendered.
    pub frames: u64,
    /// Sampled frames on which the extractor actually ran.
    pub extractions: u64,
}

/// Streaming recognition loop.
///
/// Single-threaded and cooperative: the only blocking operations are
/// frame acquisition and the extractor call. Extraction runs every
/// `sample_interval` frames; between samples the last overlay is
/// left untouched and re-rendered, trading up to
/// `sample_interval - 1` frames of positional staleness for a
/// stutter-free display.
///
/// The store is loaded once and read-only here; mutation belongs to
/// the enrollment pipeline alone.
pub struct RecognitionLoop {
    store: EmbeddingStore,
    matcher: Matcher,
    sample_interval: u64,
    frame_count: u64,
    overlay: Option<Overlay>,
}

impl RecognitionLoop {
    /// Create a loop over `store` with the default sample interval.
    pub fn new(store: EmbeddingStore, matcher: Matcher) -> Self {
        Self {
            store,
            matcher,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            frame_count: 0,
            overlay: None,
        }
    }

    /// Override the sample interval. Values below 1 are clamped to 1
    /// (extract on every frame).
    pub fn sample_interval(mut self, interval: u64) -> Self {
        self.sample_interval = interval.max(1);
        self
    }

    /// The overlay currently in effect, if any.
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance the state machine by one acquired frame and return the
    /// overlay to render on it.
    ///
    /// On sampled frames the extractor runs leniently: zero
    /// detections or an extractor error both clear the overlay and
    /// never escape (a bad frame must not kill the stream). A
    /// [`FaceMatchError::DimensionMismatch`] from the matcher does
    /// propagate: the probe model disagrees with the gallery and
    /// every subsequent frame would fail the same way.
    pub fn process_frame(
        &mut self,
        frame: &DynamicImage,
        extractor: &dyn EmbeddingExtractor,
    ) -> Result<Option<&Overlay>, FaceMatchError> {
        self.frame_count += 1;

        if self.frame_count % self.sample_interval == 0 {
            match extractor.extract(frame) {
                Ok(detections) => match detections.into_iter().next() {
                    Some(detection) => {
                        let outcome = self.matcher.best_match(&detection.embedding, &self.store)?;
                        self.overlay = Some(build_overlay(detection.bounds, outcome));
                    }
                    None => {
                        debug!(frame = self.frame_count, "no face in sampled frame");
                        self.overlay = None;
                    }
                },
                Err(e) => {
                    warn!(frame = self.frame_count, error = %e, "extraction failed");
                    self.overlay = None;
                }
            }
        }

        Ok(self.overlay.as_ref())
    }

    /// Drive the full loop: acquire, sample, render, until the source
    /// ends, acquisition fails, or the sink requests exit.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        extractor: &dyn EmbeddingExtractor,
        sink: &mut dyn FrameSink,
    ) -> Result<LoopSummary, FaceMatchError> {
        let status = format!("Registered faces: {} | press 'q' to exit", self.store.len());
        let mut summary = LoopSummary::default();

        info!(
            enrolled = self.store.len(),
            interval = self.sample_interval,
            "recognition loop started"
        );

        while let Some(frame) = source.next_frame()? {
            self.process_frame(&frame, extractor)?;

            summary.frames += 1;
            if self.frame_count % self.sample_interval == 0 {
                summary.extractions += 1;
            }

            sink.present(&frame, self.overlay.as_ref(), &status)?;

            if sink.exit_requested() {
                info!(frames = summary.frames, "exit requested");
                break;
            }
        }

        info!(
            frames = summary.frames,
            extractions = summary.extractions,
            "recognition loop stopped"
        );
        Ok(summary)
    }
}

fn build_overlay(bounds: FaceBounds, outcome: MatchOutcome) -> Overlay {
    match outcome {
        MatchOutcome::Matched {
            person_id,
            similarity,
            ..
        } => Overlay {
            bounds,
            label: format!("{person_id} ({:.1}%)", similarity * 100.0),
            kind: MatchKind::Recognized,
        },
        MatchOutcome::NoMatch => Overlay {
            bounds,
            label: UNKNOWN_LABEL.to_string(),
            kind: MatchKind::Unknown,
        },
    }
}
