//! Face identity matching: enroll reference photos into an embedding
//! gallery, then match embeddings from a live video feed against it.
//!
//! The expensive pieces (face detection + embedding extraction, frame
//! capture, frame display) are external collaborators behind traits;
//! this crate owns the gallery, the nearest-neighbor matching policy,
//! and the streaming loop that decouples extraction cadence from
//! render cadence.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use facematch::{EmbeddingStore, Matcher, RecognitionLoop};
//! # fn extractor() -> Box<dyn facematch::EmbeddingExtractor> { unimplemented!() }
//! # fn camera() -> Box<dyn facematch::FrameSource> { unimplemented!() }
//! # fn display() -> Box<dyn facematch::FrameSink> { unimplemented!() }
//!
//! let store = EmbeddingStore::load(Path::new("gallery/embeddings.bin")).unwrap();
//! let mut recognition = RecognitionLoop::new(store, Matcher::default());
//! let summary = recognition
//!     .run(&mut *camera(), &*extractor(), &mut *display())
//!     .unwrap();
//! println!("rendered {} frames", summary.frames);
//! ```
#![warn(missing_docs)]

/// Directory enrollment pipeline.
pub mod enroll;
mod error;
/// Extraction collaborator traits and detection types.
pub mod extractor;
/// Cosine-distance nearest-neighbor matching.
pub mod matcher;
/// Persisted embedding gallery.
pub mod store;
/// Streaming recognition loop and its collaborator traits.
pub mod stream;

/// Error type returned by facematch operations.
pub use error::FaceMatchError;

pub use enroll::{enroll_directory, EnrollmentReport, SkippedImage, IMAGE_EXTENSIONS};
pub use extractor::{Detection, EmbeddingExtractor, FaceBounds};
pub use matcher::{cosine_distance, MatchOutcome, Matcher, DEFAULT_THRESHOLD};
pub use store::{EmbeddingRecord, EmbeddingStore};
pub use stream::{
    CameraSource, FrameSink, FrameSource, LoopSummary, MatchKind, Overlay, RecognitionLoop,
    DEFAULT_SAMPLE_INTERVAL, UNKNOWN_LABEL,
};
