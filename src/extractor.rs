use image::DynamicImage;

use crate::error::FaceMatchError;

/// Bounding box of a detected face, in pixel units of the frame it
/// was computed on.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: u32,
    /// Y coordinate of the top-left corner (pixels).
    pub y: u32,
    /// Width of the bounding box (pixels).
    pub width: u32,
    /// Height of the bounding box (pixels).
    pub height: u32,
}

/// One detected face: where it is and what it looks like.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Face location within the source image.
    pub bounds: FaceBounds,
    /// Identity embedding produced by the extraction model.
    pub embedding: Vec<f32>,
}

/// Pluggable face detection + embedding extraction backend.
///
/// Implement this trait to plug in any extraction engine (ONNX, dlib,
/// a remote service, ...). The crate never runs a model itself.
///
/// `extract` is the lenient call variant: an image with no face yields
/// an empty `Vec`, not an error. `Err` is reserved for the backend
/// itself failing. The strict variant used during enrollment is the
/// provided [`extract_strict`](EmbeddingExtractor::extract_strict).
pub trait EmbeddingExtractor: Send + Sync {
    /// Identifier of the extraction model, recorded with each
    /// enrolled embedding for display and audit.
    fn model_id(&self) -> &str;

    /// Detect faces in `image` and compute an embedding for each.
    fn extract(&self, image: &DynamicImage) -> Result<Vec<Detection>, FaceMatchError>;

    /// Strict call variant: fails with [`FaceMatchError::NoFaceDetected`]
    /// when the image contains no face. Returns the first detection,
    /// which is the only one enrollment uses.
    fn extract_strict(&self, image: &DynamicImage) -> Result<Detection, FaceMatchError> {
        let mut detections = self.extract(image)?;
        if detections.is_empty() {
            return Err(FaceMatchError::NoFaceDetected);
        }
        Ok(detections.swap_remove(0))
    }
}
