use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::FaceMatchError;
use crate::extractor::EmbeddingExtractor;
use crate::store::{EmbeddingRecord, EmbeddingStore};

/// File extensions (lowercased) accepted as enrollment photos. Only
/// the extension is inspected; content is not sniffed.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// One enrollment photo that was skipped, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedImage {
    /// File name of the photo that failed.
    pub file: String,
    /// Human-readable failure text.
    pub reason: String,
}

/// Result of one enrollment run.
#[derive(Debug, Clone)]
pub struct EnrollmentReport {
    /// Ids enrolled in this run, in processing order.
    pub enrolled: Vec<String>,
    /// Photos that failed extraction or decoding. Per-image failures
    /// are independent and never abort the batch.
    pub skipped: Vec<SkippedImage>,
    /// Whether the store blob was (re)written. False when no image
    /// succeeded.
    pub saved: bool,
    /// All ids registered in the store file after this run, read back
    /// from disk. Empty when the file does not exist.
    pub registered: Vec<String>,
}

/// List the enrollable image files under `dir`, sorted by name.
///
/// Sorting pins down the collision policy: when two files share a
/// stem, the lexicographically later file wins.
fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, FaceMatchError> {
    if !dir.is_dir() {
        return Err(FaceMatchError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Build an embedding gallery from a directory of still photos.
///
/// Every accepted image is processed sequentially: the person id is
/// the filename stem, extraction runs in strict mode (one reference
/// face per photo, first detection taken), and each success is
/// upserted into an in-memory store. A file whose stem collides with
/// an earlier one silently replaces it.
///
/// If at least one image succeeds the whole store is persisted to
/// `store_path`, atomically overwriting any previous blob. If none
/// succeed, nothing is written and the previous blob survives.
///
/// A missing `dir` is fatal. An empty `dir` is not: the run completes
/// with an empty report.
pub fn enroll_directory(
    dir: &Path,
    store_path: &Path,
    extractor: &dyn EmbeddingExtractor,
) -> Result<EnrollmentReport, FaceMatchError> {
    let files = discover_images(dir)?;

    if files.is_empty() {
        warn!(dir = %dir.display(), "no enrollment images found");
    } else {
        info!(dir = %dir.display(), count = files.len(), "found enrollment images");
    }

    let mut store = EmbeddingStore::new();
    let mut enrolled = Vec::new();
    let mut skipped = Vec::new();

    for (idx, path) in files.iter().enumerate() {
        let file = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let person_id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        if person_id.is_empty() {
            skipped.push(SkippedImage {
                file,
                reason: "empty filename stem".to_string(),
            });
            continue;
        }

        info!(image = %file, "processing {}/{}", idx + 1, files.len());

        let result = image::open(path)
            .map_err(|e| FaceMatchError::Decode(e.to_string()))
            .and_then(|img| extractor.extract_strict(&img));

        match result {
            Ok(detection) => {
                info!(
                    person_id = %person_id,
                    dimension = detection.embedding.len(),
                    "embedding extracted"
                );
                store.insert_or_replace(
                    person_id.clone(),
                    EmbeddingRecord {
                        embedding: detection.embedding,
                        source: path.display().to_string(),
                        model_id: extractor.model_id().to_string(),
                    },
                );
                enrolled.push(person_id);
            }
            Err(e) => {
                warn!(image = %file, error = %e, "skipping image");
                skipped.push(SkippedImage {
                    file,
                    reason: e.to_string(),
                });
            }
        }
    }

    let saved = if store.is_empty() {
        info!("no embeddings extracted, store not written");
        false
    } else {
        store.save(store_path)?;
        info!(
            store = %store_path.display(),
            count = store.len(),
            "embedding store saved"
        );
        true
    };

    // Read back whatever is registered now, even if this run enrolled
    // nothing. A missing file just means an empty gallery.
    let registered = match EmbeddingStore::load(store_path) {
        Ok(persisted) => persisted.person_ids(),
        Err(FaceMatchError::StoreMissing(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    Ok(EnrollmentReport {
        enrolled,
        skipped,
        saved,
        registered,
    })
}
