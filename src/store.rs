use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FaceMatchError;

/// One enrolled identity: the reference embedding plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    /// Fixed-length identity embedding.
    pub embedding: Vec<f32>,
    /// Where the embedding came from, e.g. the enrollment photo path.
    pub source: String,
    /// Extraction model that produced the embedding. Display and
    /// audit only; never used for automatic invalidation.
    pub model_id: String,
}

/// Persistent gallery of enrolled identities, keyed by person id.
///
/// Embedding dimensionality is expected to be homogeneous within one
/// store. Mixing embeddings produced by different models is not
/// validated here; it silently degrades matching and is the caller's
/// responsibility to avoid.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EmbeddingStore {
    records: HashMap<String, EmbeddingRecord>,
}

impl EmbeddingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional upsert: a record with an existing id replaces
    /// the previous one.
    pub fn insert_or_replace(&mut self, person_id: impl Into<String>, record: EmbeddingRecord) {
        self.records.insert(person_id.into(), record);
    }

    /// Look up a single record.
    pub fn get(&self, person_id: &str) -> Option<&EmbeddingRecord> {
        self.records.get(person_id)
    }

    /// Number of enrolled identities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records. An empty store is valid.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Enrolled ids, sorted for stable reporting.
    pub fn person_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Iterate over all records. Iteration order is unspecified.
    pub fn records(&self) -> impl Iterator<Item = (&String, &EmbeddingRecord)> {
        self.records.iter()
    }

    /// Load a store from its persisted blob.
    pub fn load(path: &Path) -> Result<Self, FaceMatchError> {
        if !path.exists() {
            return Err(FaceMatchError::StoreMissing(path.to_path_buf()));
        }
        let blob = fs::read(path)?;
        bincode::deserialize(&blob).map_err(|e| FaceMatchError::CorruptStore(e.to_string()))
    }

    /// Serialize the full mapping and atomically replace the blob at
    /// `path`. The write goes to a temporary file in the same
    /// directory followed by a rename, so a crash mid-save leaves the
    /// previous blob untouched.
    pub fn save(&self, path: &Path) -> Result<(), FaceMatchError> {
        let blob =
            bincode::serialize(self).map_err(|e| FaceMatchError::CorruptStore(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &blob)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
