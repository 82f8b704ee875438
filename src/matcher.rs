use crate::error::FaceMatchError;
use crate::store::EmbeddingStore;

/// Default decision threshold on cosine distance. A probe matches
/// when its minimum distance is strictly below this value.
pub const DEFAULT_THRESHOLD: f32 = 0.4;

/// Outcome of matching one probe embedding against the gallery.
/// "No match" is a normal result for unknown or absent faces, never
/// an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The nearest gallery record was close enough.
    Matched {
        /// Key of the nearest record.
        person_id: String,
        /// `1 - distance`, in [-1, 1]; 1.0 means identical direction.
        similarity: f32,
        /// Cosine distance to the nearest record.
        distance: f32,
    },
    /// Gallery empty, or nearest record beyond the threshold.
    NoMatch,
}

/// Cosine distance: `1 - cosineSimilarity`, range [0, 2].
///
/// Fails with [`FaceMatchError::DimensionMismatch`] rather than
/// producing a meaningless number when the vectors disagree on
/// length. A zero-norm vector has similarity 0 with everything, so
/// its distance is 1.0 instead of NaN.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, FaceMatchError> {
    if a.len() != b.len() {
        return Err(FaceMatchError::DimensionMismatch {
            probe: a.len(),
            stored: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(1.0);
    }

    Ok(1.0 - dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Nearest-neighbor matcher over an [`EmbeddingStore`].
///
/// Exhaustive linear scan, O(n) per probe. Fine at the intended
/// scale of tens to low hundreds of identities; an index structure
/// would be the first thing to add past that.
#[derive(Debug, Clone)]
pub struct Matcher {
    threshold: f32,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Matcher {
    /// Create a matcher with the given cosine-distance threshold.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// The configured decision threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Find the stored record nearest to `probe`.
    ///
    /// Ties break toward the first-encountered minimum (strict `<`
    /// tracking); iteration order over the store is unspecified. An
    /// empty store deterministically yields
    /// [`MatchOutcome::NoMatch`].
    pub fn best_match(
        &self,
        probe: &[f32],
        store: &EmbeddingStore,
    ) -> Result<MatchOutcome, FaceMatchError> {
        let mut best: Option<(&str, f32)> = None;

        for (person_id, record) in store.records() {
            let distance = cosine_distance(probe, &record.embedding)?;
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((person_id, distance)),
            }
        }

        match best {
            Some((person_id, distance)) if distance < self.threshold => {
                Ok(MatchOutcome::Matched {
                    person_id: person_id.to_string(),
                    similarity: 1.0 - distance,
                    distance,
                })
            }
            _ => Ok(MatchOutcome::NoMatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EmbeddingRecord;

    fn store_with(entries: &[(&str, &[f32])]) -> EmbeddingStore {
        let mut store = EmbeddingStore::new();
        for (id, embedding) in entries {
            store.insert_or_replace(
                id.to_string(),
                EmbeddingRecord {
                    embedding: embedding.to_vec(),
                    source: format!("photos/{id}.jpg"),
                    model_id: "test-model".to_string(),
                },
            );
        }
        store
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let d = cosine_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_have_distance_two() {
        let d = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_distance_one() {
        let d = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = [0.3, -0.7, 1.2];
        let b = [0.9, 0.1, -0.4];
        let ab = cosine_distance(&a, &b).unwrap();
        let ba = cosine_distance(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn scale_does_not_change_distance() {
        let d = cosine_distance(&[1.0, 2.0], &[10.0, 20.0]).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = cosine_distance(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            FaceMatchError::DimensionMismatch {
                probe: 2,
                stored: 1
            }
        ));
    }

    #[test]
    fn zero_vector_yields_distance_one() {
        let d = cosine_distance(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_store_is_no_match() {
        let matcher = Matcher::default();
        let outcome = matcher.best_match(&[1.0, 0.0], &store_with(&[])).unwrap();
        assert_eq!(outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn self_match_has_similarity_one() {
        let probe = [0.1, 0.8, -0.3, 0.5];
        let store = store_with(&[("alice", &probe), ("bob", &[1.0, 0.0, 0.0, 0.0])]);
        let outcome = Matcher::default().best_match(&probe, &store).unwrap();
        match outcome {
            MatchOutcome::Matched {
                person_id,
                similarity,
                ..
            } => {
                assert_eq!(person_id, "alice");
                assert!((similarity - 1.0).abs() < 1e-5);
            }
            MatchOutcome::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn reported_distance_is_the_minimum() {
        let probe = [1.0, 0.0];
        let store = store_with(&[
            ("far", &[0.0, 1.0]),
            ("near", &[0.9, 0.1]),
            ("opposite", &[-1.0, 0.0]),
        ]);
        let outcome = Matcher::new(2.5).best_match(&probe, &store).unwrap();
        match outcome {
            MatchOutcome::Matched {
                person_id,
                distance,
                ..
            } => {
                assert_eq!(person_id, "near");
                for (_, record) in store.records() {
                    let d = cosine_distance(&probe, &record.embedding).unwrap();
                    assert!(distance <= d);
                }
            }
            MatchOutcome::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn beyond_threshold_is_no_match() {
        let store = store_with(&[("alice", &[0.0, 1.0])]);
        // Orthogonal probe: distance 1.0, default threshold 0.4
        let outcome = Matcher::default().best_match(&[1.0, 0.0], &store).unwrap();
        assert_eq!(outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn threshold_is_monotonic() {
        let probe = [1.0, 0.2];
        let store = store_with(&[("alice", &[1.0, 0.0])]);

        let mut was_match = false;
        for threshold in [0.0001, 0.01, 0.1, 0.5, 1.0, 2.0] {
            let outcome = Matcher::new(threshold).best_match(&probe, &store).unwrap();
            let is_match = matches!(outcome, MatchOutcome::Matched { .. });
            // Raising the threshold can only turn NoMatch into Match
            assert!(is_match || !was_match);
            was_match = is_match;
        }
        assert!(was_match);
    }

    #[test]
    fn exact_ties_do_not_crash() {
        let probe = [1.0, 0.0];
        let store = store_with(&[("a", &[2.0, 0.0]), ("b", &[3.0, 0.0])]);
        let outcome = Matcher::default().best_match(&probe, &store).unwrap();
        match outcome {
            MatchOutcome::Matched { person_id, .. } => {
                assert!(person_id == "a" || person_id == "b");
            }
            MatchOutcome::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn dimension_mismatch_propagates_from_best_match() {
        let store = store_with(&[("alice", &[1.0, 0.0, 0.0])]);
        let err = Matcher::default()
            .best_match(&[1.0, 0.0], &store)
            .unwrap_err();
        assert!(matches!(err, FaceMatchError::DimensionMismatch { .. }));
    }
}
