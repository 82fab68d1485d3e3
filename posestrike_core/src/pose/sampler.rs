use pose_data::landmark::{KeypointId, LandmarkSet};
use tracing::trace;

use crate::error::PoseError;
use crate::pose::source::LandmarkSource;

/// Retries the detector on one image until every required keypoint is
/// present, keeping the most complete result seen so far.
#[derive(Debug, Clone, Copy)]
pub struct PoseSampler {
    max_attempts: u32,
}

impl PoseSampler {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// One initial detection, then up to `max_attempts` retries. A retry only
    /// replaces the best candidate if it has strictly more required ids.
    ///
    /// Never returns a set that lacks a required id.
    pub fn sample<F, S>(
        &self,
        source: &mut S,
        image: &F,
        required: &[KeypointId],
    ) -> Result<LandmarkSet, PoseError>
    where
        S: LandmarkSource<F> + ?Sized,
    {
        let mut best = LandmarkSet::new(source.infer(image));
        let mut best_count = best.count_present(required);

        let mut attempt = 0;
        while best_count < required.len() && attempt < self.max_attempts {
            attempt += 1;
            let candidate = LandmarkSet::new(source.infer(image));
            let count = candidate.count_present(required);
            trace!(attempt, count, best_count, "pose sample attempt");
            if count > best_count {
                best = candidate;
                best_count = count;
            }
        }

        if best_count == required.len() {
            Ok(best)
        } else {
            Err(PoseError::IncompletePose {
                found: best_count,
                required: required.len(),
                attempts: attempt,
            })
        }
    }
}
