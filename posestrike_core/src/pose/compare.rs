//! Joint-angle pose similarity.
//!
//! Angles are signed planar angles measured at the middle keypoint, from the
//! ray toward the first keypoint to the ray toward the third, in `[0, 360)`.
//! Mirror-image poses therefore give complementary rather than equal values.
//! No scale normalization is applied, so a player standing much closer or
//! farther than the reference subject is compared as-is.

use glam::DVec2;
use pose_data::landmark::{BodyLandmark, KeypointId, LandmarkSet};

use crate::error::PoseError;

/// Three keypoints whose angle is measured at `vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriple {
    pub name: &'static str,
    pub first: KeypointId,
    pub vertex: KeypointId,
    pub last: KeypointId,
}

const fn triple(
    name: &'static str,
    first: BodyLandmark,
    vertex: BodyLandmark,
    last: BodyLandmark,
) -> JointTriple {
    JointTriple {
        name,
        first: first.id(),
        vertex: vertex.id(),
        last: last.id(),
    }
}

/// Joints compared by [`AngleComparator`], in evaluation order.
pub const COMPARED_JOINTS: [JointTriple; 6] = {
    use BodyLandmark::*;
    [
        triple("left elbow", LeftShoulder, LeftElbow, LeftWrist),
        triple("right elbow", RightShoulder, RightElbow, RightWrist),
        triple("left shoulder-hip", LeftElbow, LeftShoulder, LeftHip),
        triple("right shoulder-hip", RightElbow, RightShoulder, RightHip),
        triple("torso twist", LeftShoulder, RightShoulder, RightHip),
        triple("torso twist reverse", RightShoulder, LeftShoulder, LeftHip),
    ]
};

/// Every keypoint referenced by [`COMPARED_JOINTS`].
pub const REQUIRED_KEYPOINTS: [KeypointId; 8] = [
    BodyLandmark::LeftShoulder.id(),
    BodyLandmark::RightShoulder.id(),
    BodyLandmark::LeftElbow.id(),
    BodyLandmark::RightElbow.id(),
    BodyLandmark::LeftWrist.id(),
    BodyLandmark::RightWrist.id(),
    BodyLandmark::LeftHip.id(),
    BodyLandmark::RightHip.id(),
];

/// Angle at `vertex` in degrees, in `[0, 360)`.
pub fn angle_between(first: DVec2, vertex: DVec2, last: DVec2) -> f64 {
    let to_first = first - vertex;
    let to_last = last - vertex;
    let degrees = (to_last.y.atan2(to_last.x) - to_first.y.atan2(to_first.x)).to_degrees();
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    // A tiny negative difference can round up to exactly 360.
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

fn position(set: &LandmarkSet, id: KeypointId) -> Result<DVec2, PoseError> {
    set.get(id)
        .map(|p| DVec2::new(p.x, p.y))
        .ok_or(PoseError::MissingKeypoint { id })
}

pub fn joint_angle(
    set: &LandmarkSet,
    first: KeypointId,
    vertex: KeypointId,
    last: KeypointId,
) -> Result<f64, PoseError> {
    Ok(angle_between(
        position(set, first)?,
        position(set, vertex)?,
        position(set, last)?,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDelta {
    pub joint: &'static str,
    pub reference_deg: f64,
    pub live_deg: f64,
    pub delta_deg: f64,
}

/// Outcome of one comparison. `deltas` stops at the first joint outside the
/// threshold, so a non-match always ends with the offending joint.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub is_match: bool,
    pub deltas: Vec<JointDelta>,
}

impl MatchResult {
    pub fn failed_joint(&self) -> Option<&JointDelta> {
        if self.is_match {
            None
        } else {
            self.deltas.last()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AngleComparator {
    threshold_deg: f64,
}

impl AngleComparator {
    pub fn new(threshold_deg: f64) -> Self {
        Self { threshold_deg }
    }

    /// Compares every joint of [`COMPARED_JOINTS`] in order.
    ///
    /// Both poses must contain all of [`REQUIRED_KEYPOINTS`]; otherwise this
    /// fails before any angle is computed.
    pub fn compare(
        &self,
        reference: &LandmarkSet,
        live: &LandmarkSet,
    ) -> Result<MatchResult, PoseError> {
        for set in [reference, live] {
            if let Some(id) = set.first_missing(&REQUIRED_KEYPOINTS) {
                return Err(PoseError::MissingKeypoint { id });
            }
        }

        let mut deltas = Vec::with_capacity(COMPARED_JOINTS.len());
        for joint in COMPARED_JOINTS {
            let reference_deg = joint_angle(reference, joint.first, joint.vertex, joint.last)?;
            let live_deg = joint_angle(live, joint.first, joint.vertex, joint.last)?;
            let delta_deg = (reference_deg - live_deg).abs();
            deltas.push(JointDelta {
                joint: joint.name,
                reference_deg,
                live_deg,
                delta_deg,
            });
            if delta_deg > self.threshold_deg {
                return Ok(MatchResult {
                    is_match: false,
                    deltas,
                });
            }
        }

        Ok(MatchResult {
            is_match: true,
            deltas,
        })
    }

    pub fn similar(&self, reference: &LandmarkSet, live: &LandmarkSet) -> Result<bool, PoseError> {
        self.compare(reference, live).map(|r| r.is_match)
    }
}
