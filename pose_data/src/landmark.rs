use serde::{Deserialize, Serialize};

/// Index of a body landmark in the 33-point MediaPipe pose numbering.
pub type KeypointId = u32;

/// Body landmarks the engine refers to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum BodyLandmark {
    Nose = 0,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

impl BodyLandmark {
    pub const fn id(self) -> KeypointId {
        self as KeypointId
    }
}

/// A single detected landmark in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub id: KeypointId,
    pub x: f64,
    pub y: f64,
}

impl Keypoint {
    pub fn new(id: KeypointId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

/// Landmarks detected on one image. Ids are unique; order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keypoint>", into = "Vec<Keypoint>")]
pub struct LandmarkSet {
    points: Vec<Keypoint>,
}

impl LandmarkSet {
    /// Builds a set from raw detector output. When an id repeats, the first
    /// occurrence wins.
    pub fn new(points: Vec<Keypoint>) -> Self {
        let mut unique: Vec<Keypoint> = Vec::with_capacity(points.len());
        for point in points {
            if !unique.iter().any(|p| p.id == point.id) {
                unique.push(point);
            }
        }
        Self { points: unique }
    }

    pub fn get(&self, id: KeypointId) -> Option<&Keypoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: KeypointId) -> bool {
        self.get(id).is_some()
    }

    /// How many of `ids` are present in this set.
    pub fn count_present(&self, ids: &[KeypointId]) -> usize {
        ids.iter().filter(|&&id| self.contains(id)).count()
    }

    pub fn contains_all(&self, ids: &[KeypointId]) -> bool {
        ids.iter().all(|&id| self.contains(id))
    }

    /// First id in `ids` that this set lacks.
    pub fn first_missing(&self, ids: &[KeypointId]) -> Option<KeypointId> {
        ids.iter().copied().find(|&id| !self.contains(id))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.points.iter()
    }
}

impl From<Vec<Keypoint>> for LandmarkSet {
    fn from(points: Vec<Keypoint>) -> Self {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Keypoint> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

impl FromIterator<Keypoint> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Keypoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
