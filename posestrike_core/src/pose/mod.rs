pub mod compare;
pub mod sampler;
pub mod scripted;
pub mod source;

use pose_data::landmark::LandmarkSet;

/// A reference image together with the landmarks extracted from it.
/// Replaced wholesale when the game moves to the next image.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePose {
    pub index: usize,
    pub image: String,
    pub landmarks: LandmarkSet,
}
