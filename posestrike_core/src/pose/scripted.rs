use std::collections::{HashMap, VecDeque};

use pose_data::landmark::Keypoint;

use crate::pose::source::{LandmarkSource, ReferenceImages};

/// Detector stand-in that replays canned results per image label.
///
/// Each label owns a queue of responses; every `infer` pops the next one and
/// the last response repeats once the queue runs dry. Unknown labels yield no
/// keypoints. Images are plain labels, so the same type also resolves
/// reference identifiers.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    responses: HashMap<String, VecDeque<Vec<Keypoint>>>,
    calls: usize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one more response for `label`.
    pub fn push(&mut self, label: impl Into<String>, keypoints: Vec<Keypoint>) -> &mut Self {
        self.responses
            .entry(label.into())
            .or_default()
            .push_back(keypoints);
        self
    }

    pub fn with(mut self, label: impl Into<String>, keypoints: Vec<Keypoint>) -> Self {
        self.push(label, keypoints);
        self
    }

    /// Number of `infer` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl LandmarkSource<String> for ScriptedSource {
    fn infer(&mut self, image: &String) -> Vec<Keypoint> {
        self.calls += 1;
        match self.responses.get_mut(image) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

/// Reference resolver for label-addressed images: the identifier is the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelImages;

impl ReferenceImages<String> for LabelImages {
    fn resolve(&mut self, image: &str) -> anyhow::Result<String> {
        Ok(image.to_string())
    }
}
