use pose_data::landmark::Keypoint;

/// Body-landmark detector. Given an image, returns whatever keypoints it
/// found; the result may be partial or empty and may differ between calls
/// on the same image.
pub trait LandmarkSource<F>: Send {
    fn infer(&mut self, image: &F) -> Vec<Keypoint>;
}

impl<F, S: LandmarkSource<F> + ?Sized> LandmarkSource<F> for Box<S> {
    fn infer(&mut self, image: &F) -> Vec<Keypoint> {
        (**self).infer(image)
    }
}

/// Resolves a reference image identifier to pixel data.
pub trait ReferenceImages<F>: Send {
    fn resolve(&mut self, image: &str) -> anyhow::Result<F>;
}
