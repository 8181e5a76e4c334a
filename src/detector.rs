//! Interfaces of the collaborators that turn frames into landmarks and ball detections.

use crate::{
    detection::{BallDetection, TrailState},
    error::Error,
    pose::Landmarks,
};
use tracing::{debug, instrument};

pub trait PoseDetector<F> {
    /// Detect the landmarks of the single subject in `frame`.
    ///
    /// Returns `None` landmarks when nobody was found, together with the frame
    /// annotated with whatever the detector draws.
    fn detect_pose(&mut self, frame: &F) -> Result<(Option<Landmarks>, F), Error>;
}

pub trait BallDetector<F> {
    /// Detect balls in a single frame.
    fn detect(&mut self, frame: &F) -> Result<Vec<BallDetection>, Error>;

    /// Run the model once over a batch, one result list per input frame.
    fn infer_batch(&mut self, frames: &[F]) -> Result<Vec<Vec<BallDetection>>, Error> {
        frames.iter().map(|frame| self.detect(frame)).collect()
    }

    /// Free accelerator memory held between batches.
    fn release_cache(&mut self) {}

    /// Record `detections` in `trail` and draw the trail onto `frame`.
    ///
    /// Detectors that cannot draw only keep the trail up to date.
    fn annotate(
        &self,
        _frame: &mut F,
        detections: &[BallDetection],
        trail: &mut TrailState,
    ) -> Result<(), Error> {
        trail.record(detections);
        Ok(())
    }

    /// Detect over any number of frames in model batches of at most `max_batch`.
    ///
    /// Results are in input order, one list per frame.
    #[instrument(name = "BallDetector::detect_batch", skip(self, frames), fields(frames = frames.len()))]
    fn detect_batch(
        &mut self,
        frames: &[F],
        max_batch: usize,
    ) -> Result<Vec<Vec<BallDetection>>, Error> {
        let mut detections = Vec::with_capacity(frames.len());

        for batch in frames.chunks(max_batch.max(1)) {
            let batch_detections = self.infer_batch(batch)?;
            if batch_detections.len() != batch.len() {
                return Err(Error::BatchLengthMismatch {
                    expected: batch.len(),
                    got: batch_detections.len(),
                });
            }
            debug!(batch = batch.len(), "ball batch done");
            detections.extend(batch_detections);
            self.release_cache();
        }

        Ok(detections)
    }
}

/// A source of decoded frames, already sampled.
pub trait VideoSource<F> {
    fn frames(&mut self) -> Result<Vec<F>, Error>;
}
